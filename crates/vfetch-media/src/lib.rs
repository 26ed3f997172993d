#![deny(unreachable_patterns)]
//! yt-dlp and FFmpeg CLI wrappers.
//!
//! This crate provides:
//! - The `Fetcher` and `Trimmer` capabilities used by the acquisition worker
//! - A yt-dlp backed fetcher and an FFmpeg backed trimmer
//! - Type-safe FFmpeg command building with optional timeouts
//! - Cross-device safe file moves

pub mod command;
pub mod download;
pub mod error;
pub mod fs_utils;
pub mod trim;

pub use command::{check_binary, run_captured, FfmpegCommand, FfmpegRunner};
pub use download::{Fetcher, YtDlpFetcher, DEFAULT_YTDLP_BIN};
pub use error::{MediaError, MediaResult};
pub use fs_utils::{move_file, remove_file_if_exists};
pub use trim::{FfmpegTrimmer, Trimmer, DEFAULT_FFMPEG_BIN};
