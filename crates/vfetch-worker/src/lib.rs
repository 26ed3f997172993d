//! Batch video acquisition worker.
//!
//! This crate provides:
//! - The per-entry acquisition worker (fetch, trim, place, clean up)
//! - A bounded scheduler fanning entries out over a worker pool
//! - Output tree and temp directory preparation
//! - The JSON download report
//! - End-to-end runners shared by the CLIs

pub mod acquisition;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod report;
pub mod retry;
pub mod runner;
pub mod scheduler;
pub mod setup;

pub use acquisition::AcquisitionWorker;
pub use config::AcquisitionConfig;
pub use error::{EntryError, WorkerError, WorkerResult};
pub use logging::init_tracing;
pub use report::{ReportWriter, RunSummary};
pub use retry::{retry_async, RetryPolicy, RetryResult};
pub use runner::{run_annotated, run_id_lists, IdListSource, Toolchain};
pub use scheduler::JobScheduler;
