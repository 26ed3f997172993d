//! Tracing subscriber setup shared by the binaries.
//!
//! Human-readable output by default, JSON lines when `LOG_FORMAT=json`.
//! `RUST_LOG` overrides the default filter.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{WorkerError, WorkerResult};

fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "vfetch_worker=debug,vfetch_media=debug,vfetch_models=debug"
    } else {
        "vfetch_worker=info,vfetch_media=info,vfetch_models=info"
    }
}

fn use_json() -> bool {
    std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Install the global subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init_tracing(verbose: bool) -> WorkerResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let result = if use_json() {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .try_init()
    };

    result.map_err(|e| WorkerError::config_error(format!("failed to init tracing: {}", e)))
}
