//! Acquire an annotated dataset: trim labeled segments into the category tree
//! and download testing videos whole.

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use vfetch_worker::{init_tracing, run_annotated, AcquisitionConfig, Toolchain};

#[derive(Parser, Debug)]
#[command(name = "vfetch-annotated")]
#[command(about = "Download and trim videos described by an annotation file")]
#[command(version)]
struct Cli {
    /// Annotation JSON with `taxonomy` and `database` sections
    input_json: PathBuf,

    /// Root of the output tree
    output_dir: PathBuf,

    /// Number of concurrent workers
    #[arg(short = 'n', long, default_value = "24")]
    num_jobs: usize,

    /// Temporary download directory, removed when the run ends
    #[arg(short = 't', long, default_value = "tmp")]
    tmp_dir: PathBuf,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = AcquisitionConfig::from_env()
        .with_num_jobs(cli.num_jobs)
        .with_tmp_dir(cli.tmp_dir)
        .with_output_dir(cli.output_dir)
        .with_verbose(cli.verbose);
    info!("Starting vfetch-annotated: {:?}", config);

    let tools = Toolchain::from_config(&config, true)?;
    if let Err(e) = run_annotated(&config, &cli.input_json, tools).await {
        error!("Run failed: {}", e);
        return Err(e.into());
    }
    Ok(())
}
