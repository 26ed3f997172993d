//! Download whole videos listed in per-subset identifier files.

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use vfetch_models::Subset;
use vfetch_worker::{init_tracing, run_id_lists, AcquisitionConfig, IdListSource, Toolchain};

#[derive(Parser, Debug)]
#[command(name = "vfetch-ids")]
#[command(about = "Download videos listed in comma-separated id files")]
#[command(version)]
struct Cli {
    /// Id list for the training subset (first field of each line is the id)
    #[arg(long, value_name = "FILE")]
    train: Option<PathBuf>,

    /// Id list for the validation subset
    #[arg(long, value_name = "FILE")]
    val: Option<PathBuf>,

    /// Id list for the test subset
    #[arg(long, value_name = "FILE")]
    test: Option<PathBuf>,

    /// Root of the output tree
    output_dir: PathBuf,

    /// Number of concurrent downloads
    #[arg(short = 'n', long, default_value = "10")]
    num_jobs: usize,

    /// Temporary download directory, removed when the run ends
    #[arg(short = 't', long, default_value = "temp")]
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
    info!("Starting vfetch-ids: {:?}", config);

    let sources = [
        IdListSource::new(Subset::Training, cli.train),
        IdListSource::new(Subset::Validation, cli.val),
        IdListSource::new(Subset::Testing, cli.test),
    ];

    let tools = Toolchain::from_config(&config, false)?;
    if let Err(e) = run_id_lists(&config, &sources, tools).await {
        error!("Run failed: {}", e);
        return Err(e.into());
    }
    Ok(())
}
