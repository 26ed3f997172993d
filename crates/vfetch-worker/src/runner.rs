//! End-to-end runs shared by the binaries.
//!
//! Both runs follow the same shape: validate config, load inputs, prepare
//! directories, run the scheduler, remove the temp dir, write the report.
//! Anything that goes wrong before the scheduler starts is fatal.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;
use vfetch_media::{check_binary, FfmpegRunner, FfmpegTrimmer, Fetcher, Trimmer, YtDlpFetcher};
use vfetch_models::{AcquisitionOutcome, PathResolver, Subset, VideoEntry};

use crate::acquisition::AcquisitionWorker;
use crate::config::AcquisitionConfig;
use crate::error::WorkerResult;
use crate::input::{load_annotated_input, load_id_list};
use crate::report::{ReportWriter, RunSummary};
use crate::scheduler::JobScheduler;
use crate::setup::{cleanup_tmp_dir, prepare_output_tree, prepare_tmp_dir};

/// External tools used by a run.
#[derive(Clone)]
pub struct Toolchain {
    pub fetcher: Arc<dyn Fetcher>,
    pub trimmer: Arc<dyn Trimmer>,
}

impl Toolchain {
    pub fn new(fetcher: Arc<dyn Fetcher>, trimmer: Arc<dyn Trimmer>) -> Self {
        Self { fetcher, trimmer }
    }

    /// yt-dlp and FFmpeg as configured.
    ///
    /// The downloader must resolve on `PATH` (or be an existing path). FFmpeg
    /// is only checked when `need_trim` is set.
    pub fn from_config(config: &AcquisitionConfig, need_trim: bool) -> WorkerResult<Self> {
        let ytdlp = check_binary(&config.ytdlp_bin)?;
        let mut fetcher = YtDlpFetcher::new(ytdlp);
        if let Some(timeout) = config.fetch_timeout {
            fetcher = fetcher.with_timeout(timeout.as_secs());
        }

        let ffmpeg = if need_trim {
            check_binary(&config.ffmpeg_bin)?
        } else {
            PathBuf::from(&config.ffmpeg_bin)
        };
        let mut runner = FfmpegRunner::new(ffmpeg);
        if let Some(timeout) = config.trim_timeout {
            runner = runner.with_timeout(timeout.as_secs());
        }

        Ok(Self::new(
            Arc::new(fetcher),
            Arc::new(FfmpegTrimmer::new(runner)),
        ))
    }
}

/// One identifier list and the subset its ids belong to.
#[derive(Debug, Clone)]
pub struct IdListSource {
    pub subset: Subset,
    /// `None` when no list was given for the subset.
    pub path: Option<PathBuf>,
}

impl IdListSource {
    pub fn new(subset: Subset, path: Option<PathBuf>) -> Self {
        Self { subset, path }
    }
}

/// Download every id of every list into `<output>/<subset_dir>/<id>.mp4`.
///
/// Outcomes of all subsets end up in one report.
pub async fn run_id_lists(
    config: &AcquisitionConfig,
    sources: &[IdListSource],
    tools: Toolchain,
) -> WorkerResult<Vec<AcquisitionOutcome>> {
    config.validate()?;

    let mut batches = Vec::new();
    for source in sources {
        match &source.path {
            Some(path) => {
                let ids = load_id_list(path).await?;
                info!(subset = %source.subset, count = ids.len(), "Loaded list");
                batches.push((source.subset, ids));
            }
            None => info!(subset = %source.subset, "No list assigned, ignored"),
        }
    }

    let resolver = Arc::new(PathResolver::flat(&config.output_dir));
    let subsets: Vec<Subset> = batches.iter().map(|(subset, _)| *subset).collect();
    prepare_output_tree(&resolver, &subsets).await?;
    prepare_tmp_dir(&config.tmp_dir).await?;

    let scheduler = scheduler(config, resolver, tools);
    let mut outcomes = Vec::new();
    for (subset, ids) in batches {
        info!(subset = %subset, "Processing subset");
        let entries = ids
            .into_iter()
            .map(|id| VideoEntry::whole(id, subset))
            .collect();
        outcomes.extend(scheduler.run(entries).await);
    }

    finish(config, outcomes).await
}

/// Acquire the annotated dataset described by `input_json`.
///
/// Labeled entries are trimmed into the taxonomy tree; testing entries are
/// downloaded whole into `<output>/testing`.
pub async fn run_annotated(
    config: &AcquisitionConfig,
    input_json: &Path,
    tools: Toolchain,
) -> WorkerResult<Vec<AcquisitionOutcome>> {
    config.validate()?;

    let input = load_annotated_input(input_json).await?;
    let taxonomy = Arc::new(input.build_taxonomy()?);
    info!(categories = taxonomy.len(), "Taxonomy loaded");

    let resolver = Arc::new(PathResolver::taxonomy(&config.output_dir, taxonomy));
    prepare_output_tree(&resolver, &[]).await?;
    prepare_tmp_dir(&config.tmp_dir).await?;

    let scheduler = scheduler(config, resolver, tools);
    let outcomes = scheduler.run(input.entries()).await;

    finish(config, outcomes).await
}

fn scheduler(
    config: &AcquisitionConfig,
    resolver: Arc<PathResolver>,
    tools: Toolchain,
) -> JobScheduler {
    let worker = AcquisitionWorker::from_config(config, resolver, tools.fetcher, tools.trimmer);
    JobScheduler::new(Arc::new(worker), config.num_jobs)
}

async fn finish(
    config: &AcquisitionConfig,
    outcomes: Vec<AcquisitionOutcome>,
) -> WorkerResult<Vec<AcquisitionOutcome>> {
    cleanup_tmp_dir(&config.tmp_dir).await;
    ReportWriter::new(&config.report_path).write(&outcomes).await?;
    RunSummary::from_outcomes(&outcomes).log();
    Ok(outcomes)
}
