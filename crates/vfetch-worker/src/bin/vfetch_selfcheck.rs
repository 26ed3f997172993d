use std::path::Path;

use vfetch_media::check_binary;
use vfetch_worker::AcquisitionConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AcquisitionConfig::from_env();

    println!(
        "vfetch-selfcheck: starting with tmp_dir={}",
        config.tmp_dir.display()
    );
    ensure_tmp_dir(&config.tmp_dir).await?;
    ensure_binary("downloader", &config.ytdlp_bin)?;
    ensure_binary("ffmpeg", &config.ffmpeg_bin)?;

    println!("vfetch-selfcheck: ok");
    Ok(())
}

/// The temp dir must be creatable; it is removed again if this check made it.
async fn ensure_tmp_dir(path: &Path) -> anyhow::Result<()> {
    let existed = tokio::fs::try_exists(path).await?;
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {}", path.display(), e))?;
    if !existed {
        tokio::fs::remove_dir(path).await.ok();
    }
    Ok(())
}

fn ensure_binary(role: &str, binary: &str) -> anyhow::Result<()> {
    let resolved = check_binary(binary)
        .map_err(|e| anyhow::anyhow!("{} not available: {}", role, e))?;
    println!("vfetch-selfcheck: {} -> {}", role, resolved.display());
    Ok(())
}
