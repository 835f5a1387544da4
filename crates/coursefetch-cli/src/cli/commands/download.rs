//! `coursefetch download` – work through the persisted queue.

use anyhow::Result;
use coursefetch_core::config::CrawlConfig;
use coursefetch_core::download;

pub fn run_download(cfg: &CrawlConfig) -> Result<()> {
    let summary = download::run_batch(cfg)?;
    println!(
        "Batch finished: {} of {} downloads completed, {} failed.",
        summary.completed, summary.attempted, summary.failed
    );
    if summary.failed > 0 {
        println!("Failures are listed in {}.", cfg.failure_log.display());
    }
    Ok(())
}
