//! `coursefetch crawl` – crawl pinned courses and build the queue.

use anyhow::Result;
use coursefetch_core::config::CrawlConfig;
use coursefetch_core::crawl;

pub fn run_crawl(cfg: &CrawlConfig) -> Result<()> {
    let summary = crawl::run_crawl(cfg)?;
    println!(
        "Crawled {} courses: {} items seen, {} queued.",
        summary.courses, summary.items_seen, summary.queued
    );
    println!(
        "Queue written to {}; report at {}.",
        cfg.queue_file.display(),
        cfg.report_file.display()
    );
    Ok(())
}
