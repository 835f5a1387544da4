//! Batch download of a previously crawled queue.
//!
//! Each queue entry is resolved to a direct URL inside the authenticated
//! browser session and then fetched with a plain streaming GET. One failed
//! entry is logged to the failure file and the batch continues; only losing
//! the session aborts the run.

pub mod fetch;

use crate::browser::{shadow, BrowserHost};
use crate::classify::Category;
use crate::config::CrawlConfig;
use crate::queue::{persist, QueueEntry};
use crate::resolve::{document, segment};
use crate::sanitize::sanitize_segment;
use crate::session::Session;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

/// Selectors for the heading naming the open content item; the filename for
/// videos comes from here.
const PAGE_TITLE_SELECTOR: &str = ".d2l-page-title";
const PAGE_TITLE_FALLBACK_SELECTOR: &str = ".vui-heading-1";

/// What a finished batch did.
#[derive(Debug, Default)]
pub struct DownloadSummary {
    pub attempted: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Download every entry in the persisted queue.
pub fn run_batch(config: &CrawlConfig) -> Result<DownloadSummary> {
    let entries = persist::load(Path::new(&config.queue_file))
        .context("no download queue; run a crawl first")?;
    if entries.is_empty() {
        info!("download queue is empty");
        return Ok(DownloadSummary::default());
    }
    info!(items = entries.len(), "starting batch download");

    let session = Session::start(true)?.ensure_valid(&config.portal_url)?;
    let host = session.host();

    let mut summary = DownloadSummary::default();
    let total = entries.len();
    for (position, entry) in entries.iter().enumerate() {
        summary.attempted += 1;
        info!(item = position + 1, total, title = %entry.title, "processing");
        match download_entry(host, config, entry) {
            Ok(dest) => {
                summary.completed += 1;
                info!(dest = %dest.display(), "download complete");
            }
            Err(e) => {
                summary.failed += 1;
                error!(title = %entry.title, error = %e, "download failed, continuing");
                if let Err(log_err) = append_failure(Path::new(&config.failure_log), entry, &e) {
                    warn!(error = %log_err, "could not record failure");
                }
            }
        }
    }
    info!(
        completed = summary.completed,
        failed = summary.failed,
        "batch finished"
    );
    Ok(summary)
}

fn download_entry(host: &BrowserHost, config: &CrawlConfig, entry: &QueueEntry) -> Result<PathBuf> {
    match entry.content_type {
        Category::Video => download_video(host, config, entry),
        Category::Pdf => download_pdf(host, config, entry),
        Category::Quiz | Category::Other => {
            anyhow::bail!("not a downloadable content type")
        }
    }
}

/// Videos: open the player page, watch the request traffic it generates,
/// and rewrite the first observed media segment into the full-file URL.
fn download_video(host: &BrowserHost, config: &CrawlConfig, entry: &QueueEntry) -> Result<PathBuf> {
    let mark = host.requests().mark();
    host.navigate(&entry.url)?;
    // The player only requests segments once it has spun up; there is no
    // completion event to wait on.
    host.settle(Duration::from_secs(config.player_settle_secs));

    let observed = host.requests().since(mark);
    let segment_url = segment::find_segment_url(&observed)?;
    let direct_url = segment::to_direct_url(segment_url);

    let title = page_title(host);
    let dest = Path::new(&entry.target_dir).join(format!("{}.mp4", sanitize_segment(&title)));
    fetch::fetch_to_file(&direct_url, &dest)?;
    Ok(dest)
}

/// PDFs: the viewer page knows the real file location.
fn download_pdf(host: &BrowserHost, config: &CrawlConfig, entry: &QueueEntry) -> Result<PathBuf> {
    host.navigate(&entry.url)?;
    host.settle(Duration::from_secs(config.content_settle_secs));

    let direct_url = document::resolve_on_page(host)?;
    let dest =
        Path::new(&entry.target_dir).join(format!("{}.pdf", sanitize_segment(&entry.title)));
    fetch::fetch_to_file(&direct_url, &dest)?;
    Ok(dest)
}

fn page_title(host: &BrowserHost) -> String {
    for selector in [PAGE_TITLE_SELECTOR, PAGE_TITLE_FALLBACK_SELECTOR] {
        if let Ok(Some(node)) = shadow::find_first(host, selector, true) {
            if !node.text.is_empty() {
                return node.text;
            }
        }
    }
    "video".to_string()
}

/// One line per failure, appended so earlier runs' records survive.
fn append_failure(path: &Path, entry: &QueueEntry, err: &anyhow::Error) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    writeln!(file, "{} | {} | {}", entry.title, entry.url, err)?;
    Ok(())
}
