//! The course crawl: discovery, outline walk, classification, queueing.
//!
//! Drives an authenticated browser context through the portal home page, the
//! pinned-courses tab, and each course's content page, emitting a report and
//! a deduplicated download queue. A failure inside one course is logged and
//! the crawl moves on; only session and launch failures abort the run.

pub mod report;

use crate::browser::{shadow, wait, BrowserHost};
use crate::classify::{classify, Category};
use crate::config::CrawlConfig;
use crate::hierarchy::HierarchyState;
use crate::queue::{self, persist, ContentItem, QueueEntry};
use crate::resolve::document::absolutize;
use crate::sanitize::sanitize_segment;
use crate::session::Session;
use self::report::ReportWriter;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};

const PINNED_TAB_SELECTOR: &str = "d2l-tab-internal";
const ENROLLMENT_CARD_SELECTOR: &str = "d2l-enrollment-card";
const CARD_HOME_LINK_SELECTOR: &str = "a[href*='/d2l/home/']";
const COURSE_TITLE_SELECTOR: &str = ".d2l-navigation-s-title-container a";
const TREE_SELECTOR: &str = "#D2L_LE_Content_TreeBrowser";
const OUTLINE_ANCHOR_SELECTOR: &str = ".d2l-le-TreeAccordionItem-anchor";
const CONTENT_LINK_SELECTOR: &str = "a[href*='/viewContent/']";

/// How long to keep looking for the pinned-courses tab while the home page
/// hydrates its components.
const PINNED_TAB_TIMEOUT: Duration = Duration::from_secs(30);
const CARD_TIMEOUT: Duration = Duration::from_secs(5);
const TREE_TIMEOUT: Duration = Duration::from_secs(10);

/// What a finished crawl produced.
#[derive(Debug, Default)]
pub struct CrawlSummary {
    pub courses: usize,
    pub items_seen: usize,
    pub queued: usize,
}

/// Map a course home URL to its content page.
/// `/d2l/home/123456` becomes `/d2l/le/content/123456/Home`; anything else is
/// malformed and skipped.
pub fn content_url_for(course_url: &str) -> Option<String> {
    if !course_url.contains("/d2l/home/") {
        return None;
    }
    Some(course_url.replace("/d2l/home/", "/d2l/le/content/") + "/Home")
}

/// Outline anchors carry hidden layout text mentioning sub-modules, so a
/// case-insensitive "module" check keeps every real outline row while
/// dropping toolbar and navigation anchors.
fn is_outline_anchor(full_text: &str) -> bool {
    full_text.to_lowercase().contains("module")
}

/// The visible label is the first line of the anchor text; the rest is
/// hidden layout description.
fn anchor_label(full_text: &str) -> String {
    full_text.lines().next().unwrap_or_default().trim().to_string()
}

/// Display title for a content link: prefer its visible text, fall back to
/// its title attribute with the external-tool suffix and apostrophes
/// stripped.
fn item_title(text: &str, title_attr: &str) -> String {
    if !text.trim().is_empty() {
        return text.trim().to_string();
    }
    title_attr
        .replace(" - External Learning Tool", "")
        .replace('\'', "")
        .trim()
        .to_string()
}

/// Run the full crawl and persist the queue and report named in `config`.
pub fn run_crawl(config: &CrawlConfig) -> Result<CrawlSummary, anyhow::Error> {
    let session = Session::start(true)?.ensure_valid(&config.portal_url)?;
    let host = session.host();

    let mut report = ReportWriter::create(Path::new(&config.report_file))?;
    let mut summary = CrawlSummary::default();
    let mut entries: Vec<QueueEntry> = Vec::new();

    if let Err(e) = open_pinned_tab(host) {
        // Leave a picture of what the dashboard actually looked like.
        let shot = Path::new("debug_dashboard.png");
        if host.screenshot_to(shot).is_ok() {
            error!(screenshot = %shot.display(), "pinned tab not found, screenshot saved");
        }
        return Err(e);
    }
    host.settle(Duration::from_secs(config.content_settle_secs));

    let course_urls = discover_course_urls(host, &config.portal_url)?;
    info!(courses = course_urls.len(), "discovered pinned courses");

    for course_url in &course_urls {
        let Some(content_url) = content_url_for(course_url) else {
            warn!(%course_url, "skipping malformed course url");
            continue;
        };
        summary.courses += 1;
        if let Err(e) = crawl_course(
            host,
            &content_url,
            config,
            &mut report,
            &mut summary,
            &mut entries,
        ) {
            error!(%course_url, error = %e, "course crawl failed, continuing");
        }
    }

    let deduped = queue::dedupe(entries);
    summary.queued = deduped.len();
    persist::save(Path::new(&config.queue_file), &deduped)?;
    info!(
        courses = summary.courses,
        items = summary.items_seen,
        queued = summary.queued,
        "crawl finished"
    );
    Ok(summary)
}

/// The home page tucks pinned courses behind a tab component that hydrates
/// late; keep polling until it shows up, then click it.
fn open_pinned_tab(host: &BrowserHost) -> Result<(), anyhow::Error> {
    let index = wait::poll_until_ok("pinned courses tab", PINNED_TAB_TIMEOUT, || {
        shadow::find_all(host, PINNED_TAB_SELECTOR, true).map(|tabs| {
            tabs.iter()
                .find(|t| {
                    t.text.contains("Pinned")
                        || t.title.as_deref().is_some_and(|v| v.contains("Pinned"))
                })
                .map(|t| t.index)
        })
    })?;
    if !shadow::click_nth(host, PINNED_TAB_SELECTOR, true, index)? {
        anyhow::bail!("pinned courses tab vanished before it could be clicked");
    }
    Ok(())
}

/// Wait for enrollment cards, then pull each card's course home link out of
/// its shadow subtree. Order is preserved and duplicates dropped.
fn discover_course_urls(
    host: &BrowserHost,
    portal_url: &str,
) -> Result<Vec<String>, anyhow::Error> {
    wait::poll_until_ok("enrollment cards", CARD_TIMEOUT, || {
        shadow::find_all(host, ENROLLMENT_CARD_SELECTOR, true)
            .map(|cards| (!cards.is_empty()).then_some(()))
    })?;

    // Visible cards only; hidden panels hold cards for unpinned courses.
    let hrefs = shadow::link_per_container(
        host,
        ENROLLMENT_CARD_SELECTOR,
        CARD_HOME_LINK_SELECTOR,
        true,
    )?;
    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    for href in hrefs.into_iter().flatten() {
        let absolute = match absolutize(&href, portal_url) {
            Ok(url) => url,
            Err(e) => {
                warn!(%href, error = %e, "skipping unparseable course link");
                continue;
            }
        };
        if seen.insert(absolute.clone()) {
            urls.push(absolute);
        }
    }
    Ok(urls)
}

fn crawl_course(
    host: &BrowserHost,
    content_url: &str,
    config: &CrawlConfig,
    report: &mut ReportWriter,
    summary: &mut CrawlSummary,
    entries: &mut Vec<QueueEntry>,
) -> Result<(), anyhow::Error> {
    host.navigate(content_url)?;
    host.settle(Duration::from_secs(config.content_settle_secs));

    let course_title = course_title(host);
    info!(course = %course_title, "crawling course");
    report.start_course(&course_title)?;
    let safe_course = sanitize_segment(&course_title);

    host.wait_for_selector(TREE_SELECTOR, TREE_TIMEOUT)?;

    let anchors = shadow::find_all(host, OUTLINE_ANCHOR_SELECTOR, true)?;
    let outline_indices: Vec<usize> = anchors
        .iter()
        .filter(|a| is_outline_anchor(&a.text))
        .map(|a| a.index)
        .collect();
    if outline_indices.is_empty() {
        warn!(course = %course_title, "no outline rows found in content tree");
        return Ok(());
    }

    let mut hierarchy = HierarchyState::new();
    for index in outline_indices {
        // The tree re-renders after each click, so the anchor set is
        // re-acquired and the row addressed by its stable index.
        let anchors = shadow::find_all(host, OUTLINE_ANCHOR_SELECTOR, true)?;
        let Some(anchor) = anchors.into_iter().find(|a| a.index == index) else {
            warn!(index, "outline row disappeared, skipping");
            continue;
        };
        let label = anchor_label(&anchor.text);
        if label.is_empty() {
            continue;
        }

        if !shadow::click_nth(host, OUTLINE_ANCHOR_SELECTOR, true, index)? {
            warn!(index, %label, "failed to click outline row, skipping");
            continue;
        }
        host.settle(Duration::from_secs(config.content_settle_secs));

        let module_path = hierarchy.advance(&label);
        let module_display = module_path.to_string_lossy().into_owned();
        report.start_module(&module_display)?;

        scan_module_content(
            host,
            config,
            &safe_course,
            &module_path,
            report,
            summary,
            entries,
        )?;
    }
    Ok(())
}

fn course_title(host: &BrowserHost) -> String {
    match shadow::attr_of_first(host, COURSE_TITLE_SELECTOR, "title") {
        Ok(Some(title)) if !title.trim().is_empty() => title.trim().to_string(),
        _ => match shadow::find_first(host, COURSE_TITLE_SELECTOR, true) {
            Ok(Some(node)) if !node.text.is_empty() => node.text,
            _ => "course".to_string(),
        },
    }
}

/// Classify and record every content link visible for the open outline row.
fn scan_module_content(
    host: &BrowserHost,
    config: &CrawlConfig,
    safe_course: &str,
    module_path: &Path,
    report: &mut ReportWriter,
    summary: &mut CrawlSummary,
    entries: &mut Vec<QueueEntry>,
) -> Result<(), anyhow::Error> {
    let links = shadow::find_all(host, CONTENT_LINK_SELECTOR, false)?;
    let mut seen_hrefs = HashSet::new();
    for link in links {
        let Some(href) = link.href.filter(|h| !h.is_empty()) else {
            continue;
        };
        let url = match absolutize(&href, &config.portal_url) {
            Ok(url) => url,
            Err(e) => {
                warn!(%href, error = %e, "skipping unparseable content link");
                continue;
            }
        };
        if !seen_hrefs.insert(url.clone()) {
            continue;
        }

        let title_attr = link.title.unwrap_or_default();
        let title = item_title(&link.text, &title_attr);
        let category = classify(&title, &title_attr);
        summary.items_seen += 1;
        report.item(category.tag(), &title)?;

        if category == Category::Pdf && !config.download_pdfs {
            continue;
        }
        let item = ContentItem {
            title,
            url,
            category,
            module_path: module_path.to_path_buf(),
            course: safe_course.to_string(),
        };
        if let Some(entry) = queue::entry_for(&item, Path::new(&config.download_root)) {
            entries.push(entry);
        }
    }
    Ok(())
}
