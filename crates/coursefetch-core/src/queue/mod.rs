//! Download queue construction and deduplication.
//!
//! The crawl emits classified content items; this module turns the
//! downloadable ones into queue entries with a concrete target directory and
//! collapses duplicates. The same file is often linked from several places
//! in a course; the copy filed deepest in the outline is the one a student
//! would look for, so that placement wins.

pub mod persist;

use crate::classify::Category;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One classified piece of course content, as discovered by the crawl.
#[derive(Debug, Clone)]
pub struct ContentItem {
    pub title: String,
    pub url: String,
    pub category: Category,
    /// Outline path relative to the course root, already sanitized.
    pub module_path: PathBuf,
    /// Sanitized course title.
    pub course: String,
}

/// One persisted download work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub title: String,
    pub url: String,
    pub target_dir: String,
    #[serde(rename = "type")]
    pub content_type: Category,
}

/// Build the queue entry for `item`, or `None` when its category is not
/// downloadable (quizzes and unrecognized content are report-only).
pub fn entry_for(item: &ContentItem, download_root: &Path) -> Option<QueueEntry> {
    let leaf = match item.category {
        Category::Video => "videos",
        Category::Pdf => "pdfs",
        Category::Quiz | Category::Other => return None,
    };
    let target_dir = download_root
        .join(&item.course)
        .join(&item.module_path)
        .join(leaf);
    Some(QueueEntry {
        title: item.title.clone(),
        url: item.url.clone(),
        target_dir: target_dir.to_string_lossy().into_owned(),
        content_type: item.category,
    })
}

fn depth(entry: &QueueEntry) -> usize {
    Path::new(&entry.target_dir).components().count()
}

/// Collapse entries sharing a URL down to one, keeping the deepest target
/// directory. Ties keep the earlier entry, and output order follows each
/// URL's first appearance, so running the result through `dedupe` again is a
/// no-op.
pub fn dedupe(entries: Vec<QueueEntry>) -> Vec<QueueEntry> {
    let mut kept: Vec<QueueEntry> = Vec::new();
    let mut slot_by_url: HashMap<String, usize> = HashMap::new();
    for entry in entries {
        match slot_by_url.get(&entry.url) {
            Some(&slot) => {
                if depth(&entry) > depth(&kept[slot]) {
                    kept[slot] = entry;
                }
            }
            None => {
                slot_by_url.insert(entry.url.clone(), kept.len());
                kept.push(entry);
            }
        }
    }
    kept
}
