//! Queue persistence as pretty-printed JSON.
//!
//! Writes go to a temporary sibling first and land with a rename, so an
//! interrupted crawl never leaves a half-written queue behind.

use super::QueueEntry;
use anyhow::{Context, Result};
use std::path::Path;

pub fn save(path: &Path, entries: &[QueueEntry]) -> Result<()> {
    let serialized =
        serde_json::to_string_pretty(entries).context("failed to serialize queue")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, serialized)
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("failed to move queue into place at {}", path.display()))?;
    Ok(())
}

pub fn load(path: &Path) -> Result<Vec<QueueEntry>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read queue {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Category;
    use tempfile::tempdir;

    fn sample() -> Vec<QueueEntry> {
        vec![QueueEntry {
            title: "Lecture 1 (32:10)".to_string(),
            url: "https://cdn.example/pd/lec1.ts".to_string(),
            target_dir: "downloads/CS 180/Module 1/videos".to_string(),
            content_type: Category::Video,
        }]
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("download_queue.json");
        save(&path, &sample()).unwrap();
        assert_eq!(load(&path).unwrap(), sample());
    }

    #[test]
    fn no_temp_file_is_left_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("download_queue.json");
        save(&path, &sample()).unwrap();
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, ["download_queue.json"]);
    }

    #[test]
    fn wire_shape_uses_lowercase_type_tags() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("q.json");
        save(&path, &sample()).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains(r#""type": "video""#));
    }
}
