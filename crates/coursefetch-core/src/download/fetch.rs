//! Streaming HTTP GET to disk.
//!
//! The body streams into a `.part` sibling and lands with a rename after the
//! status code checks out, so interrupted transfers never masquerade as
//! finished files.

use crate::browser::USER_AGENT;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

/// Download `url` to `dest` with a single GET. Returns the number of bytes
/// written.
pub fn fetch_to_file(url: &str, dest: &Path) -> Result<u64> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let tmp = part_path(dest);
    let mut file =
        File::create(&tmp).with_context(|| format!("failed to create {}", tmp.display()))?;

    let written = Arc::new(AtomicU64::new(0));
    let written_cb = Arc::clone(&written);

    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    easy.useragent(USER_AGENT)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(Duration::from_secs(30))?;
    // Stall detection: under 1 KiB/s for a minute counts as dead.
    easy.low_speed_limit(1024)?;
    easy.low_speed_time(Duration::from_secs(60))?;
    easy.timeout(Duration::from_secs(3600))?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(move |data| {
            match file.write_all(data) {
                Ok(()) => {
                    written_cb.fetch_add(data.len() as u64, Ordering::Relaxed);
                    Ok(data.len())
                }
                Err(e) => {
                    tracing::warn!("write failed: {e}");
                    Ok(0) // abort transfer
                }
            }
        })?;
        transfer.perform().context("GET request failed")?;
    }

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        let _ = std::fs::remove_file(&tmp);
        anyhow::bail!("GET {} returned HTTP {}", url, code);
    }

    std::fs::rename(&tmp, dest)
        .with_context(|| format!("failed to move download into place at {}", dest.display()))?;
    Ok(written.load(Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_path_appends_to_the_full_name() {
        assert_eq!(
            part_path(Path::new("downloads/Lecture 1.mp4")),
            Path::new("downloads/Lecture 1.mp4.part")
        );
    }
}
