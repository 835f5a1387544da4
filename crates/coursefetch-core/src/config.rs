use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Default settle wait after navigating to a content listing, in seconds.
/// The tree browser renders asynchronously and offers no completion event;
/// this is a documented fixed window, not a tunable magic sleep.
pub const CONTENT_SETTLE_SECS: u64 = 5;

/// Default settle wait after opening a media page, in seconds. The embedded
/// player only issues its segment requests once it has booted; there is no
/// host-side signal for "player network activity started".
pub const PLAYER_SETTLE_SECS: u64 = 10;

/// Global configuration loaded from `~/.config/coursefetch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Origin of the LMS portal, e.g. `https://purdue.brightspace.com`.
    pub portal_url: String,
    /// Queue PDF items as well as videos.
    pub download_pdfs: bool,
    /// Root directory for downloaded assets.
    pub download_root: PathBuf,
    /// Path of the persisted work queue (JSON array, overwritten per run).
    pub queue_file: PathBuf,
    /// Path of the human-readable crawl report (plain text).
    pub report_file: PathBuf,
    /// Path of the downloader's failure log (appended, one line per error).
    pub failure_log: PathBuf,
    /// Settle wait after opening a content listing, in seconds.
    #[serde(default = "default_content_settle")]
    pub content_settle_secs: u64,
    /// Settle wait after opening a media page, in seconds.
    #[serde(default = "default_player_settle")]
    pub player_settle_secs: u64,
}

fn default_content_settle() -> u64 {
    CONTENT_SETTLE_SECS
}

fn default_player_settle() -> u64 {
    PLAYER_SETTLE_SECS
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            portal_url: "https://purdue.brightspace.com".to_string(),
            download_pdfs: true,
            download_root: PathBuf::from("downloads"),
            queue_file: PathBuf::from("download_queue.json"),
            report_file: PathBuf::from("crawl_report.txt"),
            failure_log: PathBuf::from("failed_downloads.txt"),
            content_settle_secs: CONTENT_SETTLE_SECS,
            player_settle_secs: PLAYER_SETTLE_SECS,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("coursefetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<CrawlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = CrawlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: CrawlConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = CrawlConfig::default();
        assert!(cfg.download_pdfs);
        assert_eq!(cfg.content_settle_secs, CONTENT_SETTLE_SECS);
        assert_eq!(cfg.player_settle_secs, PLAYER_SETTLE_SECS);
        assert_eq!(cfg.queue_file, PathBuf::from("download_queue.json"));
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = CrawlConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: CrawlConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.portal_url, cfg.portal_url);
        assert_eq!(parsed.download_root, cfg.download_root);
    }

    #[test]
    fn config_toml_settle_defaults_apply() {
        let toml = r#"
            portal_url = "https://lms.example.edu"
            download_pdfs = false
            download_root = "out"
            queue_file = "queue.json"
            report_file = "report.txt"
            failure_log = "failed.txt"
        "#;
        let cfg: CrawlConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.portal_url, "https://lms.example.edu");
        assert!(!cfg.download_pdfs);
        assert_eq!(cfg.content_settle_secs, CONTENT_SETTLE_SECS);
        assert_eq!(cfg.player_settle_secs, PLAYER_SETTLE_SECS);
    }
}
