//! Persisted portal session credentials.
//!
//! The portal authenticates with a pair of opaque session cookies. After an
//! interactive login we capture them from the browser jar and persist them to
//! a TOML file in the state directory, so later headless runs can resume the
//! session without logging in again.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Cookie names carrying the portal session.
pub const SESSION_COOKIE: &str = "d2lSessionVal";
pub const SECURE_SESSION_COOKIE: &str = "d2lSecureSessionVal";

/// Same-site canary cookies the portal expects alongside the session pair.
pub const CANARY_COOKIES: [&str; 2] = ["d2lSameSiteCanaryA", "d2lSameSiteCanaryB"];

/// Domain the session cookies are scoped to.
pub const COOKIE_DOMAIN: &str = ".purdue.brightspace.com";

/// The captured session cookie pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCredentials {
    pub session_val: String,
    pub secure_session_val: String,
}

impl SessionCredentials {
    pub fn is_empty(&self) -> bool {
        self.session_val.is_empty() || self.secure_session_val.is_empty()
    }
}

/// File-backed store for [`SessionCredentials`].
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Store at the default location in the XDG state directory.
    pub fn open_default() -> Result<Self> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("coursefetch")
            .context("failed to resolve XDG directories")?;
        let path = xdg_dirs
            .place_state_file("session.toml")
            .context("failed to create state directory")?;
        Ok(Self { path })
    }

    /// Store at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load persisted credentials. A missing file yields empty credentials
    /// rather than an error, so a first run falls through to login.
    pub fn load(&self) -> Result<SessionCredentials> {
        if !self.path.exists() {
            return Ok(SessionCredentials::default());
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        toml::from_str(&raw).with_context(|| format!("failed to parse {}", self.path.display()))
    }

    pub fn save(&self, credentials: &SessionCredentials) -> Result<()> {
        let serialized =
            toml::to_string_pretty(credentials).context("failed to serialize session")?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(&self.path, serialized)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::at(dir.path().join("session.toml"));
        let creds = store.load().unwrap();
        assert!(creds.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::at(dir.path().join("session.toml"));
        let creds = SessionCredentials {
            session_val: "abc123".to_string(),
            secure_session_val: "def456".to_string(),
        };
        store.save(&creds).unwrap();
        assert_eq!(store.load().unwrap(), creds);
    }

    #[test]
    fn partial_credentials_count_as_empty() {
        let creds = SessionCredentials {
            session_val: "abc".to_string(),
            secure_session_val: String::new(),
        };
        assert!(creds.is_empty());
    }
}
