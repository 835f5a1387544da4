//! `coursefetch login` – force an interactive login and persist the session.

use anyhow::Result;
use coursefetch_core::browser::BrowserHost;
use coursefetch_core::config::CrawlConfig;
use coursefetch_core::session::login;
use coursefetch_core::session::store::CredentialStore;

pub fn run_login(cfg: &CrawlConfig) -> Result<()> {
    let store = CredentialStore::open_default()?;
    let host = BrowserHost::launch(false)?;
    host.navigate(&cfg.portal_url)?;

    let credentials = login::login_and_capture(&host)?;
    if credentials.is_empty() {
        anyhow::bail!("login finished but no session cookies were captured");
    }
    store.save(&credentials)?;
    println!("Session saved to {}.", store.path().display());
    Ok(())
}
