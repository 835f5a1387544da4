//! Authenticated portal session management.
//!
//! A [`Session`] owns a browser context with the persisted session cookies
//! applied. Before any crawl or download step the caller runs the session
//! through [`Session::ensure_valid`], which detects auth redirects and, when
//! the session is stale, swaps the headless context for an interactive one,
//! re-authenticates, persists the fresh cookies, and swaps back.

pub mod login;
pub mod store;

use crate::browser::BrowserHost;
use anyhow::{Context, Result};
use self::store::{CredentialStore, SessionCredentials, CANARY_COOKIES, COOKIE_DOMAIN};
use tracing::{debug, info};

/// A browser context carrying (possibly stale) portal credentials.
pub struct Session {
    host: BrowserHost,
    store: CredentialStore,
}

/// True when `url` looks like an authentication redirect rather than a
/// portal page. The check is deliberately broad: any login or auth hop in
/// the location means the session did not carry.
pub fn looks_like_auth_redirect(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.contains("login") || lower.contains("auth")
}

impl Session {
    /// Launch a context and apply whatever credentials are on disk.
    pub fn start(headless: bool) -> Result<Self> {
        let store = CredentialStore::open_default()?;
        let host = BrowserHost::launch(headless).context("failed to launch browser")?;
        let session = Self { host, store };
        session.apply_stored_credentials()?;
        Ok(session)
    }

    pub fn host(&self) -> &BrowserHost {
        &self.host
    }

    fn apply_stored_credentials(&self) -> Result<()> {
        let credentials = self.store.load()?;
        if credentials.is_empty() {
            debug!("no persisted session credentials");
            return Ok(());
        }
        self.apply_credentials(&credentials)
    }

    /// Install the session cookie pair plus the same-site canaries the portal
    /// checks for.
    fn apply_credentials(&self, credentials: &SessionCredentials) -> Result<()> {
        self.host
            .set_cookie(store::SESSION_COOKIE, &credentials.session_val, COOKIE_DOMAIN)?;
        self.host.set_cookie(
            store::SECURE_SESSION_COOKIE,
            &credentials.secure_session_val,
            COOKIE_DOMAIN,
        )?;
        for canary in CANARY_COOKIES {
            self.host.set_cookie(canary, "1", COOKIE_DOMAIN)?;
        }
        Ok(())
    }

    /// Navigate to `portal_url` and verify the session carried. On an auth
    /// redirect the session is re-established interactively and a fresh
    /// context (headless if the current one was headless) is returned.
    pub fn ensure_valid(self, portal_url: &str) -> Result<Self> {
        self.host.navigate(portal_url)?;
        if !looks_like_auth_redirect(&self.host.current_url()) {
            debug!("session is valid");
            return Ok(self);
        }

        info!("session is stale, re-authenticating");
        let was_headless = self.host.is_headless();
        let store = self.store;

        let interactive = if was_headless {
            // The login window must be visible for the user and for 2FA.
            drop(self.host);
            BrowserHost::launch(false).context("failed to launch login browser")?
        } else {
            self.host
        };
        interactive.navigate(portal_url)?;
        let credentials = login::login_and_capture(&interactive)?;
        store.save(&credentials)?;
        info!("session credentials refreshed");

        let session = if was_headless {
            drop(interactive);
            let host = BrowserHost::launch(true).context("failed to relaunch browser")?;
            let session = Self { host, store };
            session.apply_credentials(&credentials)?;
            session.host.navigate(portal_url)?;
            session
        } else {
            Self {
                host: interactive,
                store,
            }
        };
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_redirects_are_detected() {
        assert!(looks_like_auth_redirect(
            "https://idp.purdue.edu/idp/profile/SAML2/Redirect/SSO"
        ));
        assert!(looks_like_auth_redirect(
            "https://purdue.brightspace.com/d2l/Login/login.d2l"
        ));
        assert!(looks_like_auth_redirect("https://x.example/LOGIN"));
    }

    #[test]
    fn portal_pages_are_not_redirects() {
        assert!(!looks_like_auth_redirect(
            "https://purdue.brightspace.com/d2l/home"
        ));
        assert!(!looks_like_auth_redirect(
            "https://purdue.brightspace.com/d2l/le/content/12345/Home"
        ));
    }
}
