//! Interactive portal login.
//!
//! Drives the institution's IdP form when credentials are present in the
//! environment, and otherwise (or on any failure) falls back to letting the
//! user finish login by hand in the visible window. Login never hard-fails:
//! the worst case is a prompt, after which whatever session the browser holds
//! is captured.

use super::store::{SessionCredentials, SECURE_SESSION_COOKIE, SESSION_COOKIE};
use crate::browser::{shadow, BrowserHost};
use anyhow::Result;
use std::io::{BufRead, Write};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variables holding IdP credentials for unattended login.
pub const USERNAME_ENV: &str = "D2L_USERNAME";
pub const PASSWORD_ENV: &str = "D2L_PASSWORD";

/// Shadow-aware selectors locating the campus IdP entry link.
const IDP_LINK_SELECTORS: [&str; 2] = [
    "a[title*='Purdue West Lafayette']",
    "a[href*='idp.purdue.edu']",
];

/// URL substring that signals the portal home page has been reached.
const HOME_URL_MARKER: &str = "purdue.brightspace.com/d2l/home";

/// Upper bound on the wait for login (covers a 2FA round trip).
const LOGIN_TIMEOUT: Duration = Duration::from_secs(120);

/// Run the login flow on `host` (which must be interactive) and capture the
/// resulting session cookies.
pub fn login_and_capture(host: &BrowserHost) -> Result<SessionCredentials> {
    if let Err(reason) = drive_idp_login(host) {
        warn!(%reason, "automated login did not complete, handing over to the user");
        prompt_manual_completion();
    }
    capture_credentials(host)
}

fn drive_idp_login(host: &BrowserHost) -> Result<(), String> {
    click_idp_link(host)?;

    let username =
        std::env::var(USERNAME_ENV).map_err(|_| format!("{USERNAME_ENV} not set"))?;
    let password =
        std::env::var(PASSWORD_ENV).map_err(|_| format!("{PASSWORD_ENV} not set"))?;

    host.wait_for_selector("#username", Duration::from_secs(30))
        .map_err(|e| e.to_string())?;
    host.type_into("#username", &username)
        .map_err(|e| e.to_string())?;
    host.type_into("#password", &password)
        .map_err(|e| e.to_string())?;
    host.click_selector("button[name='_eventId_proceed']")
        .map_err(|e| e.to_string())?;

    info!("credentials submitted, waiting for the portal home page");
    host.wait_for_url_contains(HOME_URL_MARKER, LOGIN_TIMEOUT)
        .map_err(|e| e.to_string())
}

/// The IdP picker renders its links inside web components, so the link is
/// located with the shadow walker and clicked by index.
fn click_idp_link(host: &BrowserHost) -> Result<(), String> {
    for selector in IDP_LINK_SELECTORS {
        match shadow::find_first(host, selector, true) {
            Ok(Some(_)) => {
                if shadow::click_nth(host, selector, true, 0).map_err(|e| e.to_string())? {
                    return Ok(());
                }
            }
            Ok(None) => {}
            Err(e) => return Err(e.to_string()),
        }
    }
    Err("no IdP entry link found on the login page".to_string())
}

fn prompt_manual_completion() {
    let mut stdout = std::io::stdout();
    let _ = writeln!(
        stdout,
        "Complete the login in the browser window, then press Enter to continue."
    );
    let _ = stdout.flush();
    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);
}

/// Read the session cookie pair out of the browser jar. Missing cookies
/// produce empty credentials; the caller decides whether that is fatal.
pub fn capture_credentials(host: &BrowserHost) -> Result<SessionCredentials> {
    let session_val = host.cookie_value(SESSION_COOKIE)?.unwrap_or_default();
    let secure_session_val = host.cookie_value(SECURE_SESSION_COOKIE)?.unwrap_or_default();
    if session_val.is_empty() || secure_session_val.is_empty() {
        warn!("session cookies were not found in the browser jar");
    }
    Ok(SessionCredentials {
        session_val,
        secure_session_val,
    })
}
