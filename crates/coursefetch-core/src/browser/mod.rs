//! Render/network host wrapper around a driven Chromium instance.
//!
//! One `BrowserHost` owns one browser context and one tab, driven serially.
//! Node handles are never held across DOM mutations; queries return attribute
//! snapshots and clicks re-resolve their target by selector and index (see
//! [`shadow`]). Outbound network traffic is mirrored into a [`netlog::RequestLog`]
//! so resolvers can watch a suffix of the request stream.

pub mod netlog;
pub mod shadow;
pub mod wait;

use headless_chrome::browser::tab::RequestPausedDecision;
use headless_chrome::protocol::cdp::Fetch::{
    events::RequestPausedEvent, RequestPattern, RequestStage,
};
use headless_chrome::protocol::cdp::Network::CookieParam;
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use self::netlog::RequestLog;

/// Browser window size; matches what the portal renders its full layout at.
const WINDOW_SIZE: (u32, u32) = (1728, 1080);

/// How long an idle browser process is kept alive.
const IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// User agent presented to the portal.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0.0.0 Safari/537.36";

/// Errors surfaced by the render host boundary. Fatal vs transient is
/// decided by the caller; a `Timeout` from a bounded wait is a hard failure.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("script evaluation failed: {0}")]
    Evaluation(String),

    #[error("timed out after {0:?} waiting for {1}")]
    Timeout(Duration, String),

    #[error("render host error: {0}")]
    Host(String),
}

/// One driven browser context: a single tab plus its network observation log.
pub struct BrowserHost {
    // Kept alive for the lifetime of the tab.
    _browser: Browser,
    tab: Arc<Tab>,
    requests: RequestLog,
    headless: bool,
}

impl BrowserHost {
    /// Launch a browser context. `headless: false` yields an interactive
    /// window, needed for manual login/2FA completion.
    pub fn launch(headless: bool) -> Result<Self, HostError> {
        let options = LaunchOptions {
            headless,
            window_size: Some(WINDOW_SIZE),
            idle_browser_timeout: IDLE_TIMEOUT,
            ..Default::default()
        };
        let browser = Browser::new(options).map_err(|e| HostError::Launch(e.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| HostError::Launch(e.to_string()))?;
        tab.set_default_timeout(Duration::from_secs(60));
        tab.set_user_agent(USER_AGENT, None, None)
            .map_err(|e| HostError::Launch(e.to_string()))?;

        let requests = RequestLog::default();
        install_network_mirror(&tab, requests.clone())?;

        Ok(Self {
            _browser: browser,
            tab,
            requests,
            headless,
        })
    }

    pub fn is_headless(&self) -> bool {
        self.headless
    }

    /// Chronological log of outbound requests observed on this context.
    pub fn requests(&self) -> &RequestLog {
        &self.requests
    }

    pub fn navigate(&self, url: &str) -> Result<(), HostError> {
        self.tab
            .navigate_to(url)
            .map_err(|e| HostError::Navigation(e.to_string()))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| HostError::Navigation(e.to_string()))?;
        Ok(())
    }

    pub fn current_url(&self) -> String {
        self.tab.get_url()
    }

    /// Evaluate a script and return its JSON value (`null` when the script
    /// yields no value).
    pub fn evaluate(&self, js: &str) -> Result<serde_json::Value, HostError> {
        let remote = self
            .tab
            .evaluate(js, true)
            .map_err(|e| HostError::Evaluation(e.to_string()))?;
        Ok(remote.value.unwrap_or(serde_json::Value::Null))
    }

    /// Block for a fixed settle window. Used only where the host offers no
    /// completion signal; every call site names its constant.
    pub fn settle(&self, wait: Duration) {
        std::thread::sleep(wait);
    }

    /// Wait until the page location contains `needle`, polling with a bounded
    /// timeout. A timeout is a hard failure surfaced to the caller.
    pub fn wait_for_url_contains(&self, needle: &str, timeout: Duration) -> Result<(), HostError> {
        wait::poll_until(&format!("url containing {needle:?}"), timeout, || {
            self.current_url().contains(needle).then_some(())
        })
    }

    /// Wait for an element matching `selector` in the light DOM.
    pub fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), HostError> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map(|_| ())
            .map_err(|_| HostError::Timeout(timeout, format!("element {selector:?}")))
    }

    /// Type text into the first light-DOM element matching `selector`.
    pub fn type_into(&self, selector: &str, text: &str) -> Result<(), HostError> {
        let element = self
            .tab
            .find_element(selector)
            .map_err(|e| HostError::Evaluation(e.to_string()))?;
        element
            .type_into(text)
            .map_err(|e| HostError::Evaluation(e.to_string()))?;
        Ok(())
    }

    /// Click the first light-DOM element matching `selector`.
    pub fn click_selector(&self, selector: &str) -> Result<(), HostError> {
        let element = self
            .tab
            .find_element(selector)
            .map_err(|e| HostError::Evaluation(e.to_string()))?;
        element
            .click()
            .map_err(|e| HostError::Evaluation(e.to_string()))?;
        Ok(())
    }

    /// Set one session cookie on `domain` (path `/`, secure).
    pub fn set_cookie(&self, name: &str, value: &str, domain: &str) -> Result<(), HostError> {
        let cookie = CookieParam {
            name: name.to_string(),
            value: value.to_string(),
            url: None,
            domain: Some(domain.to_string()),
            path: Some("/".to_string()),
            secure: Some(true),
            http_only: None,
            same_site: None,
            expires: None,
            priority: None,
            same_party: None,
            source_scheme: None,
            source_port: None,
            partition_key: None,
        };
        self.tab
            .set_cookies(vec![cookie])
            .map_err(|e| HostError::Host(e.to_string()))
    }

    /// Read a cookie value from the current context's jar.
    pub fn cookie_value(&self, name: &str) -> Result<Option<String>, HostError> {
        let cookies = self
            .tab
            .get_cookies()
            .map_err(|e| HostError::Host(e.to_string()))?;
        Ok(cookies.into_iter().find(|c| c.name == name).map(|c| c.value))
    }

    /// Capture a diagnostic PNG screenshot, e.g. before a fatal exit.
    pub fn screenshot_to(&self, path: &Path) -> Result<(), HostError> {
        let png = self
            .tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| HostError::Host(e.to_string()))?;
        std::fs::write(path, png).map_err(|e| HostError::Host(e.to_string()))?;
        Ok(())
    }
}

/// Mirror every outbound request into `log`, pausing at both the Request and
/// Response stages so completion state is observed. Requests are always
/// continued unmodified; the mirror is passive.
fn install_network_mirror(tab: &Arc<Tab>, log: RequestLog) -> Result<(), HostError> {
    let patterns = vec![
        RequestPattern {
            url_pattern: Some("*".to_string()),
            resource_Type: None,
            request_stage: Some(RequestStage::Request),
        },
        RequestPattern {
            url_pattern: Some("*".to_string()),
            resource_Type: None,
            request_stage: Some(RequestStage::Response),
        },
    ];
    tab.enable_fetch(Some(&patterns), None)
        .map_err(|e| HostError::Launch(e.to_string()))?;

    tab.enable_request_interception(Arc::new(
        move |_transport, _session_id, intercepted: RequestPausedEvent| {
            let url = intercepted.params.request.url.clone();
            if intercepted.params.response_status_code.is_some() {
                log.record_response(&url);
            } else {
                log.record_request(&url);
            }
            RequestPausedDecision::Continue(None)
        },
    ))
    .map_err(|e| HostError::Launch(e.to_string()))?;
    Ok(())
}
