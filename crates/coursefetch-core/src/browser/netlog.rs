//! Chronological log of outbound requests observed on a browser context.
//!
//! The log only grows. Callers take a [`WatchMark`] before triggering an
//! action and then inspect [`RequestLog::since`] to see exactly the traffic
//! that action produced, without re-scanning (or being confused by) earlier
//! entries.

use std::sync::{Arc, Mutex};

/// One observed outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedRequest {
    pub url: String,
    /// True once a response for this URL has been seen.
    pub has_response: bool,
}

/// Position in the log at the moment [`RequestLog::mark`] was called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchMark(usize);

/// Append-only request log, shared between the interception callback and the
/// crawl thread.
#[derive(Debug, Clone, Default)]
pub struct RequestLog {
    entries: Arc<Mutex<Vec<ObservedRequest>>>,
}

impl RequestLog {
    pub fn record_request(&self, url: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.push(ObservedRequest {
            url: url.to_string(),
            has_response: false,
        });
    }

    /// Mark the most recent entry for `url` as responded, or append a
    /// responded entry if the request stage was never observed.
    pub fn record_response(&self, url: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(entry) = entries.iter_mut().rev().find(|e| e.url == url) {
            entry.has_response = true;
        } else {
            entries.push(ObservedRequest {
                url: url.to_string(),
                has_response: true,
            });
        }
    }

    /// Remember the current log position.
    pub fn mark(&self) -> WatchMark {
        let entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        WatchMark(entries.len())
    }

    /// Entries recorded after `mark`, in arrival order.
    pub fn since(&self, mark: WatchMark) -> Vec<ObservedRequest> {
        let entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.get(mark.0..).unwrap_or(&[]).to_vec()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn since_returns_only_the_suffix() {
        let log = RequestLog::default();
        log.record_request("https://a.example/1");
        let mark = log.mark();
        log.record_request("https://a.example/2");
        log.record_request("https://a.example/3");

        let tail = log.since(mark);
        let urls: Vec<&str> = tail.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls, ["https://a.example/2", "https://a.example/3"]);
    }

    #[test]
    fn response_flips_completion_flag() {
        let log = RequestLog::default();
        let mark = log.mark();
        log.record_request("https://a.example/x");
        log.record_response("https://a.example/x");

        let tail = log.since(mark);
        assert_eq!(tail.len(), 1);
        assert!(tail[0].has_response);
    }

    #[test]
    fn response_without_request_is_still_logged() {
        let log = RequestLog::default();
        log.record_response("https://a.example/only-response");
        assert_eq!(log.len(), 1);
        assert!(log.since(log.mark()).is_empty());
    }

    #[test]
    fn mark_past_end_yields_empty_suffix() {
        let log = RequestLog::default();
        let mark = log.mark();
        assert!(log.since(mark).is_empty());
    }
}
