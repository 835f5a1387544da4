//! Bounded predicate polling.
//!
//! Rendering is asynchronous and the host offers no universal completion
//! signal, so waits are expressed as "probe until Some, give up after the
//! timeout". Exhausting the timeout is a hard error, never a silent skip.

use super::HostError;
use std::time::{Duration, Instant};

/// Interval between probe attempts.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Probe `probe` every [`POLL_INTERVAL`] until it returns `Some`, or fail
/// with [`HostError::Timeout`] naming `what` once `timeout` has elapsed.
/// The probe always runs at least once.
pub fn poll_until<T>(
    what: &str,
    timeout: Duration,
    mut probe: impl FnMut() -> Option<T>,
) -> Result<T, HostError> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(value) = probe() {
            return Ok(value);
        }
        if Instant::now() >= deadline {
            return Err(HostError::Timeout(timeout, what.to_string()));
        }
        std::thread::sleep(POLL_INTERVAL.min(deadline.saturating_duration_since(Instant::now())));
    }
}

/// Like [`poll_until`] but for fallible probes: transient `Err`s are retried
/// like a `None`, so a mid-render query that momentarily fails does not abort
/// the wait.
pub fn poll_until_ok<T, E>(
    what: &str,
    timeout: Duration,
    mut probe: impl FnMut() -> Result<Option<T>, E>,
) -> Result<T, HostError> {
    poll_until(what, timeout, || probe().ok().flatten())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_as_soon_as_probe_succeeds() {
        let mut calls = 0;
        let got = poll_until("counter", Duration::from_secs(5), || {
            calls += 1;
            (calls == 3).then_some(calls)
        })
        .unwrap();
        assert_eq!(got, 3);
    }

    #[test]
    fn times_out_when_probe_never_succeeds() {
        let err = poll_until("never", Duration::from_millis(10), || None::<()>).unwrap_err();
        match err {
            HostError::Timeout(_, what) => assert_eq!(what, "never"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn transient_errors_are_retried() {
        let mut calls = 0;
        let got = poll_until_ok("flaky", Duration::from_secs(5), || {
            calls += 1;
            match calls {
                1 => Err("detached"),
                2 => Ok(None),
                _ => Ok(Some("ready")),
            }
        })
        .unwrap();
        assert_eq!(got, "ready");
    }
}
