//! Search input debouncing.
//!
//! Holds at most one pending query. A new request replaces the pending one
//! and restarts the quiet interval, so a burst of keystrokes yields a single
//! recompute with the last text typed.

use std::time::Duration;
use web_time::Instant;

#[derive(Debug, Clone, PartialEq)]
struct PendingSearch {
    query: String,
    requested_at: Instant,
}

/// Coalesces rapid search input into one delayed request.
#[derive(Debug)]
pub struct SearchDebouncer {
    /// Quiet interval before a pending query fires.
    delay: Duration,

    /// The one pending request, if any.
    pending: Option<PendingSearch>,
}

impl SearchDebouncer {
    /// Default quiet interval (300 ms).
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(crate::constants::SEARCH_DEBOUNCE_MS);

    pub fn new() -> Self {
        Self {
            delay: Self::DEFAULT_DELAY,
            pending: None,
        }
    }

    /// Set the quiet interval.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Queue `query`, superseding any pending request.
    pub fn request(&mut self, query: impl Into<String>, now: Instant) {
        if self.pending.is_some() {
            log::trace!("Search debounce: superseding pending query");
        }
        self.pending = Some(PendingSearch {
            query: query.into(),
            requested_at: now,
        });
    }

    /// Take the pending query if the quiet interval has elapsed by `now`.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|p| now.saturating_duration_since(p.requested_at) >= self.delay);
        if !due {
            return None;
        }
        let pending = self.pending.take()?;
        log::trace!("Search debounce: firing '{}'", pending.query);
        Some(pending.query)
    }

    /// Drop the pending request without firing it.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time left before the pending query fires, if any.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|p| self.delay.saturating_sub(now.saturating_duration_since(p.requested_at)))
    }
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let mut debouncer = SearchDebouncer::new();
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(Instant::now()), None);
        assert_eq!(debouncer.delay(), Duration::from_millis(300));
    }

    #[test]
    fn test_fires_after_quiet_interval() {
        let mut debouncer = SearchDebouncer::new();
        let t0 = Instant::now();
        debouncer.request("mesa", t0);

        assert_eq!(debouncer.poll(t0 + Duration::from_millis(299)), None);
        assert_eq!(
            debouncer.poll(t0 + Duration::from_millis(300)),
            Some("mesa".to_string())
        );
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(t0 + Duration::from_secs(1)), None);
    }

    #[test]
    fn test_new_request_supersedes() {
        let mut debouncer = SearchDebouncer::new();
        let t0 = Instant::now();
        debouncer.request("m", t0);
        debouncer.request("me", t0 + Duration::from_millis(200));
        debouncer.request("mes", t0 + Duration::from_millis(400));

        // First request's deadline has passed, but it was superseded
        assert_eq!(debouncer.poll(t0 + Duration::from_millis(500)), None);
        assert_eq!(
            debouncer.poll(t0 + Duration::from_millis(700)),
            Some("mes".to_string())
        );
    }

    #[test]
    fn test_cancel() {
        let mut debouncer = SearchDebouncer::new();
        let t0 = Instant::now();
        debouncer.request("silla", t0);
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());
        assert_eq!(debouncer.poll(t0 + Duration::from_secs(1)), None);
    }

    #[test]
    fn test_zero_delay_fires_immediately() {
        let mut debouncer = SearchDebouncer::new().with_delay(Duration::ZERO);
        let t0 = Instant::now();
        debouncer.request("x", t0);
        assert_eq!(debouncer.poll(t0), Some("x".to_string()));
    }

    #[test]
    fn test_remaining() {
        let mut debouncer = SearchDebouncer::new();
        let t0 = Instant::now();
        assert_eq!(debouncer.remaining(t0), None);
        debouncer.request("x", t0);
        assert_eq!(
            debouncer.remaining(t0 + Duration::from_millis(100)),
            Some(Duration::from_millis(200))
        );
    }
}
