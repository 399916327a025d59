// Sliding-window rate limiter gating the remote reputation lookup
// Admission is checked synchronously; callers that are denied fall back to
// local analysis instead of queueing

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Bounds outbound reputation lookups to `max_requests` per trailing
/// `window`. Timestamps age out lazily on access; there is no background
/// timer.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    max_requests: usize,
    window: Duration,
    requests: Mutex<VecDeque<Instant>>,
}

impl SlidingWindowLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            requests: Mutex::new(VecDeque::new()),
        }
    }

    // A poisoned lock still holds valid timestamps; keep serving
    fn window_entries(&self) -> MutexGuard<'_, VecDeque<Instant>> {
        match self.requests.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// True when a request may be admitted right now. Prunes timestamps that
    /// have left the window before counting.
    pub fn can_make_request(&self) -> bool {
        let now = Instant::now();
        let mut requests = self.window_entries();

        while let Some(oldest) = requests.front() {
            if now.duration_since(*oldest) >= self.window {
                requests.pop_front();
            } else {
                break;
            }
        }

        requests.len() < self.max_requests
    }

    /// Record an admitted request at the current time.
    pub fn record_request(&self) {
        self.window_entries().push_back(Instant::now());
    }

    /// Time until the oldest recorded request exits the window. Zero when
    /// the window is empty or the oldest entry has already aged out.
    pub fn wait_time(&self) -> Duration {
        let requests = self.window_entries();

        match requests.front() {
            Some(oldest) => self.window.saturating_sub(oldest.elapsed()),
            None => Duration::ZERO,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
