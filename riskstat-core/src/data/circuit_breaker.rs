//! Circuit breaker shared by every worker fetching from one remote provider.
//!
//! A 403 opens it at once; a run of consecutive failures opens it too. While
//! open, requests are refused without touching the network. After the
//! cooldown the next check closes it again and the failure count restarts.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Gate {
    opened_at: Option<Instant>,
    failures_in_a_row: u32,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    gate: Mutex<Gate>,
    cooldown: Duration,
    failure_threshold: u32,
}

impl CircuitBreaker {
    /// A closed breaker that opens after `failure_threshold` consecutive
    /// failures (at least one) and stays open for `cooldown`.
    pub fn new(cooldown: Duration, failure_threshold: u32) -> Self {
        Self {
            gate: Mutex::new(Gate::default()),
            cooldown,
            failure_threshold: failure_threshold.max(1),
        }
    }

    /// Yahoo settings: three strikes, then thirty minutes off.
    pub fn for_yahoo() -> Self {
        Self::new(Duration::from_secs(30 * 60), 3)
    }

    // A worker that panicked mid-update leaves counters that are still usable.
    fn gate(&self) -> MutexGuard<'_, Gate> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// True if a request may go out now. Closes an expired breaker.
    pub fn allows_request(&self) -> bool {
        let mut gate = self.gate();
        match gate.opened_at {
            None => true,
            Some(at) if at.elapsed() >= self.cooldown => {
                *gate = Gate::default();
                tracing::info!("circuit breaker closed after cooldown");
                true
            }
            Some(_) => false,
        }
    }

    /// Resets the failure streak.
    pub fn note_success(&self) {
        self.gate().failures_in_a_row = 0;
    }

    /// Counts a transient provider failure (429, 5xx). Opens the breaker
    /// once the streak reaches the threshold.
    pub fn note_failure(&self) {
        let mut gate = self.gate();
        gate.failures_in_a_row += 1;
        if gate.opened_at.is_none() && gate.failures_in_a_row >= self.failure_threshold {
            gate.opened_at = Some(Instant::now());
            tracing::warn!(
                failures = gate.failures_in_a_row,
                cooldown_secs = self.cooldown.as_secs(),
                "circuit breaker opened"
            );
        }
    }

    /// Open regardless of the failure count.
    pub fn open_now(&self) {
        self.gate().opened_at = Some(Instant::now());
        tracing::warn!(cooldown_secs = self.cooldown.as_secs(), "circuit breaker forced open");
    }

    /// Time until an open breaker lets requests through again. Zero when closed.
    pub fn cooldown_left(&self) -> Duration {
        self.gate()
            .opened_at
            .map_or(Duration::ZERO, |at| self.cooldown.saturating_sub(at.elapsed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_breaker_lets_requests_through() {
        let breaker = CircuitBreaker::new(Duration::from_secs(60), 3);
        assert!(breaker.allows_request());
        assert_eq!(breaker.cooldown_left(), Duration::ZERO);
    }

    #[test]
    fn threshold_failures_open_it() {
        let breaker = CircuitBreaker::new(Duration::from_secs(60), 3);
        breaker.note_failure();
        breaker.note_failure();
        assert!(breaker.allows_request());
        breaker.note_failure();
        assert!(!breaker.allows_request());
        assert!(breaker.cooldown_left() > Duration::ZERO);
    }

    #[test]
    fn a_success_breaks_the_streak() {
        let breaker = CircuitBreaker::new(Duration::from_secs(60), 2);
        breaker.note_failure();
        breaker.note_success();
        breaker.note_failure();
        assert!(breaker.allows_request());
    }

    #[test]
    fn forced_open_closes_after_cooldown() {
        let breaker = CircuitBreaker::new(Duration::from_millis(10), 3);
        breaker.open_now();
        assert!(!breaker.allows_request());
        std::thread::sleep(Duration::from_millis(20));
        assert!(breaker.allows_request());
        assert_eq!(breaker.cooldown_left(), Duration::ZERO);
    }
}
