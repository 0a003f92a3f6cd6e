//! Circuit breaker guarding calls to the local model server (SPEC §4.1).
//!
//! CLOSED calls pass through. Each failure increments a counter; at the
//! configured threshold the breaker trips OPEN and every call is rejected
//! without reaching the network until the cooldown elapses. After cooldown
//! the breaker allows a single HALF_OPEN probe: success closes it, failure
//! reopens it and restarts the cooldown.

use std::sync::RwLock;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Closed,
    Open,
    HalfOpen,
}

struct Inner {
    state: State,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

/// Thread-safe circuit breaker over the model server.
pub struct CircuitBreaker {
    fail_threshold: u32,
    cooldown: Duration,
    inner: RwLock<Inner>,
}

impl CircuitBreaker {
    pub fn new(fail_threshold: u32, cooldown_seconds: u64) -> Self {
        Self {
            fail_threshold,
            cooldown: Duration::from_secs(cooldown_seconds),
            inner: RwLock::new(Inner {
                state: State::Closed,
                consecutive_failures: 0,
                opened_at: None,
            }),
        }
    }

    /// Whether a call is currently allowed through. Transitions OPEN to
    /// HALF_OPEN as a side effect once the cooldown has elapsed.
    pub fn allow(&self) -> bool {
        let mut inner = self.inner.write().unwrap();
        match inner.state {
            State::Closed | State::HalfOpen => true,
            State::Open => {
                let elapsed = inner.opened_at.map(|t| t.elapsed()).unwrap_or_default();
                if elapsed >= self.cooldown {
                    inner.state = State::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Record a successful call. Closes the breaker and resets the failure
    /// count, whatever the prior state.
    pub fn record_success(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.state = State::Closed;
        inner.consecutive_failures = 0;
        inner.opened_at = None;
    }

    /// Record a failed call. Trips the breaker OPEN once the consecutive
    /// failure count reaches the threshold, or immediately reopens it if the
    /// failing call was the HALF_OPEN probe.
    pub fn record_failure(&self) {
        let mut inner = self.inner.write().unwrap();
        match inner.state {
            State::HalfOpen => {
                inner.state = State::Open;
                inner.opened_at = Some(Instant::now());
            }
            State::Closed | State::Open => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.fail_threshold {
                    inner.state = State::Open;
                    inner.opened_at = Some(Instant::now());
                }
            }
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.inner.read().unwrap().state, State::Open)
    }
}
