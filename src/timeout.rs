// src/timeout.rs

//! Bounded polling for the timeout-taking transfer variants
//!
//! The base transmit/receive contract busy-waits forever on an unresponsive
//! peripheral. The `*_with_timeout` methods bound that wait instead; this
//! module holds the polling loop they share.

/// Upper bound on a single status-flag wait.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutConfig {
    /// Maximum polling iterations before giving up
    pub max_iterations: u32,
    /// Backoff applied between polls
    pub backoff: Backoff,
}

impl TimeoutConfig {
    /// Balanced default for a clocked, healthy peripheral.
    #[must_use]
    pub const fn default_timeout() -> Self {
        Self {
            max_iterations: 10_000,
            backoff: Backoff::None,
        }
    }

    /// Patient bound for slow lines (9600 baud moves one byte per ~1 ms).
    #[must_use]
    pub const fn long_timeout() -> Self {
        Self {
            max_iterations: 1_000_000,
            backoff: Backoff::Linear,
        }
    }
}

/// Wait strategy between polls of the status flag.
#[derive(Debug, Clone, Copy)]
pub enum Backoff {
    /// Tight spin, one `spin_loop` hint per poll
    None,
    /// Spin `n` hints on the `n`th poll, easing bus pressure on long waits
    Linear,
}

/// Outcome of a bounded poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutResult<T> {
    /// Condition became true within the bound
    Ok(T),
    /// Bound exhausted before the condition became true
    Timeout {
        /// Iterations performed before giving up
        iterations: u32,
    },
}

impl<T> TimeoutResult<T> {
    /// Convert to a standard `Result`.
    pub fn into_result(self) -> Result<T, TimeoutError> {
        match self {
            TimeoutResult::Ok(value) => Ok(value),
            TimeoutResult::Timeout { iterations } => Err(TimeoutError { iterations }),
        }
    }
}

/// A status flag never came up within the configured bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutError {
    /// Iterations performed before giving up
    pub iterations: u32,
}

impl core::fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "flag not set after {} polls", self.iterations)
    }
}

/// Poll a condition until it holds or the bound is exhausted.
pub fn poll_with_timeout<F>(config: TimeoutConfig, mut condition: F) -> TimeoutResult<()>
where
    F: FnMut() -> bool,
{
    poll_with_timeout_value(config, |_| if condition() { Some(()) } else { None })
}

/// Poll a producing condition until it yields a value or the bound is
/// exhausted. The closure receives the current iteration count.
pub fn poll_with_timeout_value<F, T>(config: TimeoutConfig, mut condition: F) -> TimeoutResult<T>
where
    F: FnMut(u32) -> Option<T>,
{
    for iteration in 0..config.max_iterations {
        if let Some(value) = condition(iteration) {
            return TimeoutResult::Ok(value);
        }

        let hints = match config.backoff {
            Backoff::None => 1,
            Backoff::Linear => iteration.min(64),
        };
        for _ in 0..hints {
            core::hint::spin_loop();
        }
    }

    TimeoutResult::Timeout {
        iterations: config.max_iterations,
    }
}
