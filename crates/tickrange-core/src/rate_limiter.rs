use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Default length of a rate-limit window.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// What the aggregator does with the remaining symbols once the budget is spent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RateLimitMode {
    /// Stop immediately; unattempted symbols are left out of the result.
    #[default]
    FailFast,
    /// Record every unattempted symbol as a rate-limited failure.
    RejectRemaining,
}

impl RateLimitMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FailFast => "fail-fast",
            Self::RejectRemaining => "reject-remaining",
        }
    }
}

impl Display for RateLimitMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RateLimitMode {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "fail-fast" => Ok(Self::FailFast),
            "reject-remaining" => Ok(Self::RejectRemaining),
            other => Err(ValidationError::InvalidRateLimitMode {
                value: other.to_owned(),
            }),
        }
    }
}

/// Observable limiter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimiterState {
    Open,
    Exhausted,
}

#[derive(Debug)]
struct LimiterInner {
    count: u32,
    window_start: Instant,
}

/// Fixed-window request budget shared by batch runs.
///
/// The window resets lazily: the elapsed time is only checked when the
/// limiter is queried. Check and increment happen under one lock, so
/// concurrent batches sharing an `Arc<RateLimiter>` cannot overshoot.
#[derive(Debug)]
pub struct RateLimiter {
    budget: u32,
    window: Duration,
    mode: RateLimitMode,
    inner: Mutex<LimiterInner>,
}

impl RateLimiter {
    pub fn new(budget: u32, window: Duration, mode: RateLimitMode) -> Self {
        Self {
            budget,
            window,
            mode,
            inner: Mutex::new(LimiterInner {
                count: 0,
                window_start: Instant::now(),
            }),
        }
    }

    /// Reserves one request slot. Returns `false` when the budget for the
    /// current window is spent.
    pub fn try_acquire(&self) -> bool {
        let mut inner = self.lock_and_roll();
        if inner.count >= self.budget {
            return false;
        }
        inner.count += 1;
        true
    }

    pub fn state(&self) -> LimiterState {
        if self.lock_and_roll().count >= self.budget {
            LimiterState::Exhausted
        } else {
            LimiterState::Open
        }
    }

    /// Requests made in the current window.
    pub fn used(&self) -> u32 {
        self.lock_and_roll().count
    }

    pub const fn budget(&self) -> u32 {
        self.budget
    }

    pub const fn window(&self) -> Duration {
        self.window
    }

    pub const fn mode(&self) -> RateLimitMode {
        self.mode
    }

    fn lock_and_roll(&self) -> MutexGuard<'_, LimiterInner> {
        // The counter stays consistent even if a holder panicked.
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if inner.window_start.elapsed() > self.window {
            inner.count = 0;
            inner.window_start = Instant::now();
        }
        inner
    }
}
