use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Enforces a minimum spacing between consecutive upstream requests.
///
/// Unlike [`crate::RateLimiter`] the pacer never refuses a request; it only
/// delays it until the next slot.
#[derive(Clone)]
pub struct RequestPacer {
    limiter: Arc<DirectRateLimiter>,
    spacing: Duration,
}

impl RequestPacer {
    /// Returns `None` for a zero spacing.
    pub fn new(spacing: Duration) -> Option<Self> {
        let quota = Quota::with_period(spacing)?.allow_burst(NonZeroU32::MIN);
        Some(Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
            spacing,
        })
    }

    pub const fn spacing(&self) -> Duration {
        self.spacing
    }

    /// Waits until the next request slot is available.
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }
}

impl std::fmt::Debug for RequestPacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPacer")
            .field("spacing", &self.spacing)
            .finish()
    }
}
