use std::time::Duration;

use crate::{ProviderId, RateLimitMode};

/// Client-side request policy a provider ships with.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderPolicy {
    pub provider_id: ProviderId,
    /// `None` means unbounded.
    pub rate_budget: Option<u32>,
    pub window: Duration,
    pub rate_limit_mode: RateLimitMode,
    pub request_spacing: Option<Duration>,
}

impl ProviderPolicy {
    /// Free tier: five calls per minute, spaced out.
    pub fn alphavantage_default() -> Self {
        Self {
            provider_id: ProviderId::Alphavantage,
            rate_budget: Some(5),
            window: Duration::from_secs(60),
            rate_limit_mode: RateLimitMode::FailFast,
            request_spacing: Some(Duration::from_secs(1)),
        }
    }

    pub fn unbounded(provider_id: ProviderId) -> Self {
        Self {
            provider_id,
            rate_budget: None,
            window: Duration::from_secs(60),
            rate_limit_mode: RateLimitMode::FailFast,
            request_spacing: None,
        }
    }

    pub fn default_for(provider_id: ProviderId) -> Self {
        match provider_id {
            ProviderId::Alphavantage => Self::alphavantage_default(),
            ProviderId::Marketstack | ProviderId::Yahoo => Self::unbounded(provider_id),
        }
    }
}
