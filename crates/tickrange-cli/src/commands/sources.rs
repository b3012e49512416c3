use serde::Serialize;
use tickrange_core::adapters::{
    ACCESS_KEY_ENV, ALPHAVANTAGE_BASE_URL, API_KEY_ENV, MARKETSTACK_BASE_URL, YAHOO_BASE_URL,
};
use tickrange_core::{ProviderId, ProviderPolicy, RateLimitMode};

use crate::config::FileConfig;

#[derive(Debug, Serialize)]
pub struct SourceInfo {
    pub id: ProviderId,
    pub base_url: &'static str,
    pub credential_env: Option<&'static str>,
    pub credential_configured: bool,
    pub rate_budget: Option<u32>,
    pub window_ms: u128,
    pub request_spacing_ms: Option<u128>,
    pub rate_limit_mode: RateLimitMode,
}

#[derive(Debug, Serialize)]
pub struct SourcesReport {
    pub sources: Vec<SourceInfo>,
}

pub fn run(file: &FileConfig) -> SourcesReport {
    let env_is_set = |key: &str| {
        std::env::var(key)
            .map(|value| !value.trim().is_empty())
            .unwrap_or(false)
    };

    let sources = ProviderId::ALL
        .into_iter()
        .map(|id| {
            let policy = ProviderPolicy::default_for(id);
            let (base_url, credential_env, credential_configured) = match id {
                ProviderId::Marketstack => (
                    MARKETSTACK_BASE_URL,
                    Some(ACCESS_KEY_ENV),
                    file.marketstack.access_key.is_some() || env_is_set(ACCESS_KEY_ENV),
                ),
                ProviderId::Yahoo => (YAHOO_BASE_URL, None, true),
                // The shared demo key always works for sample symbols.
                ProviderId::Alphavantage => (ALPHAVANTAGE_BASE_URL, Some(API_KEY_ENV), true),
            };

            SourceInfo {
                id,
                base_url,
                credential_env,
                credential_configured,
                rate_budget: policy.rate_budget,
                window_ms: policy.window.as_millis(),
                request_spacing_ms: policy.request_spacing.map(|spacing| spacing.as_millis()),
                rate_limit_mode: policy.rate_limit_mode,
            }
        })
        .collect();

    SourcesReport { sources }
}
