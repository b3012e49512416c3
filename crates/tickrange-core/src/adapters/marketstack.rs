use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use super::{fetch_body, into_series, malformed};
use crate::data_source::{FetchFuture, PriceSeriesSource, SourceError, DEFAULT_HISTORY_LIMIT};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient, DEFAULT_TIMEOUT_MS};
use crate::{PricePoint, PriceSeries, ProviderId, Symbol, TradingDate};

pub const MARKETSTACK_BASE_URL: &str = "http://api.marketstack.com/v1";

/// The free plan is plain HTTP only; a proxy keeps HTTPS-only callers working.
pub const DEFAULT_PROXY_URL: &str = "https://api.allorigins.win/raw?url=";

pub const ACCESS_KEY_ENV: &str = "TICKRANGE_MARKETSTACK_ACCESS_KEY";

/// Marketstack end-of-day adapter.
#[derive(Clone)]
pub struct MarketstackAdapter {
    http_client: Arc<dyn HttpClient>,
    access_key: String,
    base_url: String,
    proxy_url: Option<String>,
    limit: usize,
    timeout_ms: u64,
}

impl Default for MarketstackAdapter {
    fn default() -> Self {
        Self::new(
            Arc::new(ReqwestHttpClient::default()),
            std::env::var(ACCESS_KEY_ENV).unwrap_or_default(),
        )
    }
}

impl MarketstackAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, access_key: impl Into<String>) -> Self {
        Self {
            http_client,
            access_key: access_key.into(),
            base_url: String::from(MARKETSTACK_BASE_URL),
            proxy_url: Some(String::from(DEFAULT_PROXY_URL)),
            limit: DEFAULT_HISTORY_LIMIT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// `None` or an empty string calls Marketstack directly.
    pub fn with_proxy(mut self, proxy_url: Option<String>) -> Self {
        self.proxy_url = proxy_url.filter(|url| !url.trim().is_empty());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn endpoint(&self, symbol: &Symbol) -> String {
        let upstream = format!(
            "{}/eod?access_key={}&symbols={}&limit={}&sort=DESC",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.access_key),
            urlencoding::encode(symbol.as_str()),
            self.limit
        );

        match &self.proxy_url {
            Some(proxy) => format!("{proxy}{}", urlencoding::encode(&upstream)),
            None => upstream,
        }
    }

    async fn fetch_series(&self, symbol: &Symbol) -> Result<PriceSeries, SourceError> {
        debug!(
            provider = %ProviderId::Marketstack,
            %symbol,
            proxied = self.proxy_url.is_some(),
            "requesting daily series"
        );

        let request = HttpRequest::get(self.endpoint(symbol)).with_timeout_ms(self.timeout_ms);
        let body = fetch_body(self.http_client.as_ref(), ProviderId::Marketstack, request).await?;
        parse_eod(symbol, &body, self.limit)
    }
}

impl PriceSeriesSource for MarketstackAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Marketstack
    }

    fn fetch<'a>(&'a self, symbol: &'a Symbol) -> FetchFuture<'a> {
        Box::pin(self.fetch_series(symbol))
    }
}

fn parse_eod(symbol: &Symbol, body: &str, limit: usize) -> Result<PriceSeries, SourceError> {
    let payload: MarketstackResponse =
        serde_json::from_str(body).map_err(|error| malformed(ProviderId::Marketstack, error))?;

    if let Some(error) = payload.error {
        return Err(SourceError::upstream_rejected(format!(
            "marketstack rejected '{symbol}': {}",
            error.describe()
        )));
    }

    let bars = payload.data.unwrap_or_default();
    if bars.is_empty() {
        return Err(SourceError::no_data(format!(
            "marketstack returned no data for '{symbol}'"
        )));
    }

    let points = bars
        .into_iter()
        .flatten()
        .filter_map(|bar| {
            let date = TradingDate::parse(&bar.date?).ok()?;
            PricePoint::from_fields(date, bar.high, bar.low, bar.close)
        })
        .take(limit)
        .collect();

    into_series(ProviderId::Marketstack, symbol, points)
}

#[derive(Debug, Deserialize)]
struct MarketstackResponse {
    #[serde(default)]
    data: Option<Vec<Option<MarketstackBar>>>,
    #[serde(default)]
    error: Option<MarketstackError>,
}

#[derive(Debug, Deserialize)]
struct MarketstackBar {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    high: Option<f64>,
    #[serde(default)]
    low: Option<f64>,
    #[serde(default)]
    close: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct MarketstackError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl MarketstackError {
    fn describe(&self) -> String {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => format!("{code}: {message}"),
            (Some(code), None) => code.clone(),
            (None, Some(message)) => message.clone(),
            (None, None) => String::from("unspecified error"),
        }
    }
}
