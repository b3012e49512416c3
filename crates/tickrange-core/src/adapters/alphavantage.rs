use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{fetch_body, into_series, malformed};
use crate::data_source::{FetchFuture, PriceSeriesSource, SourceError, DEFAULT_HISTORY_LIMIT};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient, DEFAULT_TIMEOUT_MS};
use crate::{PricePoint, PriceSeries, ProviderId, Symbol, TradingDate, ValidationError};

pub const ALPHAVANTAGE_BASE_URL: &str = "https://www.alphavantage.co";

pub const API_KEY_ENV: &str = "TICKRANGE_ALPHAVANTAGE_API_KEY";

/// Shared key accepted by Alpha Vantage for a handful of sample symbols.
pub const DEMO_API_KEY: &str = "demo";

const COMPACT_SESSIONS: usize = 100;

/// Size of the daily series requested from Alpha Vantage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputSize {
    /// Latest 100 bars.
    #[default]
    Compact,
    /// Full history, 20+ years.
    Full,
}

impl OutputSize {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Full => "full",
        }
    }

    /// Number of trading sessions the response is capped at, if any.
    pub const fn max_sessions(self) -> Option<usize> {
        match self {
            Self::Compact => Some(COMPACT_SESSIONS),
            Self::Full => None,
        }
    }

    /// Caveat to show next to the period extremes when the response cannot
    /// span a full year of sessions.
    pub fn coverage_note(self) -> Option<String> {
        self.max_sessions()
            .filter(|&sessions| sessions < DEFAULT_HISTORY_LIMIT)
            .map(|sessions| {
                format!(
                    "alphavantage {self} output covers only the latest {sessions} sessions; \
                     low/high are not 52-week values (use --output-size full)"
                )
            })
    }
}

impl Display for OutputSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputSize {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "full" => Ok(Self::Full),
            other => Err(ValidationError::InvalidOutputSize {
                value: other.to_owned(),
            }),
        }
    }
}

/// Alpha Vantage `TIME_SERIES_DAILY` adapter.
///
/// The free tier allows a handful of calls per minute and answers throttled
/// calls with HTTP 200 and a `Note` or `Information` message. Those are
/// surfaced as upstream rejections; pacing is left to the aggregator.
#[derive(Clone)]
pub struct AlphaVantageAdapter {
    http_client: Arc<dyn HttpClient>,
    api_key: String,
    base_url: String,
    output_size: OutputSize,
    limit: usize,
    timeout_ms: u64,
}

impl Default for AlphaVantageAdapter {
    fn default() -> Self {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .unwrap_or_else(|| String::from(DEMO_API_KEY));
        Self::new(Arc::new(ReqwestHttpClient::default()), api_key)
    }
}

impl AlphaVantageAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            base_url: String::from(ALPHAVANTAGE_BASE_URL),
            output_size: OutputSize::default(),
            limit: DEFAULT_HISTORY_LIMIT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_output_size(mut self, output_size: OutputSize) -> Self {
        self.output_size = output_size;
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
        format!(
            "{}/query?function=TIME_SERIES_DAILY&symbol={}&outputsize={}&apikey={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(symbol.as_str()),
            self.output_size,
            urlencoding::encode(&self.api_key)
        )
    }

    async fn fetch_series(&self, symbol: &Symbol) -> Result<PriceSeries, SourceError> {
        if let Some(note) = self.output_size.coverage_note() {
            info!(%symbol, "{note}");
        }
        debug!(
            provider = %ProviderId::Alphavantage,
            %symbol,
            output_size = %self.output_size,
            "requesting daily series"
        );

        let request = HttpRequest::get(self.endpoint(symbol)).with_timeout_ms(self.timeout_ms);
        let body = fetch_body(self.http_client.as_ref(), ProviderId::Alphavantage, request).await?;
        parse_daily(symbol, &body, self.limit)
    }
}

impl PriceSeriesSource for AlphaVantageAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Alphavantage
    }

    fn fetch<'a>(&'a self, symbol: &'a Symbol) -> FetchFuture<'a> {
        Box::pin(self.fetch_series(symbol))
    }
}

fn parse_daily(symbol: &Symbol, body: &str, limit: usize) -> Result<PriceSeries, SourceError> {
    let payload: AlphaVantageResponse =
        serde_json::from_str(body).map_err(|error| malformed(ProviderId::Alphavantage, error))?;

    if let Some(notice) = payload.rejection() {
        return Err(SourceError::upstream_rejected(format!(
            "alphavantage rejected '{symbol}': {notice}"
        )));
    }

    let days = payload.series.ok_or_else(|| {
        SourceError::no_data(format!("alphavantage returned no daily series for '{symbol}'"))
    })?;

    // ISO keys sort chronologically, so reverse iteration is newest first.
    let points = days
        .into_iter()
        .rev()
        .filter_map(|(day, bar)| {
            let date = TradingDate::parse(&day).ok()?;
            PricePoint::from_fields(
                date,
                parse_number(bar.high.as_deref()),
                parse_number(bar.low.as_deref()),
                parse_number(bar.close.as_deref()),
            )
        })
        .take(limit)
        .collect();

    into_series(ProviderId::Alphavantage, symbol, points)
}

fn parse_number(value: Option<&str>) -> Option<f64> {
    value.and_then(|raw| raw.trim().parse::<f64>().ok())
}

#[derive(Debug, Deserialize)]
struct AlphaVantageResponse {
    #[serde(rename = "Time Series (Daily)", default)]
    series: Option<BTreeMap<String, AlphaVantageBar>>,
    #[serde(rename = "Error Message", default)]
    error_message: Option<String>,
    #[serde(rename = "Note", default)]
    note: Option<String>,
    #[serde(rename = "Information", default)]
    information: Option<String>,
}

impl AlphaVantageResponse {
    fn rejection(&self) -> Option<&str> {
        self.error_message
            .as_deref()
            .or(self.note.as_deref())
            .or(self.information.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AlphaVantageBar {
    #[serde(rename = "2. high", default)]
    high: Option<String>,
    #[serde(rename = "3. low", default)]
    low: Option<String>,
    #[serde(rename = "4. close", default)]
    close: Option<String>,
}
