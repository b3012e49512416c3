use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use super::{fetch_body, into_series, malformed};
use crate::data_source::{FetchFuture, PriceSeriesSource, SourceError, DEFAULT_HISTORY_LIMIT};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient, DEFAULT_TIMEOUT_MS};
use crate::{PricePoint, PriceSeries, ProviderId, Symbol, TradingDate};

pub const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Yahoo Finance chart adapter.
///
/// Calls the public v8 chart endpoint directly for one year of daily bars.
/// The endpoint needs no credential; only a browser-like referer.
#[derive(Clone)]
pub struct YahooChartAdapter {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    limit: usize,
    timeout_ms: u64,
}

impl Default for YahooChartAdapter {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestHttpClient::default()))
    }
}

impl YahooChartAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: String::from(YAHOO_BASE_URL),
            limit: DEFAULT_HISTORY_LIMIT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
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
        format!(
            "{}/v8/finance/chart/{}?range=1y&interval=1d",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(symbol.as_str())
        )
    }

    async fn fetch_series(&self, symbol: &Symbol) -> Result<PriceSeries, SourceError> {
        debug!(provider = %ProviderId::Yahoo, %symbol, "requesting daily series");

        let request = HttpRequest::get(self.endpoint(symbol))
            .with_header("referer", "https://finance.yahoo.com/")
            .with_timeout_ms(self.timeout_ms);
        let body = fetch_body(self.http_client.as_ref(), ProviderId::Yahoo, request).await?;

        let mut series = parse_chart(symbol, &body)?;
        if series.len() > self.limit {
            series.truncate_to_recent(self.limit);
        }
        Ok(series)
    }
}

impl PriceSeriesSource for YahooChartAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn fetch<'a>(&'a self, symbol: &'a Symbol) -> FetchFuture<'a> {
        Box::pin(self.fetch_series(symbol))
    }
}

fn parse_chart(symbol: &Symbol, body: &str) -> Result<PriceSeries, SourceError> {
    let payload: YahooChartResponse =
        serde_json::from_str(body).map_err(|error| malformed(ProviderId::Yahoo, error))?;

    if let Some(error) = payload.chart.error {
        return Err(SourceError::upstream_rejected(format!(
            "yahoo chart API rejected '{symbol}': {}",
            error.describe()
        )));
    }

    let result = payload
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| SourceError::no_data(format!("no chart data for '{symbol}'")))?;

    let timestamps = result.timestamp.unwrap_or_default();
    // Timestamps are UTC; the trading day is the exchange-local date.
    let gmt_offset = result.meta.and_then(|meta| meta.gmtoffset).unwrap_or(0);
    let quote = result
        .indicators
        .and_then(|indicators| indicators.quote.into_iter().next())
        .ok_or_else(|| SourceError::no_data(format!("no quote indicators for '{symbol}'")))?;

    // Columns are parallel arrays; entries are null on halted days.
    let points = timestamps
        .iter()
        .enumerate()
        .filter_map(|(index, &seconds)| {
            let local = seconds.checked_add(gmt_offset)?;
            let date = TradingDate::from_unix_timestamp(local).ok()?;
            PricePoint::from_fields(
                date,
                quote.high.get(index).copied().flatten(),
                quote.low.get(index).copied().flatten(),
                quote.close.get(index).copied().flatten(),
            )
        })
        .collect();

    into_series(ProviderId::Yahoo, symbol, points)
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl YahooChartError {
    fn describe(&self) -> String {
        match (&self.code, &self.description) {
            (Some(code), Some(description)) => format!("{code}: {description}"),
            (Some(code), None) => code.clone(),
            (None, Some(description)) => description.clone(),
            (None, None) => String::from("unspecified error"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    meta: Option<YahooChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: Option<YahooChartIndicators>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartMeta {
    /// Exchange offset from UTC in seconds.
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}
