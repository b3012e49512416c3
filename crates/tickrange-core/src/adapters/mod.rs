//! Provider adapters.
//!
//! | Adapter | Provider | Notes |
//! |---------|----------|-------|
//! | [`MarketstackAdapter`] | Marketstack EOD | Optionally routed through a CORS proxy |
//! | [`YahooChartAdapter`] | Yahoo chart v8 | Direct call, no credential |
//! | [`AlphaVantageAdapter`] | Alpha Vantage daily series | Free tier needs client-side throttling |

mod alphavantage;
mod marketstack;
mod yahoo;

pub use alphavantage::{
    AlphaVantageAdapter, OutputSize, ALPHAVANTAGE_BASE_URL, API_KEY_ENV, DEMO_API_KEY,
};
pub use marketstack::{
    MarketstackAdapter, ACCESS_KEY_ENV, DEFAULT_PROXY_URL, MARKETSTACK_BASE_URL,
};
pub use yahoo::{YahooChartAdapter, YAHOO_BASE_URL};

use tracing::debug;

use crate::data_source::SourceError;
use crate::http_client::{HttpClient, HttpRequest};
use crate::{PricePoint, PriceSeries, ProviderId, Symbol};

/// Executes `request` and returns the body of a 2xx response.
async fn fetch_body(
    http_client: &dyn HttpClient,
    provider: ProviderId,
    request: HttpRequest,
) -> Result<String, SourceError> {
    let response = http_client.execute(request).await.map_err(|error| {
        SourceError::transport(format!("{provider} transport error: {}", error.message()))
    })?;

    if !response.is_success() {
        return Err(SourceError::transport(format!(
            "{provider} returned status {}",
            response.status
        )));
    }

    Ok(response.body)
}

fn malformed(provider: ProviderId, error: serde_json::Error) -> SourceError {
    SourceError::no_data(format!("failed to parse {provider} payload: {error}"))
}

/// Wraps filtered points into a series, or fails when nothing survived.
fn into_series(
    provider: ProviderId,
    symbol: &Symbol,
    points: Vec<PricePoint>,
) -> Result<PriceSeries, SourceError> {
    if points.is_empty() {
        return Err(SourceError::no_data(format!(
            "{provider} returned no usable price points for '{symbol}'"
        )));
    }

    debug!(%provider, %symbol, points = points.len(), "parsed daily series");
    Ok(PriceSeries::new(symbol.clone(), points))
}
