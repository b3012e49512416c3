use std::sync::Arc;

use serde::Serialize;
use tickrange_core::{
    AlphaVantageAdapter, BatchResult, HttpClient, MarketstackAdapter, PriceSeriesSource,
    ProviderId, ReqwestHttpClient, TickerBatchAggregator, YahooChartAdapter,
};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::warn;

use crate::cli::FetchArgs;
use crate::config::{FetchSettings, FileConfig};
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct FetchReport {
    pub provider: ProviderId,
    /// RFC 3339 UTC timestamp of when the batch finished.
    pub generated_at: String,
    /// Caveat when the provider's history is shorter than a year.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage_note: Option<String>,
    #[serde(flatten)]
    pub result: BatchResult,
}

pub async fn run(args: &FetchArgs, file: &FileConfig) -> Result<FetchReport, CliError> {
    let settings = FetchSettings::resolve(args, file, |key| std::env::var(key).ok())?;
    let coverage_note = coverage_note(&settings);
    if let Some(note) = &coverage_note {
        warn!("{note}");
    }
    let source = build_source(&settings, Arc::new(ReqwestHttpClient::default()));

    let aggregator = TickerBatchAggregator::new(source, settings.batch.clone());
    let result = aggregator.run(&args.symbols).await?;

    Ok(FetchReport {
        provider: settings.provider,
        generated_at: OffsetDateTime::now_utc().format(&Rfc3339)?,
        coverage_note,
        result,
    })
}

fn coverage_note(settings: &FetchSettings) -> Option<String> {
    match settings.provider {
        ProviderId::Alphavantage => settings.alphavantage_output_size.coverage_note(),
        ProviderId::Marketstack | ProviderId::Yahoo => None,
    }
}

fn build_source(
    settings: &FetchSettings,
    http_client: Arc<dyn HttpClient>,
) -> Arc<dyn PriceSeriesSource> {
    match settings.provider {
        ProviderId::Marketstack => {
            let access_key = settings.marketstack_access_key.clone().unwrap_or_else(|| {
                warn!(
                    "no Marketstack access key configured; \
                     requests will fail with HTTP 401 and show as API errors"
                );
                String::new()
            });
            Arc::new(
                MarketstackAdapter::new(http_client, access_key)
                    .with_proxy(settings.marketstack_proxy_url.clone())
                    .with_timeout_ms(settings.timeout_ms),
            )
        }
        ProviderId::Yahoo => {
            Arc::new(YahooChartAdapter::new(http_client).with_timeout_ms(settings.timeout_ms))
        }
        ProviderId::Alphavantage => Arc::new(
            AlphaVantageAdapter::new(http_client, settings.alphavantage_api_key.clone())
                .with_output_size(settings.alphavantage_output_size)
                .with_timeout_ms(settings.timeout_ms),
        ),
    }
}
