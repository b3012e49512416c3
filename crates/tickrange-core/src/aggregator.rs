//! Ticker batch pipeline: parse, fetch, reduce, collect.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::data_source::{PriceSeriesSource, SourceErrorKind};
use crate::rate_limiter::DEFAULT_WINDOW;
use crate::statistics::{reduce, StatisticsRecord};
use crate::throttling::RequestPacer;
use crate::{BatchError, ProviderPolicy, RateLimitMode, RateLimiter, StatisticsError, Symbol};

/// Why a symbol has no statistics record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    Transport,
    NoData,
    UpstreamRejected,
    RateLimited,
}

impl FailureReason {
    /// Short label shown in place of every statistics column.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Transport => "API Error",
            Self::NoData => "No data",
            Self::UpstreamRejected => "Rejected",
            Self::RateLimited => "Rate limited",
        }
    }
}

impl From<SourceErrorKind> for FailureReason {
    fn from(kind: SourceErrorKind) -> Self {
        match kind {
            SourceErrorKind::Transport => Self::Transport,
            SourceErrorKind::NoData => Self::NoData,
            SourceErrorKind::UpstreamRejected => Self::UpstreamRejected,
        }
    }
}

impl From<&StatisticsError> for FailureReason {
    fn from(error: &StatisticsError) -> Self {
        match error {
            StatisticsError::EmptySeries { .. } => Self::NoData,
        }
    }
}

/// Result for one parsed symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success(StatisticsRecord),
    Failure {
        symbol: Symbol,
        reason: FailureReason,
        message: String,
    },
}

impl Outcome {
    pub fn symbol(&self) -> &Symbol {
        match self {
            Self::Success(record) => &record.symbol,
            Self::Failure { symbol, .. } => symbol,
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub const fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            Self::Success(_) => None,
            Self::Failure { reason, .. } => Some(*reason),
        }
    }

    fn rate_limited(symbol: Symbol) -> Self {
        Self::Failure {
            symbol,
            reason: FailureReason::RateLimited,
            message: String::from("rate budget exhausted for the current window"),
        }
    }
}

/// Ordered outcomes of one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub outcomes: Vec<Outcome>,
    pub success_count: usize,
    /// Number of parsed symbols, including any skipped by a fail-fast stop.
    pub total_count: usize,
}

impl BatchResult {
    fn new(outcomes: Vec<Outcome>, total_count: usize) -> Self {
        let success_count = outcomes.iter().filter(|outcome| outcome.is_success()).count();
        Self {
            outcomes,
            success_count,
            total_count,
        }
    }

    /// Symbols never attempted because a fail-fast limiter stopped the run.
    pub fn skipped_count(&self) -> usize {
        self.total_count.saturating_sub(self.outcomes.len())
    }

    pub fn records(&self) -> impl Iterator<Item = &StatisticsRecord> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            Outcome::Success(record) => Some(record),
            Outcome::Failure { .. } => None,
        })
    }

    /// One-line human summary of the run.
    pub fn summary(&self) -> String {
        let mut line = if self.success_count > 0 {
            format!(
                "Data fetch complete. {} of {} tickers processed successfully.",
                self.success_count, self.total_count
            )
        } else {
            String::from("Failed to fetch data for any tickers. Please check your symbols.")
        };

        let skipped = self.skipped_count();
        if skipped > 0 {
            line.push_str(&format!(" {skipped} skipped (rate limit)."));
        }
        line
    }
}

/// Batch knobs, usually derived from a [`ProviderPolicy`].
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    /// Requests allowed per window; `None` is unbounded.
    pub rate_budget: Option<u32>,
    pub rate_limit_mode: RateLimitMode,
    pub window: Duration,
    pub request_spacing: Option<Duration>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            rate_budget: None,
            rate_limit_mode: RateLimitMode::default(),
            window: DEFAULT_WINDOW,
            request_spacing: None,
        }
    }
}

impl BatchOptions {
    pub fn from_policy(policy: &ProviderPolicy) -> Self {
        Self {
            rate_budget: policy.rate_budget,
            rate_limit_mode: policy.rate_limit_mode,
            window: policy.window,
            request_spacing: policy.request_spacing,
        }
    }
}

/// Runs a comma-separated ticker list through one [`PriceSeriesSource`].
///
/// Without a rate budget or request spacing all symbols are fetched
/// concurrently. Otherwise symbols are processed one at a time so the
/// budget is consumed in input order.
pub struct TickerBatchAggregator {
    source: Arc<dyn PriceSeriesSource>,
    limiter: Option<Arc<RateLimiter>>,
    pacer: Option<RequestPacer>,
}

impl TickerBatchAggregator {
    pub fn new(source: Arc<dyn PriceSeriesSource>, options: BatchOptions) -> Self {
        let limiter = options.rate_budget.map(|budget| {
            Arc::new(RateLimiter::new(
                budget,
                options.window,
                options.rate_limit_mode,
            ))
        });
        let pacer = options.request_spacing.and_then(RequestPacer::new);

        Self {
            source,
            limiter,
            pacer,
        }
    }

    /// Shares an existing limiter, e.g. one budget across several batches.
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn rate_limiter(&self) -> Option<&Arc<RateLimiter>> {
        self.limiter.as_ref()
    }

    pub fn source(&self) -> &dyn PriceSeriesSource {
        self.source.as_ref()
    }

    /// Splits on commas, trims, drops empty tokens. Order and duplicates
    /// are kept.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::EmptyInput`] when no symbol survives.
    pub fn parse_symbols(raw: &str) -> Result<Vec<Symbol>, BatchError> {
        let symbols = Symbol::parse_list(raw);
        if symbols.is_empty() {
            return Err(BatchError::EmptyInput);
        }
        Ok(symbols)
    }

    /// Fetches and reduces every symbol in `raw`.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::EmptyInput`] before any request when `raw`
    /// contains no symbol. Per-symbol failures are recorded as outcomes.
    pub async fn run(&self, raw: &str) -> Result<BatchResult, BatchError> {
        let symbols = Self::parse_symbols(raw)?;
        let total_count = symbols.len();

        let outcomes = if self.limiter.is_some() || self.pacer.is_some() {
            self.run_sequential(&symbols).await
        } else {
            join_all(symbols.iter().map(|symbol| self.evaluate(symbol))).await
        };

        let result = BatchResult::new(outcomes, total_count);
        info!(
            provider = %self.source.id(),
            total = result.total_count,
            succeeded = result.success_count,
            skipped = result.skipped_count(),
            "batch complete"
        );
        Ok(result)
    }

    async fn run_sequential(&self, symbols: &[Symbol]) -> Vec<Outcome> {
        let mut outcomes = Vec::with_capacity(symbols.len());

        for (index, symbol) in symbols.iter().enumerate() {
            if let Some(limiter) = &self.limiter {
                if !limiter.try_acquire() {
                    let remaining = &symbols[index..];
                    warn!(
                        budget = limiter.budget(),
                        mode = %limiter.mode(),
                        remaining = remaining.len(),
                        "rate budget exhausted"
                    );
                    if limiter.mode() == RateLimitMode::RejectRemaining {
                        outcomes.extend(remaining.iter().cloned().map(Outcome::rate_limited));
                    }
                    break;
                }
            }

            if let Some(pacer) = &self.pacer {
                pacer.wait().await;
            }
            outcomes.push(self.evaluate(symbol).await);
        }

        outcomes
    }

    async fn evaluate(&self, symbol: &Symbol) -> Outcome {
        let series = match self.source.fetch(symbol).await {
            Ok(series) => series,
            Err(error) => {
                warn!(%symbol, code = error.code(), "fetch failed: {}", error.message());
                return Outcome::Failure {
                    symbol: symbol.clone(),
                    reason: error.kind().into(),
                    message: error.message().to_owned(),
                };
            }
        };

        match reduce(&series) {
            Ok(record) => Outcome::Success(record),
            Err(error) => {
                warn!(%symbol, "reduction failed: {error}");
                Outcome::Failure {
                    symbol: symbol.clone(),
                    reason: FailureReason::from(&error),
                    message: error.to_string(),
                }
            }
        }
    }
}
