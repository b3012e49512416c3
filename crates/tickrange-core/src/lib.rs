//! Core contracts for tickrange.
//!
//! This crate contains:
//! - Canonical domain models and validation
//! - The `PriceSeriesSource` contract and one adapter per provider
//! - The pure range-statistics reduction
//! - Rate limiting, request pacing and the ticker batch aggregator

pub mod adapters;
pub mod aggregator;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod provider_policy;
pub mod rate_limiter;
pub mod source;
pub mod statistics;
pub mod throttling;

pub use adapters::{AlphaVantageAdapter, MarketstackAdapter, OutputSize, YahooChartAdapter};
pub use aggregator::{BatchOptions, BatchResult, FailureReason, Outcome, TickerBatchAggregator};
pub use data_source::{FetchFuture, PriceSeriesSource, SourceError, SourceErrorKind};
pub use domain::{PricePoint, PriceSeries, Symbol, TradingDate};
pub use error::{BatchError, StatisticsError, ValidationError};
pub use http_client::{
    CannedHttpClient, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient,
};
pub use provider_policy::ProviderPolicy;
pub use rate_limiter::{LimiterState, RateLimitMode, RateLimiter};
pub use source::ProviderId;
pub use statistics::{reduce, StatisticsRecord};
pub use throttling::RequestPacer;
