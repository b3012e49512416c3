//! Price-series source trait and its error taxonomy.
//!
//! This module defines the adapter contract (`PriceSeriesSource`) every
//! provider implementation follows. An adapter owns request construction,
//! payload parsing and the mapping of provider failures onto
//! [`SourceErrorKind`].
//!
//! # Example
//!
//! ```rust,ignore
//! use tickrange_core::{PriceSeriesSource, SourceError, Symbol, YahooChartAdapter};
//!
//! async fn latest_close(adapter: &YahooChartAdapter) -> Result<(), SourceError> {
//!     let series = adapter.fetch(&Symbol::parse("AAPL")?).await?;
//!     println!("{} points for {}", series.len(), series.symbol);
//!     Ok(())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{PriceSeries, ProviderId, Symbol};

/// Number of daily bars requested from every provider (about one year).
pub const DEFAULT_HISTORY_LIMIT: usize = 365;

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Network failure or a non-2xx HTTP status.
    Transport,
    /// Payload could not be parsed or held no usable points.
    NoData,
    /// The provider answered but refused the request (unknown symbol,
    /// provider-side throttling, bad credential).
    UpstreamRejected,
}

/// Structured source error carried into failure outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Transport,
            message: message.into(),
        }
    }

    pub fn no_data(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NoData,
            message: message.into(),
        }
    }

    pub fn upstream_rejected(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::UpstreamRejected,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Transport => "source.transport",
            SourceErrorKind::NoData => "source.no_data",
            SourceErrorKind::UpstreamRejected => "source.upstream_rejected",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Boxed future returned by [`PriceSeriesSource::fetch`].
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<PriceSeries, SourceError>> + Send + 'a>>;

/// Source adapter contract.
///
/// Implementations must be `Send + Sync`; the batch aggregator shares one
/// adapter across concurrently running fetches.
pub trait PriceSeriesSource: Send + Sync {
    /// Returns the provider identifier.
    fn id(&self) -> ProviderId;

    /// Fetches roughly one year of daily bars for `symbol`.
    ///
    /// Points with a missing high, low or close are dropped by the adapter.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if:
    /// - the transport fails or the status is not 2xx (`Transport`)
    /// - the payload is malformed or no points survive filtering (`NoData`)
    /// - the provider embeds a rejection notice in its response (`UpstreamRejected`)
    fn fetch<'a>(&'a self, symbol: &'a Symbol) -> FetchFuture<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code() {
        let error = SourceError::upstream_rejected("invalid API call");
        assert_eq!(error.to_string(), "invalid API call (source.upstream_rejected)");
    }

    #[test]
    fn constructors_set_kind() {
        assert_eq!(SourceError::transport("x").kind(), SourceErrorKind::Transport);
        assert_eq!(SourceError::no_data("x").kind(), SourceErrorKind::NoData);
        assert_eq!(
            SourceError::upstream_rejected("x").kind(),
            SourceErrorKind::UpstreamRejected
        );
    }
}
