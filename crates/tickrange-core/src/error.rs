use thiserror::Error;

/// Validation and contract errors exposed by `tickrange-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,

    #[error("invalid trading date '{value}', expected YYYY-MM-DD")]
    InvalidDate { value: String },
    #[error("unix timestamp {value} is out of range")]
    TimestampOutOfRange { value: i64 },

    #[error("invalid source '{value}', expected one of marketstack, yahoo, alphavantage")]
    InvalidSource { value: String },
    #[error("invalid rate limit mode '{value}', expected fail-fast or reject-remaining")]
    InvalidRateLimitMode { value: String },
    #[error("invalid output size '{value}', expected compact or full")]
    InvalidOutputSize { value: String },
}

/// Failure of the pure statistics reduction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatisticsError {
    #[error("price series for '{symbol}' has no usable points")]
    EmptySeries { symbol: String },
}

/// Batch-level failure. Per-symbol problems never surface here; they become
/// failure outcomes inside the batch result.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("no ticker symbols found in input")]
    EmptyInput,
}
