//! Range statistics over a daily price series.
//!
//! [`reduce`] is a pure function: it never performs I/O and returns
//! bit-identical records for identical input. Numeric edge cases (zero or
//! negative prices from a malformed feed) never fail; ratios whose
//! denominator is unusable are reported as `None` and rendered as `N/A`.

use serde::{Deserialize, Serialize};

use crate::{PricePoint, PriceSeries, StatisticsError, Symbol, TradingDate};

/// Per-symbol summary of a price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsRecord {
    pub symbol: Symbol,
    pub current_price: f64,
    pub period_low: f64,
    pub period_high: f64,
    pub low_date: TradingDate,
    pub high_date: TradingDate,
    /// `(current - low) / low`, absent when `low <= 0`.
    pub distance_from_low: Option<f64>,
    /// `(current - high) / high`, absent when `high <= 0`.
    pub distance_from_high: Option<f64>,
    /// `current / low - 1`, absent when `low <= 0`.
    pub percent_to_low: Option<f64>,
}

/// Reduces a series to its [`StatisticsRecord`].
///
/// The current price is the close of the point with the latest date; input
/// order is not trusted. When several points share the extreme low (or
/// high), the first one in iteration order supplies the date.
///
/// # Errors
///
/// Returns [`StatisticsError::EmptySeries`] when the series has no points.
pub fn reduce(series: &PriceSeries) -> Result<StatisticsRecord, StatisticsError> {
    let latest = most_recent(&series.points).ok_or_else(|| StatisticsError::EmptySeries {
        symbol: series.symbol.to_string(),
    })?;

    let mut period_low = latest.low;
    let mut period_high = latest.high;
    for point in &series.points {
        if point.low < period_low {
            period_low = point.low;
        }
        if point.high > period_high {
            period_high = point.high;
        }
    }

    let low_date = series
        .points
        .iter()
        .find(|point| point.low == period_low)
        .map_or(latest.date, |point| point.date);
    let high_date = series
        .points
        .iter()
        .find(|point| point.high == period_high)
        .map_or(latest.date, |point| point.date);

    let current_price = latest.close;

    Ok(StatisticsRecord {
        symbol: series.symbol.clone(),
        current_price,
        period_low,
        period_high,
        low_date,
        high_date,
        distance_from_low: (period_low > 0.0).then(|| (current_price - period_low) / period_low),
        distance_from_high: (period_high > 0.0)
            .then(|| (current_price - period_high) / period_high),
        percent_to_low: (period_low > 0.0).then(|| current_price / period_low - 1.0),
    })
}

/// Latest point by date; the first one wins on equal dates.
fn most_recent(points: &[PricePoint]) -> Option<&PricePoint> {
    points.iter().fold(None, |best, point| match best {
        Some(current) if point.date <= current.date => Some(current),
        _ => Some(point),
    })
}
