use serde::{Deserialize, Serialize};

use crate::{Symbol, TradingDate};

/// One end-of-day bar reduced to the fields the statistics need.
///
/// `low <= high` is not enforced; providers occasionally ship inverted bars
/// and the reduction copes with whatever it is given.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: TradingDate,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PricePoint {
    pub const fn new(date: TradingDate, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            high,
            low,
            close,
        }
    }

    /// Builds a point from nullable provider fields. Returns `None` when any
    /// price is missing or not a finite number.
    pub fn from_fields(
        date: TradingDate,
        high: Option<f64>,
        low: Option<f64>,
        close: Option<f64>,
    ) -> Option<Self> {
        let (high, low, close) = (high?, low?, close?);
        if !(high.is_finite() && low.is_finite() && close.is_finite()) {
            return None;
        }
        Some(Self::new(date, high, low, close))
    }
}

/// Daily price history for one symbol. Point order carries no meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: Symbol,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(symbol: Symbol, points: Vec<PricePoint>) -> Self {
        Self { symbol, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Keeps only the `limit` most recent points, newest first.
    pub fn truncate_to_recent(&mut self, limit: usize) {
        self.points.sort_by(|left, right| right.date.cmp(&left.date));
        self.points.truncate(limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(value: &str) -> TradingDate {
        TradingDate::parse(value).expect("valid date")
    }

    #[test]
    fn drops_points_with_missing_fields() {
        let d = date("2024-01-02");
        assert!(PricePoint::from_fields(d, Some(10.0), None, Some(9.5)).is_none());
        assert!(PricePoint::from_fields(d, None, Some(9.0), Some(9.5)).is_none());
        assert!(PricePoint::from_fields(d, Some(10.0), Some(9.0), None).is_none());
        assert!(PricePoint::from_fields(d, Some(f64::NAN), Some(9.0), Some(9.5)).is_none());
        assert!(PricePoint::from_fields(d, Some(10.0), Some(9.0), Some(9.5)).is_some());
    }

    #[test]
    fn keeps_inverted_bars() {
        let point = PricePoint::from_fields(date("2024-01-02"), Some(5.0), Some(8.0), Some(6.0));
        assert_eq!(point.map(|p| (p.high, p.low)), Some((5.0, 8.0)));
    }

    #[test]
    fn truncate_keeps_newest_points() {
        let symbol = Symbol::parse("IBM").expect("valid");
        let mut series = PriceSeries::new(
            symbol,
            vec![
                PricePoint::new(date("2024-01-01"), 1.0, 1.0, 1.0),
                PricePoint::new(date("2024-01-03"), 3.0, 3.0, 3.0),
                PricePoint::new(date("2024-01-02"), 2.0, 2.0, 2.0),
            ],
        );

        series.truncate_to_recent(2);

        assert_eq!(series.len(), 2);
        assert_eq!(series.points[0].date, date("2024-01-03"));
        assert_eq!(series.points[1].date, date("2024-01-02"));
    }
}
