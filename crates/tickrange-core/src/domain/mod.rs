//! # Domain Models
//!
//! Canonical domain types for tickrange.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Trimmed ticker token, case preserved |
//! | [`TradingDate`] | Calendar date of an end-of-day bar |
//! | [`PricePoint`] | Date plus high, low and close |
//! | [`PriceSeries`] | Unordered collection of points for one symbol |
//!
//! Unlike the statistics built on top of them, these types are deliberately
//! permissive: a provider may return inverted or non-positive prices and
//! the pipeline must carry them through rather than reject the symbol.

mod series;
mod symbol;
mod trading_date;

pub use series::{PricePoint, PriceSeries};
pub use symbol::Symbol;
pub use trading_date::TradingDate;
