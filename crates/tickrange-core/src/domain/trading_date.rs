use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::ValidationError;

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Calendar date of an end-of-day bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TradingDate(Date);

impl TradingDate {
    pub const fn new(date: Date) -> Self {
        Self(date)
    }

    /// Parses `YYYY-MM-DD`. A trailing time component (`2024-01-02T00:00:00+0000`)
    /// is ignored.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let date_part = trimmed.split('T').next().unwrap_or(trimmed);

        Date::parse(date_part, ISO_DATE)
            .map(Self)
            .map_err(|_| ValidationError::InvalidDate {
                value: input.to_owned(),
            })
    }

    /// UTC calendar date of a unix timestamp in seconds.
    pub fn from_unix_timestamp(seconds: i64) -> Result<Self, ValidationError> {
        OffsetDateTime::from_unix_timestamp(seconds)
            .map(|value| Self(value.date()))
            .map_err(|_| ValidationError::TimestampOutOfRange { value: seconds })
    }

    pub const fn into_inner(self) -> Date {
        self.0
    }

    pub fn format_iso(self) -> String {
        self.0
            .format(ISO_DATE)
            .unwrap_or_else(|_| String::from("<unformattable>"))
    }
}

impl Display for TradingDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_iso())
    }
}

impl Serialize for TradingDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_iso())
    }
}

impl<'de> Deserialize<'de> for TradingDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Month;

    #[test]
    fn parses_plain_iso_date() {
        let parsed = TradingDate::parse("2024-03-15").expect("must parse");
        assert_eq!(parsed.format_iso(), "2024-03-15");
    }

    #[test]
    fn ignores_time_suffix() {
        let parsed = TradingDate::parse("2024-01-02T00:00:00+0000").expect("must parse");
        let expected = Date::from_calendar_date(2024, Month::January, 2).expect("valid date");
        assert_eq!(parsed.into_inner(), expected);
    }

    #[test]
    fn rejects_garbage() {
        let err = TradingDate::parse("yesterday").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidDate { .. }));
    }

    #[test]
    fn converts_unix_timestamp_to_utc_date() {
        // 2024-01-02T14:30:00Z
        let parsed = TradingDate::from_unix_timestamp(1_704_205_800).expect("must convert");
        assert_eq!(parsed.to_string(), "2024-01-02");
    }

    #[test]
    fn orders_chronologically() {
        let earlier = TradingDate::parse("2023-12-29").expect("valid");
        let later = TradingDate::parse("2024-01-02").expect("valid");
        assert!(earlier < later);
    }
}
