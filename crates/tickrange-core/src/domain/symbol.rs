use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Ticker symbol as typed by the user.
///
/// Only surrounding whitespace is removed. Case is preserved and handed to
/// the provider unchanged, so `msft` and `MSFT` are distinct symbols here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Splits a comma separated list, dropping empty tokens. Order and
    /// duplicates are kept.
    pub fn parse_list(raw: &str) -> Vec<Self> {
        raw.split(',')
            .filter_map(|token| Self::parse(token).ok())
            .collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_preserves_case() {
        let parsed = Symbol::parse(" msft ").expect("symbol should parse");
        assert_eq!(parsed.as_str(), "msft");
    }

    #[test]
    fn rejects_blank_input() {
        let err = Symbol::parse("   ").expect_err("must fail");
        assert_eq!(err, ValidationError::EmptySymbol);
    }

    #[test]
    fn list_drops_empty_tokens_and_keeps_order() {
        let symbols = Symbol::parse_list("AAPL, msft ,, GOOG");
        let names = symbols.iter().map(Symbol::as_str).collect::<Vec<_>>();
        assert_eq!(names, vec!["AAPL", "msft", "GOOG"]);
    }

    #[test]
    fn list_keeps_duplicates() {
        let symbols = Symbol::parse_list("IBM,IBM, IBM");
        assert_eq!(symbols.len(), 3);
    }

    #[test]
    fn list_of_separators_is_empty() {
        assert!(Symbol::parse_list(" , , ").is_empty());
    }
}
