use crate::error::{AppError, Result};
use crate::utils::exchange_pair;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque instrument identifier (e.g. "BTC/BRL"), compared by value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn new(raw: impl AsRef<str>) -> Result<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(AppError::InvalidInput("Symbol must not be empty".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Built from a crate constant that is known to be non-empty
    pub(crate) fn from_static(raw: &'static str) -> Self {
        Self(raw.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Pair code used by the public exchange API ("BTC/BRL" -> "BTCBRL")
    pub fn exchange_pair(&self) -> String {
        exchange_pair(&self.0)
    }
}

impl TryFrom<String> for Symbol {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        Symbol::new(value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl std::str::FromStr for Symbol {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Symbol::new(s)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_equality_by_value() {
        let a = Symbol::new("BTC/BRL").unwrap();
        let b = Symbol::new(" BTC/BRL ").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, Symbol::new("ETH/BRL").unwrap());
    }

    #[test]
    fn test_symbol_rejects_empty() {
        assert!(Symbol::new("   ").is_err());
        assert!(serde_json::from_str::<Symbol>("\"\"").is_err());
    }

    #[test]
    fn test_symbol_pair() {
        let symbol = Symbol::new("ETH/BRL").unwrap();
        assert_eq!(symbol.exchange_pair(), "ETHBRL");
    }
}
