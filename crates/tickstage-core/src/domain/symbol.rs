use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_SYMBOL_LEN: usize = 20;

/// Normalized instrument symbol as the vendor spells it (e.g. `SOLUSDT`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Parse and normalize a symbol to uppercase.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }

        let normalized = trimmed.to_ascii_uppercase();
        let len = normalized.chars().count();
        if len > MAX_SYMBOL_LEN {
            return Err(ValidationError::SymbolTooLong {
                len,
                max: MAX_SYMBOL_LEN,
            });
        }

        if let Some(first) = normalized.chars().next() {
            if !first.is_ascii_alphabetic() {
                return Err(ValidationError::SymbolInvalidStart { ch: first });
            }
        }

        for (index, ch) in normalized.chars().enumerate() {
            let valid = ch.is_ascii_alphanumeric() || ch == '.' || ch == '-' || ch == '_';
            if !valid {
                return Err(ValidationError::SymbolInvalidChar { ch, index });
            }
        }

        Ok(Self(normalized))
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

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercase_input_is_normalized_to_uppercase() {
        let symbol = Symbol::parse("solusdt").expect("valid symbol");
        assert_eq!(symbol.as_str(), "SOLUSDT");
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(Symbol::parse("  "), Err(ValidationError::EmptySymbol));
    }

    #[test]
    fn overlong_input_is_rejected() {
        let result = Symbol::parse("ABCDEFGHIJKLMNOPQRSTU");
        assert_eq!(
            result,
            Err(ValidationError::SymbolTooLong { len: 21, max: 20 })
        );
    }

    #[test]
    fn embedded_whitespace_is_rejected() {
        let result = Symbol::parse("SOL USDT");
        assert_eq!(
            result,
            Err(ValidationError::SymbolInvalidChar { ch: ' ', index: 3 })
        );
    }
}
