use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SymbolError {
    #[error("Invalid input: symbol cannot be empty")]
    Empty,
    #[error("Invalid input: symbol cannot contain '{0}'")]
    InvalidCharacter(char),
}

/// Punctuation seen in real tickers: share classes (`BRK-B`, `BF.B`),
/// indices (`^GSPC`) and currency pairs (`EURUSD=X`).
const SYMBOL_PUNCTUATION: &[char] = &['-', '.', '^', '='];

/// An uppercase ticker symbol such as `AAPL`.
///
/// Existence is not checked here; that is the job of the provider lookup
/// driven by [`crate::prompt::symbol::validate_symbol`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(String);

impl Symbol {
    /// Trims surrounding whitespace and uppercases the input.
    ///
    /// Only ASCII letters, digits and ticker punctuation are accepted, and the
    /// first character cannot be `-`, `.` or `=`. A symbol is therefore always
    /// a single URL path segment and a plain file name.
    pub fn parse(input: &str) -> Result<Self, SymbolError> {
        let symbol = input.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(SymbolError::Empty);
        }
        if let Some(bad) = symbol
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && !SYMBOL_PUNCTUATION.contains(c))
        {
            return Err(SymbolError::InvalidCharacter(bad));
        }
        if let Some(lead) = symbol.chars().next().filter(|c| matches!(c, '-' | '.' | '=')) {
            return Err(SymbolError::InvalidCharacter(lead));
        }
        Ok(Self(symbol))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
