use thiserror::Error;

/// Input validation failures surfaced before the pipeline starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("symbol must not be empty")]
    EmptySymbol,

    #[error("symbol is {len} characters long, maximum is {max}")]
    SymbolTooLong { len: usize, max: usize },

    #[error("symbol must start with an ASCII letter, found '{ch}'")]
    SymbolInvalidStart { ch: char },

    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("date '{input}' is not a valid YYYYMMDD calendar date")]
    InvalidDate { input: String },

    #[error("{name} must be strictly positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
}
