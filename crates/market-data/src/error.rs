//! Market data error types

use thiserror::Error;

/// Errors that can occur during market data operations
///
/// Arithmetic problems never show up here: a missing or non-finite operand
/// turns the derived field into `None` instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketDataError {
    /// Invalid symbol
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Futures maturity label that does not resolve to a month
    #[error("Invalid maturity label: {0}")]
    InvalidMaturity(String),

    /// Date text in none of the accepted formats
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}
