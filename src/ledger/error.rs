// Ledger error types

use crate::core::{format_ether, Amount, Identity};

/// Why a contribution was rejected. The ledger is unchanged on every variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContributionError {
    /// Converted value is under the minimum (both in reference units)
    BelowMinimumContribution { value: Amount, minimum: Amount },
    /// Price feed read failed or reported an unusable round
    OracleUnavailable(String),
    /// Price feed read exceeded its time budget
    OracleTimeout,
    /// Balance or total would exceed the Amount range
    AmountOverflow,
}

impl std::fmt::Display for ContributionError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ContributionError::BelowMinimumContribution { value, minimum } => write!(
                f,
                "You need to spend more! Contribution worth {} USD, minimum is {} USD",
                format_ether(*value),
                format_ether(*minimum)
            ),
            ContributionError::OracleUnavailable(reason) => write!(f, "Oracle unavailable: {}", reason),
            ContributionError::OracleTimeout => write!(f, "Oracle timed out"),
            ContributionError::AmountOverflow => write!(f, "Amount overflow"),
        }
    }
}

impl std::error::Error for ContributionError {}

/// Why a withdrawal was refused. The ledger is unchanged on every variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WithdrawalError {
    /// Caller is not the owner
    Unauthorized { caller: Identity },
}

impl std::fmt::Display for WithdrawalError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            WithdrawalError::Unauthorized { caller } => write!(f, "Unauthorized: {} is not the owner", caller),
        }
    }
}

impl std::error::Error for WithdrawalError {}

/// Read-side errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Roster index past the current length
    IndexOutOfRange { index: usize, len: usize },
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            QueryError::IndexOutOfRange { index, len } => {
                write!(f, "Funder index {} out of range (roster has {})", index, len)
            }
        }
    }
}

impl std::error::Error for QueryError {}
