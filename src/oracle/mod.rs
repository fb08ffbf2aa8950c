// Price feeds: the exchange rate between the native unit and the reference unit

mod conversion;
mod mock;

pub use conversion::{conversion_rate, ConversionError};
pub use mock::{FeedRecord, MockAggregator, DEFAULT_DECIMALS, DEFAULT_INITIAL_ANSWER};

use crate::core::Identity;
use std::future::Future;

/// One price report from a feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundData {
    /// Monotonic round counter of the feed
    pub round_id: u64,
    /// Reference units per whole native unit, scaled by 10^decimals
    pub answer: i128,
    /// Decimal precision of `answer`
    pub decimals: u8,
}

/// Price feed error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// Feed could not be read
    Unavailable(String),
}

impl std::fmt::Display for OracleError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            OracleError::Unavailable(reason) => write!(f, "Price feed unavailable: {}", reason),
        }
    }
}

impl std::error::Error for OracleError {}

/// Read-only source of the current exchange rate.
///
/// Successive reads may return different rates; callers must not cache them.
pub trait PriceOracle: Send + Sync {
    /// Address the feed is reachable at
    fn address(&self) -> Identity;

    /// Latest reported rate
    fn current_rate(&self) -> impl Future<Output = Result<RoundData, OracleError>> + Send;
}
