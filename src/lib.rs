// Threshold-gated contribution ledger
// Accepts contributions worth at least a USD minimum and lets the owner sweep them

pub mod core;
pub mod oracle;
pub mod ledger;
pub mod storage;
pub mod wallet;
pub mod config;
pub mod cli;

// Re-exports for convenience
pub use self::core::{Amount, Identity};
pub use oracle::{PriceOracle, RoundData, OracleError, MockAggregator};
pub use ledger::{
    FundMe, LedgerState, AccessGuard, WithdrawStrategy, NaiveWithdraw, OptimizedWithdraw,
    ContributionError, WithdrawalError, QueryError,
};
pub use storage::{Storage, LedgerDB, FeedDB};
pub use config::Config;
pub use cli::{Cli, CliHandler};
