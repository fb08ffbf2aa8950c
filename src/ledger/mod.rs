// Threshold-gated contribution ledger

mod error;
mod state;
mod guard;
mod meter;
mod withdraw;
mod fund_me;

pub use error::{ContributionError, QueryError, WithdrawalError};
pub use state::LedgerState;
pub use guard::{AccessGuard, OwnerCapability};
pub use meter::{CostMeter, READ_COST, WRITE_COST};
pub use withdraw::{NaiveWithdraw, OptimizedWithdraw, WithdrawStrategy};
pub use fund_me::{FundMe, WithdrawalReceipt, DEFAULT_ORACLE_TIMEOUT};
