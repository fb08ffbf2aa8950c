// Core types shared by the ledger, oracle and wallet

mod types;
mod hash;
pub mod units;

pub use types::*;
pub use hash::*;
pub use units::{format_ether, parse_ether, ONE_NATIVE};
