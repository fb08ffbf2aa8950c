// Withdrawal strategies
//
// Both strategies produce the same ledger state and return the same amount.
// They differ only in how often they touch the persistent roster.

use crate::core::{Amount, Identity};
use crate::ledger::{AccessGuard, CostMeter, LedgerState, OwnerCapability, WithdrawalError};

/// A way of sweeping the ledger out to its owner
pub trait WithdrawStrategy: Send + Sync {
    /// Short name for logs and receipts
    fn name(&self) -> &'static str;

    /// Clear every balance and the roster, returning the amount held
    fn sweep(&self, state: &mut LedgerState, cap: OwnerCapability, meter: &mut CostMeter) -> Amount;

    /// Owner check, then sweep. Nothing changes on error.
    fn withdraw(
        &self,
        state: &mut LedgerState,
        caller: &Identity,
        meter: &mut CostMeter,
    ) -> Result<Amount, WithdrawalError> {
        let cap = AccessGuard::authorize(state, caller)?;
        Ok(self.sweep(state, cap, meter))
    }
}

/// Clears against the live roster, re-reading its length on every step
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveWithdraw;

impl WithdrawStrategy for NaiveWithdraw {
    fn name(&self) -> &'static str {
        "withdraw"
    }

    fn sweep(&self, state: &mut LedgerState, cap: OwnerCapability, meter: &mut CostMeter) -> Amount {
        let mut index = 0;
        loop {
            meter.read();
            if index >= state.roster.len() {
                break;
            }
            meter.read();
            let funder = state.roster[index];
            meter.write();
            state.balances.remove(&funder);
            index += 1;
        }

        // Delete roster entries one at a time
        loop {
            meter.read();
            if state.roster.pop().is_none() {
                break;
            }
            meter.write();
        }

        meter.read();
        let amount = state.total_held;
        meter.write();
        state.total_held = 0;

        log::debug!("{} swept {} to {}", self.name(), amount, cap.owner());
        amount
    }
}

/// Reads the roster length once and replaces the roster wholesale
#[derive(Debug, Clone, Copy, Default)]
pub struct OptimizedWithdraw;

impl WithdrawStrategy for OptimizedWithdraw {
    fn name(&self) -> &'static str {
        "cheaper_withdraw"
    }

    fn sweep(&self, state: &mut LedgerState, cap: OwnerCapability, meter: &mut CostMeter) -> Amount {
        meter.read();
        let len = state.roster.len();

        let funders = std::mem::take(&mut state.roster);
        meter.write();

        for funder in &funders[..len] {
            meter.read();
            meter.write();
            state.balances.remove(funder);
        }

        meter.read();
        let amount = std::mem::take(&mut state.total_held);
        meter.write();

        log::debug!("{} swept {} to {}", self.name(), amount, cap.owner());
        amount
    }
}
