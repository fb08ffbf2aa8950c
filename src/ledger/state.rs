// Ledger state: owner, policy, roster and balances

use crate::core::{Amount, Identity};
use crate::ledger::{ContributionError, QueryError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The account book.
///
/// Invariants:
/// - `total_held` equals the sum of `balances`
/// - `roster` holds each key of `balances` exactly once, in first-contribution order
/// - `owner` and `minimum_usd` never change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    owner: Identity,
    minimum_usd: Amount,
    pub(crate) roster: Vec<Identity>,
    pub(crate) balances: BTreeMap<Identity, Amount>,
    pub(crate) total_held: Amount,
}

impl LedgerState {
    /// Fresh ledger owned by `owner`
    pub fn new(owner: Identity, minimum_usd: Amount) -> Self {
        Self {
            owner,
            minimum_usd,
            roster: Vec::new(),
            balances: BTreeMap::new(),
            total_held: 0,
        }
    }

    /// Rebuild a ledger from persisted parts, checking the invariants
    pub fn from_parts(
        owner: Identity,
        minimum_usd: Amount,
        roster: Vec<Identity>,
        balances: BTreeMap<Identity, Amount>,
        total_held: Amount,
    ) -> Result<Self, String> {
        let state = Self { owner, minimum_usd, roster, balances, total_held };
        state.check_invariants()?;
        Ok(state)
    }

    pub fn owner(&self) -> Identity {
        self.owner
    }

    /// Minimum contribution in 18-decimal reference units
    pub fn minimum_usd(&self) -> Amount {
        self.minimum_usd
    }

    pub fn total_held(&self) -> Amount {
        self.total_held
    }

    /// Cumulative contribution of `who` since the last clearing (zero if none)
    pub fn balance_of(&self, who: &Identity) -> Amount {
        self.balances.get(who).copied().unwrap_or(0)
    }

    /// Roster entry at `index`
    pub fn funder_at(&self, index: usize) -> Result<Identity, QueryError> {
        self.roster.get(index).copied().ok_or(QueryError::IndexOutOfRange {
            index,
            len: self.roster.len(),
        })
    }

    /// Roster in first-contribution order
    pub fn funders(&self) -> &[Identity] {
        &self.roster
    }

    /// Iterate (contributor, balance) pairs
    pub fn balances(&self) -> impl Iterator<Item = (&Identity, &Amount)> {
        self.balances.iter()
    }

    /// Record an accepted contribution. Nothing changes on error.
    pub(crate) fn record_contribution(&mut self, caller: Identity, amount: Amount) -> Result<(), ContributionError> {
        let balance = self
            .balance_of(&caller)
            .checked_add(amount)
            .ok_or(ContributionError::AmountOverflow)?;
        let total = self
            .total_held
            .checked_add(amount)
            .ok_or(ContributionError::AmountOverflow)?;

        if self.balances.insert(caller, balance).is_none() {
            self.roster.push(caller);
        }
        self.total_held = total;

        Ok(())
    }

    /// Verify the conservation and roster invariants
    pub fn check_invariants(&self) -> Result<(), String> {
        let sum = self
            .balances
            .values()
            .try_fold(0 as Amount, |acc, v| acc.checked_add(*v))
            .ok_or("Balance sum overflows")?;
        if sum != self.total_held {
            return Err(format!("Total held {} does not match balance sum {}", self.total_held, sum));
        }

        if self.roster.len() != self.balances.len() {
            return Err(format!(
                "Roster has {} entries but {} balances are recorded",
                self.roster.len(),
                self.balances.len()
            ));
        }
        for funder in &self.roster {
            if !self.balances.contains_key(funder) {
                return Err(format!("Funder {} has no balance record", funder));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u8) -> Identity {
        Identity::new([n; 20])
    }

    #[test]
    fn test_new_ledger_is_empty() {
        let state = LedgerState::new(id(1), 50);

        assert_eq!(state.owner(), id(1));
        assert_eq!(state.minimum_usd(), 50);
        assert_eq!(state.total_held(), 0);
        assert!(state.funders().is_empty());
        assert_eq!(state.balance_of(&id(2)), 0);
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_record_appends_once() {
        let mut state = LedgerState::new(id(1), 0);

        state.record_contribution(id(2), 10).unwrap();
        state.record_contribution(id(3), 5).unwrap();
        state.record_contribution(id(2), 7).unwrap();

        assert_eq!(state.funders(), &[id(2), id(3)]);
        assert_eq!(state.balance_of(&id(2)), 17);
        assert_eq!(state.balance_of(&id(3)), 5);
        assert_eq!(state.total_held(), 22);
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_overflow_leaves_state_unchanged() {
        let mut state = LedgerState::new(id(1), 0);
        state.record_contribution(id(2), Amount::MAX).unwrap();
        let before = state.clone();

        assert_eq!(state.record_contribution(id(3), 1), Err(ContributionError::AmountOverflow));
        assert_eq!(state, before);
    }

    #[test]
    fn test_funder_at_out_of_range() {
        let mut state = LedgerState::new(id(1), 0);
        state.record_contribution(id(2), 1).unwrap();

        assert_eq!(state.funder_at(0), Ok(id(2)));
        assert_eq!(state.funder_at(1), Err(QueryError::IndexOutOfRange { index: 1, len: 1 }));
    }

    #[test]
    fn test_from_parts_rejects_broken_total() {
        let mut balances = BTreeMap::new();
        balances.insert(id(2), 10);

        assert!(LedgerState::from_parts(id(1), 0, vec![id(2)], balances.clone(), 10).is_ok());
        assert!(LedgerState::from_parts(id(1), 0, vec![id(2)], balances.clone(), 11).is_err());
        assert!(LedgerState::from_parts(id(1), 0, vec![], balances, 10).is_err());
    }
}
