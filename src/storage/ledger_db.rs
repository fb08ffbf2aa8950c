// Ledger database using sled

use crate::core::{Amount, Identity};
use crate::ledger::{LedgerState, WithdrawalReceipt};
use sled::{Batch, Db};
use std::collections::BTreeMap;
use std::path::Path;

const OWNER_KEY: &[u8] = b"owner";
const MINIMUM_KEY: &[u8] = b"minimum";
const TOTAL_KEY: &[u8] = b"total";
const ROSTER_PREFIX: u8 = b'r';
const BALANCE_PREFIX: u8 = b'b';
const PAYOUT_PREFIX: u8 = b'p';

/// Ledger database
pub struct LedgerDB {
    db: Db,
}

impl LedgerDB {
    /// Create a new ledger database
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let db = sled::open(path).map_err(|e| format!("Failed to open database: {}", e))?;
        Ok(Self { db })
    }

    /// Create an in-memory database (for testing)
    pub fn memory() -> Result<Self, String> {
        let config = sled::Config::new().temporary(true);
        let db = config.open().map_err(|e| format!("Failed to create memory db: {}", e))?;
        Ok(Self { db })
    }

    /// Whether a ledger has been deployed here
    pub fn is_deployed(&self) -> Result<bool, String> {
        self.db
            .contains_key(OWNER_KEY)
            .map_err(|e| format!("Database error: {}", e))
    }

    /// Replace the stored ledger with `state` in one atomic batch
    pub fn store_state(&self, state: &LedgerState) -> Result<(), String> {
        let batch = self.state_batch(state)?;
        self.apply(batch)
    }

    /// Store the post-withdrawal state and credit the recipient, atomically
    pub fn store_withdrawal(&self, state: &LedgerState, receipt: &WithdrawalReceipt) -> Result<(), String> {
        let mut batch = self.state_batch(state)?;

        let paid = self
            .get_payouts(&receipt.recipient)?
            .checked_add(receipt.amount)
            .ok_or("Payout total overflows")?;
        batch.insert(Self::payout_key(&receipt.recipient), &paid.to_le_bytes());

        self.apply(batch)
    }

    /// Load the stored ledger, if any
    pub fn get_state(&self) -> Result<Option<LedgerState>, String> {
        let owner = match self.db.get(OWNER_KEY).map_err(|e| format!("Database error: {}", e))? {
            Some(data) => Identity::from_slice(&data)?,
            None => return Ok(None),
        };
        let minimum_usd = self.get_amount(MINIMUM_KEY)?;
        let total_held = self.get_amount(TOTAL_KEY)?;

        // Big-endian index keys iterate in roster order
        let mut roster = Vec::new();
        for item in self.db.scan_prefix([ROSTER_PREFIX]) {
            let (_, value) = item.map_err(|e| format!("Iterator error: {}", e))?;
            roster.push(Identity::from_slice(&value)?);
        }

        let mut balances = BTreeMap::new();
        for item in self.db.scan_prefix([BALANCE_PREFIX]) {
            let (key, value) = item.map_err(|e| format!("Iterator error: {}", e))?;
            let funder = Identity::from_slice(&key[1..])?;
            balances.insert(funder, decode_amount(&value)?);
        }

        LedgerState::from_parts(owner, minimum_usd, roster, balances, total_held).map(Some)
    }

    /// Total ever paid out to `who` by withdrawals
    pub fn get_payouts(&self, who: &Identity) -> Result<Amount, String> {
        match self
            .db
            .get(Self::payout_key(who))
            .map_err(|e| format!("Database error: {}", e))?
        {
            Some(data) => decode_amount(&data),
            None => Ok(0),
        }
    }

    // Helper: batch that rewrites every ledger key
    fn state_batch(&self, state: &LedgerState) -> Result<Batch, String> {
        let mut batch = Batch::default();

        // Drop the previous roster and balances; inserts below win over these removals
        for prefix in [ROSTER_PREFIX, BALANCE_PREFIX] {
            for key in self.db.scan_prefix([prefix]).keys() {
                let key = key.map_err(|e| format!("Iterator error: {}", e))?;
                batch.remove(key);
            }
        }

        batch.insert(OWNER_KEY, state.owner().as_bytes().as_slice());
        batch.insert(MINIMUM_KEY, &state.minimum_usd().to_le_bytes());
        batch.insert(TOTAL_KEY, &state.total_held().to_le_bytes());

        for (index, funder) in state.funders().iter().enumerate() {
            batch.insert(Self::roster_key(index)?, funder.as_bytes().as_slice());
        }
        for (funder, amount) in state.balances() {
            batch.insert(Self::balance_key(funder), &amount.to_le_bytes());
        }

        Ok(batch)
    }

    fn apply(&self, batch: Batch) -> Result<(), String> {
        self.db
            .apply_batch(batch)
            .map_err(|e| format!("Failed to store ledger: {}", e))?;
        self.db
            .flush()
            .map_err(|e| format!("Failed to flush: {}", e))?;
        Ok(())
    }

    fn get_amount(&self, key: &[u8]) -> Result<Amount, String> {
        match self.db.get(key).map_err(|e| format!("Database error: {}", e))? {
            Some(data) => decode_amount(&data),
            None => Err(format!("Missing ledger field: {}", String::from_utf8_lossy(key))),
        }
    }

    // Helper: create key for roster storage
    fn roster_key(index: usize) -> Result<Vec<u8>, String> {
        let index = u32::try_from(index)
            .map_err(|_| format!("Roster index {} exceeds key range", index))?;
        let mut key = Vec::with_capacity(5);
        key.push(ROSTER_PREFIX);
        key.extend_from_slice(&index.to_be_bytes());
        Ok(key)
    }

    // Helper: create key for balance storage
    fn balance_key(who: &Identity) -> Vec<u8> {
        let mut key = Vec::with_capacity(21);
        key.push(BALANCE_PREFIX);
        key.extend_from_slice(who.as_bytes());
        key
    }

    fn payout_key(who: &Identity) -> Vec<u8> {
        let mut key = Vec::with_capacity(21);
        key.push(PAYOUT_PREFIX);
        key.extend_from_slice(who.as_bytes());
        key
    }
}

fn decode_amount(data: &[u8]) -> Result<Amount, String> {
    let bytes: [u8; 16] = data
        .try_into()
        .map_err(|_| format!("Invalid amount length: {}", data.len()))?;
    Ok(Amount::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{CostMeter, NaiveWithdraw, OptimizedWithdraw, WithdrawStrategy};

    fn id(n: u8) -> Identity {
        Identity::new([n; 20])
    }

    fn seeded() -> LedgerState {
        let mut state = LedgerState::new(id(0), 50);
        // Insertion order differs from key order on purpose
        for n in [9u8, 3, 7] {
            state.record_contribution(id(n), n as Amount * 10).unwrap();
        }
        state.record_contribution(id(3), 1).unwrap();
        state
    }

    #[test]
    fn test_empty_db() {
        let db = LedgerDB::memory().unwrap();
        assert!(!db.is_deployed().unwrap());
        assert!(db.get_state().unwrap().is_none());
    }

    #[test]
    fn test_store_and_get_state() {
        let db = LedgerDB::memory().unwrap();
        let state = seeded();

        db.store_state(&state).unwrap();

        assert!(db.is_deployed().unwrap());
        let loaded = db.get_state().unwrap().unwrap();
        assert_eq!(loaded, state);
        assert_eq!(loaded.funders(), &[id(9), id(3), id(7)]);
    }

    #[test]
    fn test_cleared_state_drops_old_entries() {
        let db = LedgerDB::memory().unwrap();
        let mut state = seeded();
        db.store_state(&state).unwrap();

        OptimizedWithdraw
            .withdraw(&mut state, &id(0), &mut CostMeter::new())
            .unwrap();
        db.store_state(&state).unwrap();

        let loaded = db.get_state().unwrap().unwrap();
        assert_eq!(loaded.total_held(), 0);
        assert!(loaded.funders().is_empty());
        assert_eq!(loaded.balance_of(&id(9)), 0);
    }

    #[test]
    fn test_store_withdrawal_credits_owner() {
        let db = LedgerDB::memory().unwrap();
        let mut state = seeded();
        db.store_state(&state).unwrap();

        let mut meter = CostMeter::new();
        let amount = NaiveWithdraw.withdraw(&mut state, &id(0), &mut meter).unwrap();
        let receipt = WithdrawalReceipt {
            strategy: NaiveWithdraw.name(),
            recipient: id(0),
            amount,
            meter,
        };
        db.store_withdrawal(&state, &receipt).unwrap();
        db.store_withdrawal(&state, &WithdrawalReceipt { amount: 5, ..receipt }).unwrap();

        assert_eq!(db.get_payouts(&id(0)).unwrap(), amount + 5);
        assert_eq!(db.get_payouts(&id(1)).unwrap(), 0);
        assert_eq!(db.get_state().unwrap().unwrap(), state);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_roster_key_range() {
        assert_eq!(LedgerDB::roster_key(5).unwrap(), vec![ROSTER_PREFIX, 0, 0, 0, 5]);
        assert!(LedgerDB::roster_key(u32::MAX as usize).is_ok());
        assert!(LedgerDB::roster_key(u32::MAX as usize + 1).is_err());
    }
}
