// Owner-only access control

use crate::core::Identity;
use crate::ledger::{LedgerState, WithdrawalError};

/// Proof that the caller of the current transition is the owner.
///
/// Only `AccessGuard::authorize` constructs one, and clearing a ledger
/// consumes it, so clearing can't be reached without the owner check.
#[derive(Debug)]
pub struct OwnerCapability {
    owner: Identity,
}

impl OwnerCapability {
    pub fn owner(&self) -> Identity {
        self.owner
    }
}

/// Stateless owner check
pub struct AccessGuard;

impl AccessGuard {
    pub fn is_owner(state: &LedgerState, caller: &Identity) -> bool {
        state.owner() == *caller
    }

    /// Issue a capability for this call only
    pub fn authorize(state: &LedgerState, caller: &Identity) -> Result<OwnerCapability, WithdrawalError> {
        if !Self::is_owner(state, caller) {
            log::warn!("Rejected privileged call from non-owner {}", caller);
            return Err(WithdrawalError::Unauthorized { caller: *caller });
        }
        Ok(OwnerCapability { owner: state.owner() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_is_authorized() {
        let owner = Identity::new([1; 20]);
        let state = LedgerState::new(owner, 0);

        assert!(AccessGuard::is_owner(&state, &owner));
        let cap = AccessGuard::authorize(&state, &owner).unwrap();
        assert_eq!(cap.owner(), owner);
    }

    #[test]
    fn test_stranger_is_rejected() {
        let owner = Identity::new([1; 20]);
        let stranger = Identity::new([2; 20]);
        let state = LedgerState::new(owner, 0);

        assert!(!AccessGuard::is_owner(&state, &stranger));
        assert_eq!(
            AccessGuard::authorize(&state, &stranger).unwrap_err(),
            WithdrawalError::Unauthorized { caller: stranger }
        );
    }
}
