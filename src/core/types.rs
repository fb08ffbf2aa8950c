// Basic types for the contribution ledger

use serde::{Deserialize, Serialize};
use std::fmt;

/// Amount of native value units (18 decimals, like wei)
pub type Amount = u128;

/// 160-bit account handle (20 bytes)
/// Used for contributors, the owner, and price feed addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Identity(pub [u8; 20]);

impl Identity {
    /// Create a new Identity from a byte array
    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Create an Identity from a slice
    pub fn from_slice(slice: &[u8]) -> Result<Self, String> {
        if slice.len() != 20 {
            return Err(format!("Invalid identity length: expected 20, got {}", slice.len()));
        }
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    /// Get the identity as a byte slice
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Zero identity (never owned by a key pair)
    pub fn zero() -> Self {
        Self([0u8; 20])
    }

    /// Convert to 0x-prefixed hex string
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from hex string, with or without the 0x prefix
    pub fn from_hex(hex_str: &str) -> Result<Self, String> {
        let trimmed = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(trimmed)
            .map_err(|e| format!("Invalid hex string: {}", e))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_zero() {
        let zero = Identity::zero();
        assert_eq!(zero.as_bytes(), &[0u8; 20]);
    }

    #[test]
    fn test_identity_hex() {
        let id = Identity::new([0xab; 20]);
        let hex = id.to_hex();
        assert!(hex.starts_with("0x"));
        assert_eq!(hex.len(), 42);

        assert_eq!(Identity::from_hex(&hex).unwrap(), id);
        assert_eq!(Identity::from_hex(&hex[2..]).unwrap(), id);
    }

    #[test]
    fn test_identity_bad_length() {
        assert!(Identity::from_hex("0x1234").is_err());
        assert!(Identity::from_slice(&[1u8; 32]).is_err());
    }

    #[test]
    fn test_identity_ordering() {
        let a = Identity::new([1; 20]);
        let b = Identity::new([2; 20]);
        assert!(a < b);
    }
}
