// Hashing utilities for account identities

use sha2::{Sha256, Digest};
use crate::core::Identity;

/// RIPEMD160(SHA256(data)) - used for identity derivation
pub fn hash160(data: &[u8]) -> [u8; 20] {
    use ripemd::{Ripemd160, Digest as RipemdDigest};
    let sha = Sha256::digest(data);
    let ripemd = Ripemd160::digest(sha);
    let mut result = [0u8; 20];
    result.copy_from_slice(&ripemd);
    result
}

/// Identity owned by a public key
pub fn identity_from_pubkey(pubkey: &[u8]) -> Identity {
    Identity::new(hash160(pubkey))
}

/// Deterministic identity for a named, keyless entity (e.g. a deployed feed)
pub fn identity_from_label(label: &str) -> Identity {
    let mut data = Vec::with_capacity(label.len() + 6);
    data.extend_from_slice(b"label:");
    data.extend_from_slice(label.as_bytes());
    Identity::new(hash160(&data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash160() {
        let data = b"test data";
        let hash = hash160(data);
        assert_eq!(hash.len(), 20);
        assert_eq!(hash, hash160(data));
    }

    #[test]
    fn test_label_identity_is_stable() {
        let a = identity_from_label("MockV3Aggregator");
        let b = identity_from_label("MockV3Aggregator");
        let c = identity_from_label("FundMe");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_label_differs_from_pubkey() {
        // Same bytes, different domain
        assert_ne!(identity_from_label("abc"), identity_from_pubkey(b"abc"));
    }
}
