// Local account management

use crate::core::{identity_from_pubkey, Identity};
use secp256k1::{Secp256k1, SecretKey, PublicKey};
use rand::rngs::OsRng;
use std::path::Path;
use std::fs;
use serde::{Serialize, Deserialize};

/// Serializable key pair (for storage)
#[derive(Serialize, Deserialize)]
struct SerializableKeyPair {
    secret_key_bytes: [u8; 32],
    identity: Identity,
}

/// Key pair
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
    pub identity: Identity,
}

impl KeyPair {
    /// Generate a new key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let mut rng = OsRng;

        let secret_key = SecretKey::new(&mut rng);
        Self::from_secret_key(&secp, secret_key)
    }

    /// Create from secret key bytes
    fn from_secret_bytes(bytes: &[u8; 32]) -> Result<Self, String> {
        let secp = Secp256k1::new();
        let secret_key = SecretKey::from_slice(bytes)
            .map_err(|e| format!("Invalid secret key: {}", e))?;
        Ok(Self::from_secret_key(&secp, secret_key))
    }

    fn from_secret_key(secp: &Secp256k1<secp256k1::All>, secret_key: SecretKey) -> Self {
        let public_key = secret_key.public_key(secp);
        let identity = identity_from_pubkey(&public_key.serialize());

        Self {
            secret_key,
            public_key,
            identity,
        }
    }

    /// Convert to serializable format
    fn to_serializable(&self) -> SerializableKeyPair {
        SerializableKeyPair {
            secret_key_bytes: self.secret_key.secret_bytes(),
            identity: self.identity,
        }
    }
}

/// Keystore - ordered local accounts; account 0 is the deployer
pub struct Keystore {
    keys: Vec<KeyPair>,
}

impl Keystore {
    /// Create a new keystore
    pub fn new() -> Self {
        Self { keys: Vec::new() }
    }

    /// Generate a new account
    pub fn new_account(&mut self) -> Identity {
        let keypair = KeyPair::generate();
        let identity = keypair.identity;
        self.keys.push(keypair);
        identity
    }

    /// Get key pair for identity
    pub fn get_keypair(&self, identity: &Identity) -> Option<&KeyPair> {
        self.keys.iter().find(|kp| kp.identity == *identity)
    }

    /// Account at `index`
    pub fn account(&self, index: usize) -> Option<Identity> {
        self.keys.get(index).map(|kp| kp.identity)
    }

    /// Deployer account (account 0)
    pub fn deployer(&self) -> Option<Identity> {
        self.account(0)
    }

    /// Get all accounts in creation order
    pub fn list_accounts(&self) -> Vec<Identity> {
        self.keys.iter().map(|kp| kp.identity).collect()
    }

    /// Resolve an account index ("2") or a hex identity
    pub fn resolve(&self, name: &str) -> Result<Identity, String> {
        if let Ok(index) = name.parse::<usize>() {
            return self
                .account(index)
                .ok_or_else(|| format!("No account at index {} ({} accounts)", index, self.count()));
        }
        Identity::from_hex(name)
    }

    /// Count accounts
    pub fn count(&self) -> usize {
        self.keys.len()
    }

    /// Save keystore to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        #[derive(Serialize)]
        struct SerializableKeystore {
            keys: Vec<SerializableKeyPair>,
        }

        let data = SerializableKeystore {
            keys: self.keys.iter().map(|kp| kp.to_serializable()).collect(),
        };

        let json = serde_json::to_string_pretty(&data)
            .map_err(|e| format!("Failed to serialize keystore: {}", e))?;

        fs::write(path, json)
            .map_err(|e| format!("Failed to write keystore file: {}", e))?;

        Ok(())
    }

    /// Load keystore from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let json = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read keystore file: {}", e))?;

        #[derive(Deserialize)]
        struct SerializableKeystore {
            keys: Vec<SerializableKeyPair>,
        }

        let data: SerializableKeystore = serde_json::from_str(&json)
            .map_err(|e| format!("Failed to deserialize keystore: {}", e))?;

        let mut keys = Vec::with_capacity(data.keys.len());
        for serializable_kp in data.keys {
            let kp = KeyPair::from_secret_bytes(&serializable_kp.secret_key_bytes)?;
            if kp.identity != serializable_kp.identity {
                return Err(format!("Keystore entry {} does not match its key", serializable_kp.identity));
            }
            keys.push(kp);
        }

        Ok(Self { keys })
    }
}

impl Default for Keystore {
    fn default() -> Self {
        Self::new()
    }
}
