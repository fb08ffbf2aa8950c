// Local accounts

mod keystore;

pub use keystore::{Keystore, KeyPair};
