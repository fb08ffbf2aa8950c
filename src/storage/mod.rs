// Storage layer for the ledger and its local price feed

mod ledger_db;
mod feed_db;

pub use ledger_db::LedgerDB;
pub use feed_db::FeedDB;

use std::path::Path;

/// Storage manager - combines ledger DB and feed DB
pub struct Storage {
    pub ledger: LedgerDB,
    pub feed: FeedDB,
}

impl Storage {
    /// Create a new storage instance
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let ledger = LedgerDB::new(path.as_ref().join("ledger"))?;
        let feed = FeedDB::new(path.as_ref().join("feed"))?;

        Ok(Self { ledger, feed })
    }

    /// Create an in-memory storage (for testing)
    pub fn memory() -> Result<Self, String> {
        let ledger = LedgerDB::memory()?;
        let feed = FeedDB::memory()?;

        Ok(Self { ledger, feed })
    }
}
