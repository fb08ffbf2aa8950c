// Mock price feed persistence

use crate::oracle::FeedRecord;
use sled::Db;
use std::path::Path;

const RECORD_KEY: &[u8] = b"record";

/// Feed database
pub struct FeedDB {
    db: Db,
}

impl FeedDB {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let db = sled::open(path).map_err(|e| format!("Failed to open feed db: {}", e))?;
        Ok(Self { db })
    }

    pub fn memory() -> Result<Self, String> {
        let config = sled::Config::new().temporary(true);
        let db = config.open().map_err(|e| format!("Failed to create memory feed db: {}", e))?;
        Ok(Self { db })
    }

    pub fn store_record(&self, record: &FeedRecord) -> Result<(), String> {
        let json = serde_json::to_vec(record)
            .map_err(|e| format!("Failed to serialize feed: {}", e))?;

        self.db
            .insert(RECORD_KEY, json)
            .map_err(|e| format!("Failed to store feed: {}", e))?;
        self.db
            .flush()
            .map_err(|e| format!("Failed to flush: {}", e))?;

        Ok(())
    }

    pub fn get_record(&self) -> Result<Option<FeedRecord>, String> {
        match self.db.get(RECORD_KEY).map_err(|e| format!("Database error: {}", e))? {
            Some(data) => {
                let record = serde_json::from_slice(&data)
                    .map_err(|e| format!("Failed to deserialize feed: {}", e))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::MockAggregator;

    #[tokio::test]
    async fn test_store_and_get_record() {
        let db = FeedDB::memory().unwrap();
        assert!(db.get_record().unwrap().is_none());

        let feed = MockAggregator::default();
        feed.update_answer(1234_0000_0000).await;
        let record = feed.record().await;

        db.store_record(&record).unwrap();
        assert_eq!(db.get_record().unwrap(), Some(record));
    }
}
