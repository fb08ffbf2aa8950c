// Mock price feed for local development networks

use crate::core::{identity_from_label, Identity};
use crate::oracle::{OracleError, PriceOracle, RoundData};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::RwLock;

/// Default feed precision
pub const DEFAULT_DECIMALS: u8 = 8;

/// Default feed answer: 2000 reference units per native unit
pub const DEFAULT_INITIAL_ANSWER: i128 = 2000_0000_0000;

/// Persistable feed state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedRecord {
    pub address: Identity,
    pub decimals: u8,
    pub answer: i128,
    pub round_id: u64,
}

#[derive(Debug)]
struct FeedState {
    answer: i128,
    round_id: u64,
    offline: bool,
    latency: Duration,
}

/// Aggregator that reports whatever answer it was last given
#[derive(Debug)]
pub struct MockAggregator {
    address: Identity,
    decimals: u8,
    state: RwLock<FeedState>,
}

impl MockAggregator {
    /// Deploy a new mock feed
    pub fn new(decimals: u8, initial_answer: i128) -> Self {
        Self {
            address: identity_from_label("MockV3Aggregator"),
            decimals,
            state: RwLock::new(FeedState {
                answer: initial_answer,
                round_id: 1,
                offline: false,
                latency: Duration::ZERO,
            }),
        }
    }

    /// Restore a feed from its persisted record
    pub fn from_record(record: &FeedRecord) -> Self {
        Self {
            address: record.address,
            decimals: record.decimals,
            state: RwLock::new(FeedState {
                answer: record.answer,
                round_id: record.round_id,
                offline: false,
                latency: Duration::ZERO,
            }),
        }
    }

    /// Snapshot for persistence
    pub async fn record(&self) -> FeedRecord {
        let state = self.state.read().await;
        FeedRecord {
            address: self.address,
            decimals: self.decimals,
            answer: state.answer,
            round_id: state.round_id,
        }
    }

    /// Feed precision
    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Report a new answer, starting a new round
    pub async fn update_answer(&self, answer: i128) {
        let mut state = self.state.write().await;
        state.answer = answer;
        state.round_id += 1;
        log::debug!("Mock feed round {} answer {}", state.round_id, answer);
    }

    /// Make reads fail (test hook)
    pub async fn set_offline(&self, offline: bool) {
        self.state.write().await.offline = offline;
    }

    /// Delay every read (test hook)
    pub async fn set_latency(&self, latency: Duration) {
        self.state.write().await.latency = latency;
    }
}

impl Default for MockAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_DECIMALS, DEFAULT_INITIAL_ANSWER)
    }
}

impl PriceOracle for MockAggregator {
    fn address(&self) -> Identity {
        self.address
    }

    async fn current_rate(&self) -> Result<RoundData, OracleError> {
        let latency = self.state.read().await.latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let state = self.state.read().await;
        if state.offline {
            return Err(OracleError::Unavailable("feed offline".to_string()));
        }

        Ok(RoundData {
            round_id: state.round_id,
            answer: state.answer,
            decimals: self.decimals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_round() {
        let feed = MockAggregator::default();
        let round = feed.current_rate().await.unwrap();

        assert_eq!(round.round_id, 1);
        assert_eq!(round.answer, DEFAULT_INITIAL_ANSWER);
        assert_eq!(round.decimals, DEFAULT_DECIMALS);
    }

    #[tokio::test]
    async fn test_update_answer() {
        let feed = MockAggregator::default();
        feed.update_answer(3000_0000_0000).await;

        let round = feed.current_rate().await.unwrap();
        assert_eq!(round.round_id, 2);
        assert_eq!(round.answer, 3000_0000_0000);
    }

    #[tokio::test]
    async fn test_offline() {
        let feed = MockAggregator::default();
        feed.set_offline(true).await;
        assert!(matches!(feed.current_rate().await, Err(OracleError::Unavailable(_))));

        feed.set_offline(false).await;
        assert!(feed.current_rate().await.is_ok());
    }

    #[tokio::test]
    async fn test_record_roundtrip() {
        let feed = MockAggregator::new(18, 42);
        feed.update_answer(43).await;

        let record = feed.record().await;
        let restored = MockAggregator::from_record(&record);

        assert_eq!(restored.address(), feed.address());
        assert_eq!(restored.current_rate().await, feed.current_rate().await);
    }
}
