// Shared, single-writer handle around a ledger and its price feed

use crate::core::{format_ether, Amount, Identity};
use crate::ledger::{
    ContributionError, CostMeter, LedgerState, QueryError, WithdrawStrategy, WithdrawalError,
};
use crate::oracle::{conversion_rate, ConversionError, PriceOracle};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Time budget for one price feed read
pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of a successful withdrawal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalReceipt {
    /// Strategy that performed the sweep
    pub strategy: &'static str,
    /// Who received the funds
    pub recipient: Identity,
    /// Amount transferred
    pub amount: Amount,
    /// Storage accesses performed by the sweep
    pub meter: CostMeter,
}

/// Contribution ledger.
///
/// Every transition runs with the state lock held, including the price
/// feed read inside `contribute`, so no intermediate state is observable.
pub struct FundMe<O: PriceOracle> {
    state: Mutex<LedgerState>,
    owner: Identity,
    minimum_usd: Amount,
    oracle: Arc<O>,
    oracle_timeout: Duration,
}

impl<O: PriceOracle> FundMe<O> {
    /// Deploy a fresh ledger owned by `deployer`
    pub fn deploy(deployer: Identity, minimum_usd: Amount, oracle: Arc<O>) -> Self {
        log::info!(
            "Deploying ledger: owner {}, minimum {} USD, price feed {}",
            deployer,
            format_ether(minimum_usd),
            oracle.address()
        );
        Self::from_state(LedgerState::new(deployer, minimum_usd), oracle)
    }

    /// Resume an existing ledger
    pub fn from_state(state: LedgerState, oracle: Arc<O>) -> Self {
        Self {
            owner: state.owner(),
            minimum_usd: state.minimum_usd(),
            state: Mutex::new(state),
            oracle,
            oracle_timeout: DEFAULT_ORACLE_TIMEOUT,
        }
    }

    /// Override the price feed time budget
    pub fn with_oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout = timeout;
        self
    }

    /// Accept `amount` from `caller` if it is worth at least the minimum
    pub async fn contribute(&self, caller: Identity, amount: Amount) -> Result<(), ContributionError> {
        let mut state = self.state.lock().await;

        let value = self.read_value(amount).await?;
        if value < self.minimum_usd {
            log::warn!(
                "Rejected contribution of {} from {}: worth {} USD",
                format_ether(amount),
                caller,
                format_ether(value)
            );
            return Err(ContributionError::BelowMinimumContribution {
                value,
                minimum: self.minimum_usd,
            });
        }

        state.record_contribution(caller, amount)?;

        log::info!(
            "Accepted {} from {} (worth {} USD), total held {}",
            format_ether(amount),
            caller,
            format_ether(value),
            format_ether(state.total_held())
        );
        Ok(())
    }

    /// Plain value transfer with no call data; treated as a contribution
    pub async fn receive(&self, caller: Identity, amount: Amount) -> Result<(), ContributionError> {
        self.contribute(caller, amount).await
    }

    /// Sweep everything to the owner with the chosen strategy
    pub async fn withdraw<S: WithdrawStrategy + ?Sized>(
        &self,
        strategy: &S,
        caller: Identity,
    ) -> Result<Amount, WithdrawalError> {
        self.withdraw_metered(strategy, caller).await.map(|receipt| receipt.amount)
    }

    /// Like `withdraw`, also reporting the storage cost of the sweep
    pub async fn withdraw_metered<S: WithdrawStrategy + ?Sized>(
        &self,
        strategy: &S,
        caller: Identity,
    ) -> Result<WithdrawalReceipt, WithdrawalError> {
        let mut state = self.state.lock().await;
        let mut meter = CostMeter::new();

        let amount = strategy.withdraw(&mut state, &caller, &mut meter)?;

        log::info!(
            "Withdrew {} to {} via {} ({} reads, {} writes)",
            format_ether(amount),
            self.owner,
            strategy.name(),
            meter.reads,
            meter.writes
        );
        Ok(WithdrawalReceipt {
            strategy: strategy.name(),
            recipient: self.owner,
            amount,
            meter,
        })
    }

    /// Reference value of `amount` at the current rate
    pub async fn conversion_rate(&self, amount: Amount) -> Result<Amount, ContributionError> {
        self.read_value(amount).await
    }

    pub fn owner(&self) -> Identity {
        self.owner
    }

    pub fn minimum_usd(&self) -> Amount {
        self.minimum_usd
    }

    /// Address of the price feed this ledger reads
    pub fn price_feed(&self) -> Identity {
        self.oracle.address()
    }

    pub fn oracle(&self) -> &Arc<O> {
        &self.oracle
    }

    pub async fn balance_of(&self, who: &Identity) -> Amount {
        self.state.lock().await.balance_of(who)
    }

    pub async fn total_held(&self) -> Amount {
        self.state.lock().await.total_held()
    }

    pub async fn funder_at(&self, index: usize) -> Result<Identity, QueryError> {
        self.state.lock().await.funder_at(index)
    }

    pub async fn funders(&self) -> Vec<Identity> {
        self.state.lock().await.funders().to_vec()
    }

    /// Copy of the whole state
    pub async fn snapshot(&self) -> LedgerState {
        self.state.lock().await.clone()
    }

    // One bounded feed read, converted to reference units
    async fn read_value(&self, amount: Amount) -> Result<Amount, ContributionError> {
        let round = tokio::time::timeout(self.oracle_timeout, self.oracle.current_rate())
            .await
            .map_err(|_| ContributionError::OracleTimeout)?
            .map_err(|e| ContributionError::OracleUnavailable(e.to_string()))?;

        log::debug!("Price round {}: {} ({} decimals)", round.round_id, round.answer, round.decimals);

        conversion_rate(amount, &round).map_err(|e| match e {
            ConversionError::Overflow => ContributionError::AmountOverflow,
            other => ContributionError::OracleUnavailable(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::units::usd;
    use crate::core::{parse_ether, ONE_NATIVE};
    use crate::ledger::{NaiveWithdraw, OptimizedWithdraw};
    use crate::oracle::MockAggregator;

    fn id(n: u8) -> Identity {
        Identity::new([n; 20])
    }

    fn deploy() -> (FundMe<MockAggregator>, Arc<MockAggregator>) {
        let feed = Arc::new(MockAggregator::default());
        (FundMe::deploy(id(0), usd(50), feed.clone()), feed)
    }

    #[tokio::test]
    async fn test_contribute_at_exact_minimum() {
        let (fund_me, _) = deploy();

        // $50 at $2000 per unit
        let amount = parse_ether("0.025").unwrap();
        fund_me.contribute(id(1), amount).await.unwrap();
        assert_eq!(fund_me.balance_of(&id(1)).await, amount);

        let err = fund_me.contribute(id(2), amount - 1).await.unwrap_err();
        assert!(matches!(err, ContributionError::BelowMinimumContribution { .. }));
    }

    #[tokio::test]
    async fn test_rate_is_read_per_call() {
        let (fund_me, feed) = deploy();
        let amount = parse_ether("0.02").unwrap(); // $40 at 2000, $60 at 3000

        assert!(fund_me.contribute(id(1), amount).await.is_err());

        feed.update_answer(3000_0000_0000).await;
        fund_me.contribute(id(1), amount).await.unwrap();
        assert_eq!(fund_me.total_held().await, amount);

        feed.update_answer(1000_0000_0000).await;
        assert!(fund_me.contribute(id(1), amount).await.is_err());
        assert_eq!(fund_me.total_held().await, amount);
    }

    #[tokio::test]
    async fn test_oracle_offline() {
        let (fund_me, feed) = deploy();
        feed.set_offline(true).await;
        let before = fund_me.snapshot().await;

        let err = fund_me.contribute(id(1), ONE_NATIVE).await.unwrap_err();
        assert!(matches!(err, ContributionError::OracleUnavailable(_)));
        assert_eq!(fund_me.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_oracle_timeout() {
        let feed = Arc::new(MockAggregator::default());
        let fund_me = FundMe::deploy(id(0), usd(50), feed.clone()).with_oracle_timeout(Duration::from_millis(20));
        feed.set_latency(Duration::from_millis(500)).await;

        assert_eq!(
            fund_me.contribute(id(1), ONE_NATIVE).await,
            Err(ContributionError::OracleTimeout)
        );
        assert_eq!(fund_me.total_held().await, 0);

        // Recovers once the feed is responsive again
        feed.set_latency(Duration::ZERO).await;
        fund_me.contribute(id(1), ONE_NATIVE).await.unwrap();
        assert_eq!(fund_me.total_held().await, ONE_NATIVE);
    }

    #[tokio::test]
    async fn test_bad_answer_is_unavailable() {
        let (fund_me, feed) = deploy();
        feed.update_answer(0).await;

        let err = fund_me.contribute(id(1), ONE_NATIVE).await.unwrap_err();
        assert!(matches!(err, ContributionError::OracleUnavailable(_)));
    }

    #[tokio::test]
    async fn test_contribute_with_18_decimal_feed() {
        let feed = Arc::new(MockAggregator::new(18, 2000 * ONE_NATIVE as i128));
        let fund_me = FundMe::deploy(id(0), usd(50), feed);

        fund_me.contribute(id(1), ONE_NATIVE).await.unwrap();

        assert_eq!(fund_me.balance_of(&id(1)).await, ONE_NATIVE);
        assert_eq!(fund_me.conversion_rate(ONE_NATIVE).await, Ok(usd(2000)));

        // $49.98 still falls short
        let err = fund_me.contribute(id(2), parse_ether("0.02499").unwrap()).await.unwrap_err();
        assert!(matches!(err, ContributionError::BelowMinimumContribution { .. }));
    }

    #[tokio::test]
    async fn test_receive_routes_to_contribute() {
        let (fund_me, _) = deploy();

        fund_me.receive(id(3), ONE_NATIVE).await.unwrap();
        assert_eq!(fund_me.funder_at(0).await, Ok(id(3)));
        assert!(fund_me.receive(id(4), 1).await.is_err());
    }

    #[tokio::test]
    async fn test_metered_receipts_agree() {
        let (naive, _) = deploy();
        let (optimized, _) = deploy();
        for n in 1..=6 {
            naive.contribute(id(n), ONE_NATIVE).await.unwrap();
            optimized.contribute(id(n), ONE_NATIVE).await.unwrap();
        }

        let a = naive.withdraw_metered(&NaiveWithdraw, id(0)).await.unwrap();
        let b = optimized.withdraw_metered(&OptimizedWithdraw, id(0)).await.unwrap();

        assert_eq!(a.amount, b.amount);
        assert_eq!(a.recipient, id(0));
        assert_eq!(b.recipient, id(0));
        assert!(b.meter.cost() < a.meter.cost());
        assert_eq!(naive.snapshot().await, optimized.snapshot().await);
    }

    #[tokio::test]
    async fn test_concurrent_contributions_conserve() {
        let (fund_me, _) = deploy();
        let fund_me = Arc::new(fund_me);

        let mut handles = Vec::new();
        for n in 1..=8u8 {
            let fund_me = fund_me.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..10 {
                    fund_me.contribute(id(n), ONE_NATIVE).await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let state = fund_me.snapshot().await;
        assert_eq!(state.total_held(), 80 * ONE_NATIVE);
        assert_eq!(state.funders().len(), 8);
        assert!(state.check_invariants().is_ok());
    }
}
