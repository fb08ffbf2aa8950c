// CLI commands

use clap::{Parser, Subcommand};
use crate::config::Config;
use crate::core::units::{format_units, parse_units, usd};
use crate::core::{format_ether, parse_ether, Identity};
use crate::ledger::{FundMe, NaiveWithdraw, OptimizedWithdraw, WithdrawStrategy};
use crate::oracle::{MockAggregator, PriceOracle, RoundData};
use crate::storage::Storage;
use crate::wallet::Keystore;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "fund-me")]
#[command(about = "Threshold-gated contribution ledger", long_about = None)]
pub struct Cli {
    /// Config file (defaults to ./fundme.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory (overrides the config file)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Deploy a new ledger (and a mock price feed)
    Init {
        /// Minimum contribution in whole USD (overrides the config file)
        #[arg(long)]
        minimum_usd: Option<u64>,
    },

    /// Show ledger info
    Info,

    /// Account commands
    #[command(subcommand)]
    Account(AccountCommands),

    /// Contribute to the ledger
    Fund {
        /// Amount in native units, e.g. "0.5"
        amount: String,
        /// Contributing account (index or hex identity, defaults to the deployer)
        #[arg(short, long)]
        from: Option<String>,
    },

    /// Sweep all funds to the owner
    Withdraw {
        /// Calling account (index or hex identity, defaults to the deployer)
        #[arg(short, long)]
        from: Option<String>,
        /// Use the cheaper withdrawal path
        #[arg(long)]
        cheaper: bool,
    },

    /// Get the contributed balance of an account
    Balance {
        /// Account to check (defaults to the deployer)
        account: Option<String>,
    },

    /// Get the funder at a roster position
    Funder {
        index: usize,
    },

    /// List all funders
    Funders,

    /// Price feed commands
    #[command(subcommand)]
    Price(PriceCommands),
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new account
    New,

    /// List all accounts
    List,
}

#[derive(Subcommand)]
pub enum PriceCommands {
    /// Show the current price
    Show {
        /// Also convert this native amount to USD
        amount: Option<String>,
    },

    /// Report a new price on the mock feed
    Set {
        /// USD per native unit, e.g. "1850.25"
        price: String,
    },
}

/// CLI handler
pub struct CliHandler {
    config: Config,
    storage: Storage,
    keystore: Keystore,
    keystore_path: PathBuf,
}

impl CliHandler {
    /// Create a new CLI handler
    pub fn new(config: Config) -> Result<Self, String> {
        std::fs::create_dir_all(&config.data_dir)
            .map_err(|e| format!("Failed to create data dir: {}", e))?;
        let storage = Storage::new(&config.data_dir)?;

        // Load or create keystore
        let keystore_path = config.data_dir.join("keystore.json");
        let keystore = if keystore_path.exists() {
            log::info!("Loading keystore from {}", keystore_path.display());
            Keystore::load(&keystore_path)?
        } else {
            log::info!("Creating new keystore");
            Keystore::new()
        };

        Ok(Self {
            config,
            storage,
            keystore,
            keystore_path,
        })
    }

    /// Save keystore to disk
    fn save_keystore(&self) -> Result<(), String> {
        self.keystore.save(&self.keystore_path)
    }

    /// Handle CLI command
    pub async fn handle(&mut self, cli: Cli) -> Result<(), String> {
        match cli.command {
            Commands::Init { minimum_usd } => self.init(minimum_usd).await,
            Commands::Info => self.info().await,
            Commands::Account(cmd) => self.handle_account(cmd),
            Commands::Fund { amount, from } => self.fund(&amount, from.as_deref()).await,
            Commands::Withdraw { from, cheaper } => self.withdraw(from.as_deref(), cheaper).await,
            Commands::Balance { account } => self.balance(account.as_deref()).await,
            Commands::Funder { index } => {
                let fund_me = self.load_ledger()?;
                let funder = fund_me.funder_at(index).await.map_err(|e| e.to_string())?;
                println!("Funder {}: {}", index, funder);
                Ok(())
            }
            Commands::Funders => self.funders().await,
            Commands::Price(cmd) => self.handle_price(cmd).await,
        }
    }

    /// Deploy the ledger and its feed
    async fn init(&mut self, minimum_usd: Option<u64>) -> Result<(), String> {
        if self.storage.ledger.is_deployed()? {
            return Err("Ledger already deployed".to_string());
        }

        let network = &self.config.network;
        if !network.is_development() {
            return Err(format!(
                "No price feed available for network {} (chain id {}); only development networks deploy a mock feed",
                network.name, network.chain_id
            ));
        }

        let deployer = match self.keystore.deployer() {
            Some(id) => id,
            None => {
                let id = self.keystore.new_account();
                self.save_keystore()?;
                println!("Created deployer account {}", id);
                id
            }
        };

        println!("Deploying to {} (chain id {})...", network.name, network.chain_id);

        let oracle = &self.config.oracle;
        let feed = Arc::new(MockAggregator::new(oracle.decimals, oracle.initial_answer as i128));
        self.storage.feed.store_record(&feed.record().await)?;

        let minimum = minimum_usd.unwrap_or(self.config.minimum_usd);
        let fund_me = FundMe::deploy(deployer, usd(minimum), feed);
        self.storage.ledger.store_state(&fund_me.snapshot().await)?;

        println!("✓ Ledger deployed");
        println!("  Owner: {}", fund_me.owner());
        println!("  Minimum: {} USD", minimum);
        println!("  Price feed: {}", fund_me.price_feed());

        Ok(())
    }

    /// Show ledger info
    async fn info(&self) -> Result<(), String> {
        let fund_me = self.load_ledger()?;
        let round = self.read_round(fund_me.oracle().as_ref()).await?;

        println!("Ledger Info:");
        println!("  Network: {} (chain id {})", self.config.network.name, self.config.network.chain_id);
        println!("  Owner: {}", fund_me.owner());
        println!("  Minimum: {} USD", format_ether(fund_me.minimum_usd()));
        println!("  Price feed: {}", fund_me.price_feed());
        println!("  Price: {} USD (round {})", format_units(round.answer.max(0) as u128, round.decimals as u32), round.round_id);
        println!("  Total held: {}", format_ether(fund_me.total_held().await));
        println!("  Funders: {}", fund_me.funders().await.len());
        println!("  Paid out to owner: {}", format_ether(self.storage.ledger.get_payouts(&fund_me.owner())?));

        Ok(())
    }

    /// Handle account commands
    fn handle_account(&mut self, cmd: AccountCommands) -> Result<(), String> {
        match cmd {
            AccountCommands::New => {
                let id = self.keystore.new_account();
                println!("New account [{}]: {}", self.keystore.count() - 1, id);
                self.save_keystore()?;
                Ok(())
            }
            AccountCommands::List => {
                let accounts = self.keystore.list_accounts();
                println!("Accounts ({}):", accounts.len());
                for (index, id) in accounts.iter().enumerate() {
                    let role = if index == 0 { " (deployer)" } else { "" };
                    println!("  [{}] {}{}", index, id, role);
                }
                Ok(())
            }
        }
    }

    async fn fund(&self, amount: &str, from: Option<&str>) -> Result<(), String> {
        let fund_me = self.load_ledger()?;
        let from = self.resolve_account(from)?;
        let amount = parse_ether(amount)?;

        fund_me.contribute(from, amount).await.map_err(|e| e.to_string())?;
        self.storage.ledger.store_state(&fund_me.snapshot().await)?;

        println!("✓ Funded {} from {}", format_ether(amount), from);
        println!("  Balance: {}", format_ether(fund_me.balance_of(&from).await));
        println!("  Total held: {}", format_ether(fund_me.total_held().await));

        Ok(())
    }

    async fn withdraw(&self, from: Option<&str>, cheaper: bool) -> Result<(), String> {
        let fund_me = self.load_ledger()?;
        let caller = self.resolve_account(from)?;

        let strategy: &dyn WithdrawStrategy = if cheaper { &OptimizedWithdraw } else { &NaiveWithdraw };
        let receipt = fund_me
            .withdraw_metered(strategy, caller)
            .await
            .map_err(|e| e.to_string())?;
        self.storage.ledger.store_withdrawal(&fund_me.snapshot().await, &receipt)?;

        println!("✓ Withdrew {} to {}", format_ether(receipt.amount), receipt.recipient);
        println!(
            "  Cost ({}): {} ({} reads, {} writes)",
            receipt.strategy,
            receipt.meter.cost(),
            receipt.meter.reads,
            receipt.meter.writes
        );

        Ok(())
    }

    async fn balance(&self, account: Option<&str>) -> Result<(), String> {
        let fund_me = self.load_ledger()?;
        let who = self.resolve_account(account)?;

        println!("Balance for {}:", who);
        println!("  Contributed: {}", format_ether(fund_me.balance_of(&who).await));
        println!("  Received from withdrawals: {}", format_ether(self.storage.ledger.get_payouts(&who)?));

        Ok(())
    }

    async fn funders(&self) -> Result<(), String> {
        let fund_me = self.load_ledger()?;
        let state = fund_me.snapshot().await;

        println!("Funders ({}):", state.funders().len());
        for (index, funder) in state.funders().iter().enumerate() {
            println!("  [{}] {} {}", index, funder, format_ether(state.balance_of(funder)));
        }

        Ok(())
    }

    /// Handle price feed commands
    async fn handle_price(&self, cmd: PriceCommands) -> Result<(), String> {
        let feed = self.load_feed()?;
        match cmd {
            PriceCommands::Show { amount } => {
                let round = self.read_round(&feed).await?;
                println!("Price feed {}:", feed.address());
                println!("  Round: {}", round.round_id);
                println!("  Price: {} USD", format_units(round.answer.max(0) as u128, round.decimals as u32));

                if let Some(amount) = amount {
                    let native = parse_ether(&amount)?;
                    let value = crate::oracle::conversion_rate(native, &round).map_err(|e| e.to_string())?;
                    println!("  {} = {} USD", format_ether(native), format_ether(value));
                }
                Ok(())
            }
            PriceCommands::Set { price } => {
                let answer = parse_units(&price, feed.decimals() as u32)?;
                let answer = i128::try_from(answer).map_err(|_| format!("Price too large: {}", price))?;
                if answer == 0 {
                    return Err("Price must be positive".to_string());
                }

                feed.update_answer(answer).await;
                let record = feed.record().await;
                self.storage.feed.store_record(&record)?;

                println!("✓ Price set to {} USD (round {})", price, record.round_id);
                Ok(())
            }
        }
    }

    /// One feed read, bounded by the configured oracle timeout
    async fn read_round<O: PriceOracle>(&self, feed: &O) -> Result<RoundData, String> {
        tokio::time::timeout(self.config.oracle.timeout(), feed.current_rate())
            .await
            .map_err(|_| "Price feed timed out".to_string())?
            .map_err(|e| e.to_string())
    }

    fn load_feed(&self) -> Result<MockAggregator, String> {
        let record = self
            .storage
            .feed
            .get_record()?
            .ok_or("Price feed not deployed. Run 'init' first")?;
        Ok(MockAggregator::from_record(&record))
    }

    fn load_ledger(&self) -> Result<FundMe<MockAggregator>, String> {
        let state = self
            .storage
            .ledger
            .get_state()?
            .ok_or("Ledger not deployed. Run 'init' first")?;
        let feed = Arc::new(self.load_feed()?);

        Ok(FundMe::from_state(state, feed).with_oracle_timeout(self.config.oracle.timeout()))
    }

    fn resolve_account(&self, name: Option<&str>) -> Result<Identity, String> {
        match name {
            Some(name) => self.keystore.resolve(name),
            None => self
                .keystore
                .deployer()
                .ok_or_else(|| "No accounts. Create one with 'account new'".to_string()),
        }
    }
}
