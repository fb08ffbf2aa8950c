// Contribution ledger - CLI

use fund_me::{Cli, CliHandler, Config};
use clap::Parser;

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }

    let mut handler = match CliHandler::new(config) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("Error initializing: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = handler.handle(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
