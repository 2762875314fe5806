use std::{error::Error, process::ExitCode};

use consilience_server::{
    config::AppConfig,
    interfaces::ledger::LedgerInterface,
    utils::solana::{SolanaLedger, REWARD_TOKEN_DECIMALS},
};
use tracing::error;
use tracing_subscriber::EnvFilter;

const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();
    match create_reward_token(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("token creation failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn create_reward_token(config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let ledger = SolanaLedger::new(&config.solana_rpc_url, config.solana_private_key.as_deref());

    println!("Network: {}", config.solana_network);
    let operator = ledger.operator_address()?;
    println!("Operator: {operator}");

    let balance = ledger.operator_balance().await?;
    println!("Balance: {} SOL", balance as f64 / LAMPORTS_PER_SOL);
    if balance == 0 {
        return Err(format!(
            "operator has no SOL on {}, fund {operator} first",
            config.solana_network
        )
        .into());
    }

    let mint = ledger.create_reward_mint(REWARD_TOKEN_DECIMALS).await?;
    println!("Reward token created: {mint}");
    println!("Add to .env:\nCS_TOKEN_MINT_ADDRESS={mint}");
    println!("{}", config.solana_network.explorer_address_url(&mint));
    Ok(())
}
