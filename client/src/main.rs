//! Command-line client for an EERC confidential token.
//!
//! Subcommands:
//!   keys       - Derive this wallet's confidential key pair
//!   status     - Registration / auditor readiness for an address
//!   balance    - Read and decrypt this wallet's balance
//!   mint       - Mint tokens privately to a registered address
//!   transfer   - Transfer tokens privately to a registered address
//!   tx-status  - Look up a transaction's status

use std::time::Duration;

use alloy::{
    primitives::{Address, B256},
    signers::local::PrivateKeySigner,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eerc_client::{derive_account, init_tracing, ClientConfig, EercClient};
use eerc_lib::TransactionRecord;
use tokio::sync::watch;

#[derive(Parser)]
#[command(name = "eerc-client")]
#[command(about = "Client for an encrypted-ERC confidential token")]
struct Cli {
    /// JSON config file; environment variables are used when absent
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive the confidential key pair from PRIVATE_KEY's signature
    Keys,
    /// Show whether an address can mint and transfer
    Status {
        /// Defaults to the PRIVATE_KEY wallet
        #[arg(long)]
        address: Option<Address>,
    },
    /// Decrypt the PRIVATE_KEY wallet's balance
    Balance,
    /// Mint privately (decimal amount, e.g. 12.5)
    Mint {
        #[arg(long)]
        to: Address,
        #[arg(long)]
        amount: String,
        /// Poll until the transaction is mined
        #[arg(long, default_value = "false")]
        wait: bool,
    },
    /// Transfer privately from the PRIVATE_KEY wallet
    Transfer {
        #[arg(long)]
        to: Address,
        #[arg(long)]
        amount: String,
        /// Poll until the transaction is mined
        #[arg(long, default_value = "false")]
        wait: bool,
    },
    /// Look up a transaction's status
    TxStatus {
        #[arg(long)]
        hash: B256,
    },
}

const POLL_INTERVAL: Duration = Duration::from_secs(3);
const MAX_POLLS: u32 = 40;

fn load_config(path: Option<&str>) -> Result<ClientConfig> {
    match path {
        Some(path) => ClientConfig::from_json_file(path).with_context(|| format!("loading {path}")),
        None => ClientConfig::from_env().context("loading config from environment"),
    }
}

fn load_signer() -> Result<PrivateKeySigner> {
    let private_key = std::env::var("PRIVATE_KEY").context("PRIVATE_KEY not set")?;
    private_key.parse().context("PRIVATE_KEY is not a valid key")
}

fn print_record(client: &EercClient, record: &TransactionRecord) -> Result<()> {
    println!("Kind:         {}", record.kind);
    println!(
        "Amount:       {} {}",
        client.format_units(record.amount)?,
        client.config().token.symbol
    );
    println!("Counterpart:  {}", record.counterpart);
    println!("Tx hash:      {}", record.tx_hash);
    println!("Status:       {:?}", record.status);
    Ok(())
}

/// First Ctrl-C abandons the proof wait; nothing is submitted after that.
fn ctrl_c_cancel() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(true);
        }
    });
    rx
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match &cli.command {
        Commands::Keys => {
            let account = derive_account(&load_signer()?).await?;
            let key = account.keys.public.to_wire();
            println!("Address:      {}", account.address);
            println!("Public key x: {}", key.x);
            println!("Public key y: {}", key.y);
        }
        Commands::Status { address } => {
            let address = match address {
                Some(address) => *address,
                None => load_signer()?.address(),
            };
            let client = EercClient::connect_read_only(load_config(config_path)?).await?;
            let status = client.system_status(address).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Commands::Balance => {
            let signer = load_signer()?;
            let account = derive_account(&signer).await?;
            let client = EercClient::connect(load_config(config_path)?, signer).await?;
            let balance = client.balance(&account).await?;
            println!(
                "Balance:      {} {}",
                balance.formatted,
                client.config().token.symbol
            );
            println!("Tx index:     {}", balance.record.transaction_index);
        }
        Commands::Mint { to, amount, wait } => {
            let client = EercClient::connect(load_config(config_path)?, load_signer()?).await?;
            let units = client.parse_amount(amount)?;
            let mut record = client.mint_with_cancel(units, *to, ctrl_c_cancel()).await?;
            if *wait {
                record = client.await_confirmation(record, POLL_INTERVAL, MAX_POLLS).await?;
            }
            print_record(&client, &record)?;
        }
        Commands::Transfer { to, amount, wait } => {
            let signer = load_signer()?;
            let account = derive_account(&signer).await?;
            let client = EercClient::connect(load_config(config_path)?, signer).await?;
            let units = client.parse_amount(amount)?;
            let mut record = client
                .transfer_with_cancel(units, &account, *to, ctrl_c_cancel())
                .await?;
            if *wait {
                record = client.await_confirmation(record, POLL_INTERVAL, MAX_POLLS).await?;
            }
            print_record(&client, &record)?;
        }
        Commands::TxStatus { hash } => {
            let client = EercClient::connect_read_only(load_config(config_path)?).await?;
            println!("{:?}", client.transaction_status(*hash).await?);
        }
    }

    Ok(())
}
