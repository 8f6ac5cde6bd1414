//! End-to-end test: status → mint → transfer against deployed EERC contracts.
//!
//! Runs the confidential token lifecycle with real proofs from the backend:
//!   1. Checks both accounts are registered and the auditor is set
//!   2. Mints to the sender and waits for confirmation
//!   3. Decrypts the sender balance
//!   4. Transfers to the receiver
//!   5. Verifies the sender balance dropped by exactly the transfer amount
//!      (and, with RECEIVER_PRIVATE_KEY, that the receiver gained it)
//!
//! Usage:
//!   cargo run --release -p eerc-client --bin e2e
//!
//! Required env vars (from .env):
//!   RPC_URL, CHAIN_ID, REGISTRAR_ADDRESS, TOKEN_ADDRESS, PROVER_URL
//!   PRIVATE_KEY        - Registered sender wallet
//!   RECEIVER_ADDRESS   - Registered receiver
//!
//! Optional env vars:
//!   RECEIVER_PRIVATE_KEY - Receiver wallet, enables the receiver-side check
//!   MINT_AMOUNT          - Decimal amount to mint (default: 10)
//!   TRANSFER_AMOUNT      - Decimal amount to transfer (default: 2.5)

use std::time::Duration;

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use anyhow::{ensure, Context, Result};
use eerc_client::{derive_account, init_tracing, ClientConfig, EercClient};
use eerc_lib::TxStatus;

const POLL_INTERVAL: Duration = Duration::from_secs(3);
const MAX_POLLS: u32 = 60;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    // ── Step 0: Load config ────────────────────────────────────────────
    println!("\n=== EERC E2E Test ===\n");

    let config = ClientConfig::from_env().context("loading config")?;
    let signer: PrivateKeySigner = std::env::var("PRIVATE_KEY")
        .context("PRIVATE_KEY not set")?
        .parse()?;
    let receiver: Address = std::env::var("RECEIVER_ADDRESS")
        .context("RECEIVER_ADDRESS not set")?
        .parse()?;
    let receiver_signer: Option<PrivateKeySigner> = match std::env::var("RECEIVER_PRIVATE_KEY") {
        Ok(key) => Some(key.parse().context("RECEIVER_PRIVATE_KEY is not a valid key")?),
        Err(_) => None,
    };
    let mint_text = std::env::var("MINT_AMOUNT").unwrap_or_else(|_| "10".to_string());
    let transfer_text = std::env::var("TRANSFER_AMOUNT").unwrap_or_else(|_| "2.5".to_string());

    println!("RPC:              {}", config.network.rpc_url);
    println!("Registrar:        {}", config.contracts.registrar);
    println!("Token:            {}", config.contracts.token);
    println!("Prover:           {}", config.prover.url);

    // ── Step 1: Connect and check gates ────────────────────────────────
    let sender = derive_account(&signer).await?;
    let client = EercClient::connect(config, signer).await?;
    let mint_amount = client.parse_amount(&mint_text)?;
    let transfer_amount = client.parse_amount(&transfer_text)?;
    ensure!(
        transfer_amount <= mint_amount,
        "TRANSFER_AMOUNT ({transfer_text}) > MINT_AMOUNT ({mint_text})"
    );

    println!("[1] Sender:   {}", sender.address);
    let status = client.system_status(sender.address).await?;
    println!("    registered={} auditor_set={}", status.registered, status.auditor_set);
    ensure!(status.ready, "sender is not ready: {status:?}");
    ensure!(
        client.is_registered(receiver).await?,
        "receiver {receiver} is not registered"
    );
    println!("    Receiver: {receiver} (registered)");

    let receiver_before = match &receiver_signer {
        Some(signer) => {
            let account = derive_account(signer).await?;
            Some((account.clone(), client.balance(&account).await?.units))
        }
        None => None,
    };

    // ── Step 2: Mint ───────────────────────────────────────────────────
    let start = client.balance(&sender).await?.units;
    println!("[2] Minting {mint_text} (balance before: {})...", client.format_units(start)?);
    let record = client.mint(mint_amount, sender.address).await?;
    let record = client.await_confirmation(record, POLL_INTERVAL, MAX_POLLS).await?;
    println!("    Mint tx: {} ({:?})", record.tx_hash, record.status);
    ensure!(record.status == TxStatus::Confirmed, "mint not confirmed");

    // ── Step 3: Balance ────────────────────────────────────────────────
    let after_mint = client.balance(&sender).await?;
    println!("[3] Balance after mint: {}", after_mint.formatted);
    ensure!(
        after_mint.units == start + mint_amount,
        "balance {} != {} + {}",
        after_mint.units,
        start,
        mint_amount
    );

    // ── Step 4: Transfer ───────────────────────────────────────────────
    println!("[4] Transferring {transfer_text} to {receiver}...");
    let record = client.transfer(transfer_amount, &sender, receiver).await?;
    let record = client.await_confirmation(record, POLL_INTERVAL, MAX_POLLS).await?;
    println!("    Transfer tx: {} ({:?})", record.tx_hash, record.status);
    ensure!(record.status == TxStatus::Confirmed, "transfer not confirmed");

    // ── Step 5: Conservation ───────────────────────────────────────────
    println!("\n[5] Verifying final state...");
    let after_transfer = client.balance(&sender).await?;
    ensure!(
        after_transfer.units + transfer_amount == after_mint.units,
        "sender balance {} + {} != {}",
        after_transfer.units,
        transfer_amount,
        after_mint.units
    );
    println!("    Sender balance: {} OK", after_transfer.formatted);

    if let Some((account, before)) = receiver_before {
        let after = client.balance(&account).await?.units;
        ensure!(
            after == before + transfer_amount,
            "receiver balance {after} != {before} + {transfer_amount}"
        );
        println!("    Receiver balance: {} OK", client.format_units(after)?);
    }

    println!("\n=== E2E Test Passed! ===\n");
    Ok(())
}
