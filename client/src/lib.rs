//! Async client for an encrypted-ERC (EERC) confidential token.
//!
//! Talks to the registrar and token contracts over JSON-RPC and to an
//! out-of-process proof backend over HTTP. Balances are decrypted locally.

mod auditor;
pub mod balance;
pub mod chain;
pub mod client;
pub mod config;
pub mod error;
pub mod evm;
pub mod keys;
mod mint;
mod operation;
pub mod prover;
mod registry;
pub mod status;
mod transfer;

pub use balance::DecryptedBalance;
pub use chain::{Registrar, Submission, TokenContract, BALANCE_PCT_WORDS};
pub use client::EercClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{EercError, Gate, Result};
pub use evm::EvmLedger;
pub use keys::derive_account;
pub use prover::{HttpProofBackend, ProofBackend};
pub use status::SystemStatus;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "eerc_client=info".into()))
        .with(fmt::layer())
        .try_init();
}
