//! Seams between the client and the two on-chain collaborators.
//!
//! [`crate::evm::EvmLedger`] implements both traits against a live node;
//! tests substitute in-memory ledgers.

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use eerc_lib::{EncryptedBalance, ProofBundle, TxStatus, WirePoint};

use crate::error::Result;

/// Number of words in a balance PCT.
pub const BALANCE_PCT_WORDS: usize = 7;

/// A transaction accepted by the node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Submission {
    pub tx_hash: B256,
    /// `Pending` when the receipt was not observed in time.
    pub status: TxStatus,
}

#[async_trait]
pub trait Registrar: Send + Sync {
    async fn is_registered(&self, address: Address) -> Result<bool>;

    /// Raw registry entry; the unset point when absent.
    async fn public_key(&self, address: Address) -> Result<WirePoint>;
}

#[async_trait]
pub trait TokenContract: Send + Sync {
    /// Raw auditor key; the unset point when not configured.
    async fn auditor_key(&self) -> Result<WirePoint>;

    async fn balance_of(&self, address: Address, token_id: U256) -> Result<EncryptedBalance>;

    /// Submit a mint proof. The bundle is consumed.
    async fn private_mint(&self, recipient: Address, proof: ProofBundle) -> Result<Submission>;

    /// The account transfers are sent from, when this contract signs.
    fn submitter(&self) -> Option<Address> {
        None
    }

    /// Submit a transfer proof from the signing account. The bundle is consumed.
    async fn transfer(
        &self,
        to: Address,
        token_id: U256,
        proof: ProofBundle,
        balance_pct: [U256; BALANCE_PCT_WORDS],
    ) -> Result<Submission>;

    async fn transaction_status(&self, tx_hash: B256) -> Result<TxStatus>;
}
