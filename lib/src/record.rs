//! Encrypted balance snapshots, transaction records and the operation state
//! table shared by mint and transfer.

use std::fmt;

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::elgamal::WireCiphertext;

/// A per-transaction amount encrypted to the account's key with Poseidon.
/// Carried opaquely.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountPct {
    pub pct: Vec<U256>,
    pub index: U256,
}

/// An account's balance as stored by the token contract.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedBalance {
    pub ciphertext: WireCiphertext,
    pub nonce: U256,
    pub transaction_index: U256,
    pub amount_history: Vec<AmountPct>,
    pub balance_pct: Vec<U256>,
}

impl EncryptedBalance {
    /// Never credited: no ciphertext and no history.
    pub fn is_empty(&self) -> bool {
        self.ciphertext.is_unset() && self.amount_history.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Mint,
    Transfer,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Mint => f.write_str("mint"),
            OperationKind::Transfer => f.write_str("transfer"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    /// Hash known, inclusion not yet observed by this client.
    Pending,
    Confirmed,
    Failed,
}

/// Outcome of a mint or transfer.
///
/// `amount` is in base units and known only to the initiator; on-chain it
/// exists only encrypted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub kind: OperationKind,
    pub amount: u64,
    pub counterpart: Address,
    pub tx_hash: B256,
    pub status: TxStatus,
}

impl TransactionRecord {
    pub fn is_confirmed(&self) -> bool {
        self.status == TxStatus::Confirmed
    }

    pub fn with_status(self, status: TxStatus) -> Self {
        Self { status, ..self }
    }
}

/// Progress of a single mint or transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationState {
    Idle,
    PreconditionCheck,
    BalanceFetched,
    ProofRequested,
    ProofSubmitted,
    Confirmed,
    Failed,
}

impl OperationState {
    pub fn is_terminal(self) -> bool {
        matches!(self, OperationState::Confirmed | OperationState::Failed)
    }

    /// Whether `kind` may move from `self` to `next`.
    ///
    /// Mint: Idle, PreconditionCheck, ProofRequested, ProofSubmitted, Confirmed.
    /// Transfer inserts BalanceFetched after PreconditionCheck. A relayed proof
    /// goes straight from ProofRequested to Confirmed or Failed. Any
    /// non-terminal state may fail.
    pub fn can_advance(self, kind: OperationKind, next: OperationState) -> bool {
        use OperationState::*;
        if self.is_terminal() {
            return false;
        }
        if next == Failed {
            return true;
        }
        match (kind, self, next) {
            (_, Idle, PreconditionCheck) => true,
            (OperationKind::Mint, PreconditionCheck, ProofRequested) => true,
            (OperationKind::Transfer, PreconditionCheck, BalanceFetched) => true,
            (OperationKind::Transfer, BalanceFetched, ProofRequested) => true,
            (_, ProofRequested, ProofSubmitted) => true,
            (_, ProofRequested, Confirmed) => true,
            (_, ProofSubmitted, Confirmed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationState::Idle => "idle",
            OperationState::PreconditionCheck => "precondition-check",
            OperationState::BalanceFetched => "balance-fetched",
            OperationState::ProofRequested => "proof-requested",
            OperationState::ProofSubmitted => "proof-submitted",
            OperationState::Confirmed => "confirmed",
            OperationState::Failed => "failed",
        };
        f.write_str(name)
    }
}
