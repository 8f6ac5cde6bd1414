//! Error taxonomy for client operations.

use alloy::primitives::Address;
use eerc_lib::{AmountError, CryptoError};
use thiserror::Error;

use crate::config::ConfigError;

/// The precondition an error is blocked on, when it is one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gate {
    /// The account must be registered with the registrar.
    Registration,
    /// An administrator must configure the auditor key.
    Auditor,
    /// The sender must hold enough balance.
    Balance,
}

#[derive(Debug, Error)]
pub enum EercError {
    /// RPC node or proof backend unreachable.
    #[error("network unreachable: {0}")]
    Connectivity(String),

    #[error("address {address} is not registered")]
    NotRegistered { address: Address },

    #[error("auditor public key is not set on the token contract")]
    AuditorUnset,

    #[error("cannot decrypt balance: {0}")]
    Decryption(String),

    #[error("proof rejected: {reason}; the operation did not complete, re-read the balance and request a fresh proof")]
    ProofRejected { reason: String },

    #[error("insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: u64, need: u64 },

    #[error("insufficient balance on-chain: {reason}; the operation did not complete, re-read the balance and retry")]
    InsufficientBalanceOnChain { reason: String },

    #[error("proof backend error: {0}; the operation did not complete")]
    Prover(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Cancelled before any proof was submitted.
    #[error("cancelled during {stage}")]
    Cancelled { stage: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("contract call failed: {0}")]
    Contract(String),

    #[error("wallet signing failed: {0}")]
    Signer(String),

    /// Transfers are sent by the connected wallet, so the sender account
    /// must be that wallet.
    #[error("sender {sender} is not the submitting wallet {submitter}")]
    SenderMismatch { sender: Address, submitter: Address },
}

impl EercError {
    /// Stable machine-readable code.
    pub fn error_code(&self) -> &'static str {
        match self {
            EercError::Connectivity(_) => "CONNECTIVITY",
            EercError::NotRegistered { .. } => "NOT_REGISTERED",
            EercError::AuditorUnset => "AUDITOR_UNSET",
            EercError::Decryption(_) => "DECRYPTION",
            EercError::ProofRejected { .. } => "PROOF_REJECTED",
            EercError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            EercError::InsufficientBalanceOnChain { .. } => "INSUFFICIENT_BALANCE_ON_CHAIN",
            EercError::Prover(_) => "PROVER",
            EercError::InvalidAmount(_) => "INVALID_AMOUNT",
            EercError::Cancelled { .. } => "CANCELLED",
            EercError::Config(_) => "CONFIG",
            EercError::Contract(_) => "CONTRACT",
            EercError::Signer(_) => "SIGNER",
            EercError::SenderMismatch { .. } => "SENDER_MISMATCH",
        }
    }

    /// Only transient network failures may be retried as-is. Everything else
    /// needs remediation or a fresh proof.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EercError::Connectivity(_))
    }

    pub fn gate(&self) -> Option<Gate> {
        match self {
            EercError::NotRegistered { .. } => Some(Gate::Registration),
            EercError::AuditorUnset => Some(Gate::Auditor),
            EercError::InsufficientBalance { .. } | EercError::InsufficientBalanceOnChain { .. } => {
                Some(Gate::Balance)
            }
            _ => None,
        }
    }
}

impl From<CryptoError> for EercError {
    fn from(err: CryptoError) -> Self {
        EercError::Decryption(err.to_string())
    }
}

impl From<AmountError> for EercError {
    fn from(err: AmountError) -> Self {
        EercError::InvalidAmount(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EercError>;
