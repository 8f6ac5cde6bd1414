//! JSON bodies exchanged with the proof backend.

use alloy_primitives::{B256, U256};
use serde::{Deserialize, Serialize};

use crate::curve::PublicKey;
use crate::elgamal::WireCiphertext;
use crate::proof::ProofBundle;

/// Body of `POST {prover}/mint`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintProofRequest {
    pub amount: u64,
    pub recipient_public_key: PublicKey,
    pub auditor_public_key: PublicKey,
}

/// Body of `POST {prover}/transfer`.
///
/// Carries the sender's secret scalar: the backend needs it to prove the
/// balance decryption. Debug output redacts it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferProofRequest {
    pub amount: u64,
    pub sender_public_key: PublicKey,
    pub sender_private_key: U256,
    pub sender_balance: u64,
    pub sender_encrypted_balance: WireCiphertext,
    pub receiver_public_key: PublicKey,
    pub auditor_public_key: PublicKey,
}

impl std::fmt::Debug for TransferProofRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferProofRequest")
            .field("amount", &self.amount)
            .field("sender_public_key", &self.sender_public_key)
            .field("sender_private_key", &"<redacted>")
            .field("sender_balance", &self.sender_balance)
            .field("sender_encrypted_balance", &self.sender_encrypted_balance)
            .field("receiver_public_key", &self.receiver_public_key)
            .field("auditor_public_key", &self.auditor_public_key)
            .finish()
    }
}

/// Successful (2xx) backend response.
///
/// Either `proof` is present and the client submits it, or `tx_hash` is
/// present and the backend already relayed the transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProverResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<B256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<ProofBundle>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub balance_pct: Vec<U256>,
}

/// Body of a non-2xx backend response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProverErrorBody {
    #[serde(default)]
    pub error: String,
}
