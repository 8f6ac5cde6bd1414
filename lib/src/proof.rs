//! Groth16 proof bundles and the public-signal layouts the token contract
//! verifies against.

use alloy_primitives::{B256, U256};
use serde::{Deserialize, Serialize};

use crate::curve::{PublicKey, WirePoint};
use crate::elgamal::WireCiphertext;
use crate::error::CryptoError;
use crate::keccak256_words;

/// Proof elements exactly as the verifier contract takes them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofPoints {
    pub a: [U256; 2],
    pub b: [[U256; 2]; 2],
    pub c: [U256; 2],
}

/// A proof and its public signals.
///
/// Submission takes the bundle by value: once handed to the contract it is
/// gone, and a rejected bundle is never resubmitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofBundle {
    #[serde(rename = "proofPoints", alias = "points")]
    pub points: ProofPoints,
    pub public_signals: Vec<U256>,
}

impl ProofBundle {
    pub fn new(points: ProofPoints, public_signals: Vec<U256>) -> Self {
        Self {
            points,
            public_signals,
        }
    }

    /// Identifier used for logging and for single-use bookkeeping:
    /// keccak256 over the proof words followed by the public signals.
    pub fn nullifier(&self) -> B256 {
        let points = self
            .points
            .a
            .iter()
            .chain(self.points.b.iter().flatten())
            .chain(self.points.c.iter());
        B256::from(keccak256_words(points.chain(self.public_signals.iter())))
    }
}

fn point_at(signals: &[U256], at: usize) -> WirePoint {
    WirePoint::new(signals[at], signals[at + 1])
}

fn ciphertext_at(signals: &[U256], at: usize) -> WireCiphertext {
    WireCiphertext::from_words([signals[at], signals[at + 1], signals[at + 2], signals[at + 3]])
}

fn check_len(signals: &[U256], expected: usize) -> Result<(), CryptoError> {
    if signals.len() != expected {
        return Err(CryptoError::SignalLayout {
            expected,
            got: signals.len(),
        });
    }
    Ok(())
}

// =============================================================================
//                          MINT SIGNALS
// =============================================================================

/// Public signals of a private mint.
///
/// Layout: `chainId, nullifierHash, recipientPk[2], recipientAmount[4],
/// auditorPk[2], auditorAmount[4]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintSignals {
    pub chain_id: U256,
    pub nullifier_hash: U256,
    pub recipient_key: WirePoint,
    pub recipient_amount: WireCiphertext,
    pub auditor_key: WirePoint,
    pub auditor_amount: WireCiphertext,
}

impl MintSignals {
    pub const LEN: usize = 14;

    pub fn from_signals(signals: &[U256]) -> Result<Self, CryptoError> {
        check_len(signals, Self::LEN)?;
        Ok(Self {
            chain_id: signals[0],
            nullifier_hash: signals[1],
            recipient_key: point_at(signals, 2),
            recipient_amount: ciphertext_at(signals, 4),
            auditor_key: point_at(signals, 8),
            auditor_amount: ciphertext_at(signals, 10),
        })
    }

    pub fn to_signals(&self) -> Vec<U256> {
        let mut out = Vec::with_capacity(Self::LEN);
        out.push(self.chain_id);
        out.push(self.nullifier_hash);
        out.extend(self.recipient_key.to_words());
        out.extend(self.recipient_amount.to_words());
        out.extend(self.auditor_key.to_words());
        out.extend(self.auditor_amount.to_words());
        out
    }

    /// True when the proof targets exactly these keys.
    pub fn binds(&self, recipient: &PublicKey, auditor: &PublicKey) -> bool {
        self.recipient_key == recipient.to_wire() && self.auditor_key == auditor.to_wire()
    }
}

// =============================================================================
//                          TRANSFER SIGNALS
// =============================================================================

/// Public signals of a private transfer.
///
/// Layout: `senderPk[2], senderBalance[4], senderAmount[4], receiverPk[2],
/// receiverAmount[4], auditorPk[2], auditorAmount[4]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferSignals {
    pub sender_key: WirePoint,
    pub sender_balance: WireCiphertext,
    pub sender_amount: WireCiphertext,
    pub receiver_key: WirePoint,
    pub receiver_amount: WireCiphertext,
    pub auditor_key: WirePoint,
    pub auditor_amount: WireCiphertext,
}

impl TransferSignals {
    pub const LEN: usize = 22;

    pub fn from_signals(signals: &[U256]) -> Result<Self, CryptoError> {
        check_len(signals, Self::LEN)?;
        Ok(Self {
            sender_key: point_at(signals, 0),
            sender_balance: ciphertext_at(signals, 2),
            sender_amount: ciphertext_at(signals, 6),
            receiver_key: point_at(signals, 10),
            receiver_amount: ciphertext_at(signals, 12),
            auditor_key: point_at(signals, 16),
            auditor_amount: ciphertext_at(signals, 18),
        })
    }

    pub fn to_signals(&self) -> Vec<U256> {
        let mut out = Vec::with_capacity(Self::LEN);
        out.extend(self.sender_key.to_words());
        out.extend(self.sender_balance.to_words());
        out.extend(self.sender_amount.to_words());
        out.extend(self.receiver_key.to_words());
        out.extend(self.receiver_amount.to_words());
        out.extend(self.auditor_key.to_words());
        out.extend(self.auditor_amount.to_words());
        out
    }

    /// True when the proof spends from `balance` and targets exactly these keys.
    pub fn binds(
        &self,
        sender: &PublicKey,
        balance: &WireCiphertext,
        receiver: &PublicKey,
        auditor: &PublicKey,
    ) -> bool {
        self.sender_key == sender.to_wire()
            && self.sender_balance == *balance
            && self.receiver_key == receiver.to_wire()
            && self.auditor_key == auditor.to_wire()
    }
}
