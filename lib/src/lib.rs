//! Core types for the encrypted-ERC (EERC) confidential token client.
//!
//! Everything in this crate is synchronous and side-effect free: curve
//! points and keys, ElGamal balances, amount scaling, proof bundles and the
//! JSON shapes exchanged with the proof backend. Network access lives in
//! `eerc-client`.

use tiny_keccak::{Hasher, Keccak};

pub mod amount;
pub mod curve;
pub mod elgamal;
pub mod error;
pub mod keys;
pub mod proof;
pub mod record;
pub mod request;

pub use amount::{scale, unscale, MAX_DECIMALS};
pub use curve::{PublicKey, WirePoint};
pub use elgamal::{decrypt_amount, Ciphertext, DlogTable, WireCiphertext, MAX_DLOG_BOUND};
pub use error::{AmountError, CryptoError};
pub use keys::{registration_message, Account, KeyPair, SecretKey};
pub use proof::{MintSignals, ProofBundle, ProofPoints, TransferSignals};
pub use record::{
    AmountPct, EncryptedBalance, OperationKind, OperationState, TransactionRecord, TxStatus,
};
pub use request::{MintProofRequest, ProverErrorBody, ProverResponse, TransferProofRequest};

// =============================================================================
//                          KECCAK256 HELPERS
// =============================================================================

/// Compute keccak256 hash. This matches Solidity's keccak256() opcode.
/// Note: tiny_keccak::Keccak is the original Keccak-256 (NOT SHA3-256).
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Hash a sequence of 256-bit words, each taken as 32 big-endian bytes.
/// Matches Solidity: keccak256(abi.encodePacked(words)).
pub fn keccak256_words<'a, I>(words: I) -> [u8; 32]
where
    I: IntoIterator<Item = &'a alloy_primitives::U256>,
{
    let mut hasher = Keccak::v256();
    for word in words {
        hasher.update(&word.to_be_bytes::<32>());
    }
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}
