//! A proof backend that builds honest public signals without proving.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use alloy_primitives::{B256, U256};
use async_trait::async_trait;
use eerc_client::{ProofBackend, Result, BALANCE_PCT_WORDS};
use eerc_lib::{
    Ciphertext, MintProofRequest, MintSignals, ProofBundle, ProofPoints, ProverResponse,
    SecretKey, TransferProofRequest, TransferSignals,
};
use rand::rngs::OsRng;
use rand::Rng;

#[derive(Clone, Debug)]
pub enum ProverMode {
    /// Build signals for the request.
    Prove,
    /// Pretend the backend submitted the transaction itself.
    Relay(B256),
    /// `success: false` with this message.
    Reject(String),
    /// Never answer.
    Stall,
    /// Answer every request with the first proof of its kind ever produced.
    Replay,
    /// Build signals with recipient and auditor keys swapped.
    WrongKeys,
}

type Hook = Box<dyn FnOnce() + Send>;

pub struct LocalProver {
    chain_id: u64,
    mode: Mutex<ProverMode>,
    calls: AtomicUsize,
    first_mint: Mutex<Option<ProofBundle>>,
    first_transfer: Mutex<Option<ProofBundle>>,
    before_transfer_reply: Mutex<Option<Hook>>,
}

fn random_points() -> ProofPoints {
    let mut rng = OsRng;
    ProofPoints {
        a: [U256::from_limbs(rng.gen()), U256::from_limbs(rng.gen())],
        b: [
            [U256::from_limbs(rng.gen()), U256::from_limbs(rng.gen())],
            [U256::from_limbs(rng.gen()), U256::from_limbs(rng.gen())],
        ],
        c: [U256::from_limbs(rng.gen()), U256::from_limbs(rng.gen())],
    }
}

fn balance_pct() -> Vec<U256> {
    (0..BALANCE_PCT_WORDS).map(|i| U256::from(i as u64 + 1)).collect()
}

fn proved(bundle: ProofBundle, balance_pct: Vec<U256>) -> ProverResponse {
    ProverResponse {
        success: true,
        proof: Some(bundle),
        balance_pct,
        ..Default::default()
    }
}

fn failure(message: &str) -> ProverResponse {
    ProverResponse {
        success: false,
        message: Some(message.to_string()),
        ..Default::default()
    }
}

impl LocalProver {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            mode: Mutex::new(ProverMode::Prove),
            calls: AtomicUsize::new(0),
            first_mint: Mutex::new(None),
            first_transfer: Mutex::new(None),
            before_transfer_reply: Mutex::new(None),
        }
    }

    pub fn set_mode(&self, mode: ProverMode) {
        *self.mode.lock().unwrap_or_else(|p| p.into_inner()) = mode;
    }

    fn mode(&self) -> ProverMode {
        self.mode.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Run `hook` once, after the next transfer proof is built and before
    /// it is returned.
    pub fn before_transfer_reply(&self, hook: impl FnOnce() + Send + 'static) {
        *self
            .before_transfer_reply
            .lock()
            .unwrap_or_else(|p| p.into_inner()) = Some(Box::new(hook));
    }

    fn mint_bundle(&self, request: &MintProofRequest, swap_keys: bool) -> ProofBundle {
        let (recipient, auditor) = if swap_keys {
            (request.auditor_public_key, request.recipient_public_key)
        } else {
            (request.recipient_public_key, request.auditor_public_key)
        };
        let signals = MintSignals {
            chain_id: U256::from(self.chain_id),
            nullifier_hash: U256::from_limbs(OsRng.gen()),
            recipient_key: recipient.to_wire(),
            recipient_amount: Ciphertext::encrypt(request.amount, &recipient, &mut OsRng).to_wire(),
            auditor_key: auditor.to_wire(),
            auditor_amount: Ciphertext::encrypt(request.amount, &auditor, &mut OsRng).to_wire(),
        };
        ProofBundle::new(random_points(), signals.to_signals())
    }

    fn transfer_bundle(&self, request: &TransferProofRequest, swap_keys: bool) -> ProofBundle {
        let (receiver, auditor) = if swap_keys {
            (request.auditor_public_key, request.receiver_public_key)
        } else {
            (request.receiver_public_key, request.auditor_public_key)
        };
        let sender = request.sender_public_key;
        let signals = TransferSignals {
            sender_key: sender.to_wire(),
            sender_balance: request.sender_encrypted_balance,
            sender_amount: Ciphertext::encrypt(request.amount, &sender, &mut OsRng).to_wire(),
            receiver_key: receiver.to_wire(),
            receiver_amount: Ciphertext::encrypt(request.amount, &receiver, &mut OsRng).to_wire(),
            auditor_key: auditor.to_wire(),
            auditor_amount: Ciphertext::encrypt(request.amount, &auditor, &mut OsRng).to_wire(),
        };
        ProofBundle::new(random_points(), signals.to_signals())
    }
}

#[async_trait]
impl ProofBackend for LocalProver {
    async fn mint_proof(&self, request: &MintProofRequest) -> Result<ProverResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.mode() {
            ProverMode::Prove => Ok(proved(self.mint_bundle(request, false), Vec::new())),
            ProverMode::WrongKeys => Ok(proved(self.mint_bundle(request, true), Vec::new())),
            ProverMode::Replay => {
                let mut first = self.first_mint.lock().unwrap_or_else(|p| p.into_inner());
                let bundle = first
                    .get_or_insert_with(|| self.mint_bundle(request, false))
                    .clone();
                Ok(proved(bundle, Vec::new()))
            }
            ProverMode::Relay(tx_hash) => Ok(ProverResponse {
                success: true,
                tx_hash: Some(tx_hash),
                amount: Some(request.amount.to_string()),
                ..Default::default()
            }),
            ProverMode::Reject(message) => Ok(failure(&message)),
            ProverMode::Stall => std::future::pending().await,
        }
    }

    async fn transfer_proof(&self, request: &TransferProofRequest) -> Result<ProverResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // The circuit only proves for the key that owns the balance.
        let owns_key = SecretKey::from_u256(request.sender_private_key)
            .map(|secret| secret.public_key() == request.sender_public_key)
            .unwrap_or(false);
        if !owns_key {
            return Ok(failure("sender private key does not match sender public key"));
        }
        if request.amount > request.sender_balance {
            return Ok(failure("insufficient balance"));
        }

        let response = match self.mode() {
            ProverMode::Prove => proved(self.transfer_bundle(request, false), balance_pct()),
            ProverMode::Replay => {
                let mut first = self.first_transfer.lock().unwrap_or_else(|p| p.into_inner());
                let bundle = first
                    .get_or_insert_with(|| self.transfer_bundle(request, false))
                    .clone();
                proved(bundle, balance_pct())
            }
            ProverMode::WrongKeys => proved(self.transfer_bundle(request, true), Vec::new()),
            ProverMode::Relay(tx_hash) => ProverResponse {
                success: true,
                tx_hash: Some(tx_hash),
                ..Default::default()
            },
            ProverMode::Reject(message) => failure(&message),
            ProverMode::Stall => std::future::pending().await,
        };

        let hook = self
            .before_transfer_reply
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take();
        if let Some(hook) = hook {
            hook();
        }
        Ok(response)
    }
}
