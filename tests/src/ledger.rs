//! In-memory registrar and token contract.
//!
//! Applies mint and transfer proofs the way the contract does: public
//! signals must match the registry, the auditor key and the stored sender
//! balance, and each proof is accepted once. Proof validity itself is taken
//! on trust.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use eerc_client::{EercError, Registrar, Result, Submission, TokenContract, BALANCE_PCT_WORDS};
use eerc_lib::{
    keccak256, Ciphertext, EncryptedBalance, MintSignals, ProofBundle, PublicKey,
    TransferSignals, TxStatus, WireCiphertext, WirePoint,
};

#[derive(Default)]
struct State {
    chain_id: u64,
    keys: HashMap<Address, WirePoint>,
    auditor: WirePoint,
    balances: HashMap<Address, Ciphertext>,
    tx_index: HashMap<Address, u64>,
    used_nullifiers: HashSet<U256>,
    used_proofs: HashSet<B256>,
    statuses: HashMap<B256, TxStatus>,
    pending_polls: HashMap<B256, u32>,
    receipt_delay: u32,
    offline: bool,
    submitter: Option<Address>,
    submissions: usize,
    attempts: usize,
    tx_counter: u64,
}

impl State {
    fn next_hash(&mut self) -> B256 {
        self.tx_counter += 1;
        B256::from(keccak256(&self.tx_counter.to_be_bytes()))
    }

    fn accept(&mut self) -> Submission {
        let tx_hash = self.next_hash();
        let status = if self.receipt_delay > 0 {
            self.pending_polls.insert(tx_hash, self.receipt_delay);
            TxStatus::Pending
        } else {
            TxStatus::Confirmed
        };
        self.statuses.insert(tx_hash, TxStatus::Confirmed);
        Submission { tx_hash, status }
    }

    fn credit(&mut self, address: Address, amount: &Ciphertext) {
        let balance = self.balances.entry(address).or_insert_with(Ciphertext::zero);
        *balance = balance.add(amount);
        *self.tx_index.entry(address).or_default() += 1;
    }

    fn debit(&mut self, address: Address, amount: &Ciphertext) {
        let balance = self.balances.entry(address).or_insert_with(Ciphertext::zero);
        *balance = balance.sub(amount);
        *self.tx_index.entry(address).or_default() += 1;
    }

    fn stored_balance(&self, address: &Address) -> Ciphertext {
        self.balances.get(address).copied().unwrap_or_else(Ciphertext::zero)
    }

    /// Never-credited accounts read as the all-zero ciphertext.
    fn wire_balance(&self, address: &Address) -> WireCiphertext {
        match self.balances.get(address) {
            Some(balance) => balance.to_wire(),
            None => WireCiphertext::default(),
        }
    }
}

fn rejected(reason: &str) -> EercError {
    EercError::ProofRejected {
        reason: reason.to_string(),
    }
}

pub struct MemoryLedger {
    state: Mutex<State>,
}

impl MemoryLedger {
    pub fn new(chain_id: u64) -> Self {
        Self {
            state: Mutex::new(State {
                chain_id,
                ..Default::default()
            }),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn online(&self) -> Result<std::sync::MutexGuard<'_, State>> {
        let state = self.state();
        if state.offline {
            return Err(EercError::Connectivity("node unreachable".into()));
        }
        Ok(state)
    }

    pub fn register(&self, address: Address, key: &PublicKey) {
        self.state().keys.insert(address, key.to_wire());
    }

    pub fn set_auditor(&self, key: Option<&PublicKey>) {
        self.state().auditor = key.map(PublicKey::to_wire).unwrap_or(WirePoint::UNSET);
    }

    /// Sign transfers as `address`, the way a wallet-backed contract does.
    pub fn set_submitter(&self, address: Address) {
        self.state().submitter = Some(address);
    }

    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    /// Submissions report `Pending` and stay pending for `polls` status queries.
    pub fn set_receipt_delay(&self, polls: u32) {
        self.state().receipt_delay = polls;
    }

    /// Credit outside any proof, as a concurrent transaction would.
    pub fn credit(&self, address: Address, amount: &Ciphertext) {
        self.state().credit(address, amount);
    }

    pub fn ciphertext(&self, address: Address) -> Ciphertext {
        self.state().stored_balance(&address)
    }

    /// Make a hash the ledger never saw (e.g. relayed elsewhere) resolve.
    pub fn mark_mined(&self, tx_hash: B256, status: TxStatus) {
        self.state().statuses.insert(tx_hash, status);
    }

    /// Proof submissions received, accepted or not.
    pub fn attempts(&self) -> usize {
        self.state().attempts
    }

    /// Accepted proof submissions so far.
    pub fn submissions(&self) -> usize {
        self.state().submissions
    }
}

#[async_trait]
impl Registrar for MemoryLedger {
    async fn is_registered(&self, address: Address) -> Result<bool> {
        Ok(self.online()?.keys.contains_key(&address))
    }

    async fn public_key(&self, address: Address) -> Result<WirePoint> {
        Ok(self
            .online()?
            .keys
            .get(&address)
            .copied()
            .unwrap_or(WirePoint::UNSET))
    }
}

#[async_trait]
impl TokenContract for MemoryLedger {
    fn submitter(&self) -> Option<Address> {
        self.state().submitter
    }

    async fn auditor_key(&self) -> Result<WirePoint> {
        Ok(self.online()?.auditor)
    }

    async fn balance_of(&self, address: Address, _token_id: U256) -> Result<EncryptedBalance> {
        let state = self.online()?;
        let ciphertext = state.wire_balance(&address);
        let index = state.tx_index.get(&address).copied().unwrap_or(0);
        Ok(EncryptedBalance {
            ciphertext,
            nonce: U256::from(index),
            transaction_index: U256::from(index),
            amount_history: Vec::new(),
            balance_pct: vec![U256::ZERO; BALANCE_PCT_WORDS],
        })
    }

    async fn private_mint(&self, recipient: Address, proof: ProofBundle) -> Result<Submission> {
        let mut state = self.online()?;
        state.attempts += 1;
        let signals = MintSignals::from_signals(&proof.public_signals)
            .map_err(|e| rejected(&e.to_string()))?;
        if signals.chain_id != U256::from(state.chain_id) {
            return Err(rejected("wrong chain"));
        }
        if state.keys.get(&recipient) != Some(&signals.recipient_key) {
            return Err(rejected("recipient key mismatch"));
        }
        if state.auditor.is_unset() || state.auditor != signals.auditor_key {
            return Err(rejected("auditor key mismatch"));
        }
        if !state.used_nullifiers.insert(signals.nullifier_hash) {
            return Err(rejected("mint nullifier already used"));
        }
        let amount = signals
            .recipient_amount
            .decode()
            .map_err(|e| rejected(&e.to_string()))?;
        state.credit(recipient, &amount);
        state.submissions += 1;
        Ok(state.accept())
    }

    async fn transfer(
        &self,
        to: Address,
        _token_id: U256,
        proof: ProofBundle,
        _balance_pct: [U256; BALANCE_PCT_WORDS],
    ) -> Result<Submission> {
        let mut state = self.online()?;
        state.attempts += 1;
        let signals = TransferSignals::from_signals(&proof.public_signals)
            .map_err(|e| rejected(&e.to_string()))?;
        let sender = state
            .keys
            .iter()
            .find(|(_, key)| **key == signals.sender_key)
            .map(|(address, _)| *address)
            .ok_or_else(|| rejected("sender not registered"))?;
        if state.keys.get(&to) != Some(&signals.receiver_key) {
            return Err(rejected("receiver key mismatch"));
        }
        if state.auditor.is_unset() || state.auditor != signals.auditor_key {
            return Err(rejected("auditor key mismatch"));
        }
        let nullifier = proof.nullifier();
        if state.used_proofs.contains(&nullifier) {
            return Err(rejected("proof already used"));
        }
        if state.wire_balance(&sender) != signals.sender_balance {
            return Err(rejected("sender balance changed since the proof was built"));
        }
        let sender_amount = signals
            .sender_amount
            .decode()
            .map_err(|e| rejected(&e.to_string()))?;
        let receiver_amount = signals
            .receiver_amount
            .decode()
            .map_err(|e| rejected(&e.to_string()))?;
        state.used_proofs.insert(nullifier);
        state.debit(sender, &sender_amount);
        state.credit(to, &receiver_amount);
        state.submissions += 1;
        Ok(state.accept())
    }

    async fn transaction_status(&self, tx_hash: B256) -> Result<TxStatus> {
        let mut state = self.online()?;
        if let Some(remaining) = state.pending_polls.get_mut(&tx_hash) {
            if *remaining > 0 {
                *remaining -= 1;
                return Ok(TxStatus::Pending);
            }
        }
        Ok(state
            .statuses
            .get(&tx_hash)
            .copied()
            .unwrap_or(TxStatus::Pending))
    }
}
