//! Private transfer.

use alloy::primitives::{Address, U256};
use eerc_lib::{
    Account, OperationKind, OperationState, TransactionRecord, TransferProofRequest,
    TransferSignals,
};
use tokio::sync::watch;
use tracing::{debug, info, instrument};

use crate::chain::BALANCE_PCT_WORDS;
use crate::client::{cancellable, EercClient};
use crate::error::{EercError, Result};
use crate::operation::{interpret, OperationTracker, ProverOutcome};

/// The backend's new balance PCT for the sender; empty means all zeros.
fn balance_pct_words(words: Vec<U256>) -> Result<[U256; BALANCE_PCT_WORDS]> {
    if words.is_empty() {
        return Ok([U256::ZERO; BALANCE_PCT_WORDS]);
    }
    let len = words.len();
    words.try_into().map_err(|_| {
        EercError::Prover(format!(
            "balancePct has {len} words, expected {BALANCE_PCT_WORDS}"
        ))
    })
}

impl EercClient {
    /// Transfer `amount` base units from `sender` to `receiver`.
    pub async fn transfer(
        &self,
        amount: u64,
        sender: &Account,
        receiver: Address,
    ) -> Result<TransactionRecord> {
        self.run_transfer(amount, sender, receiver, None).await
    }

    pub async fn transfer_with_cancel(
        &self,
        amount: u64,
        sender: &Account,
        receiver: Address,
        cancel: watch::Receiver<bool>,
    ) -> Result<TransactionRecord> {
        self.run_transfer(amount, sender, receiver, Some(cancel)).await
    }

    #[instrument(name = "transfer", skip_all, fields(amount = amount, sender = %sender.address, receiver = %receiver))]
    async fn run_transfer(
        &self,
        amount: u64,
        sender: &Account,
        receiver: Address,
        mut cancel: Option<watch::Receiver<bool>>,
    ) -> Result<TransactionRecord> {
        let mut op = OperationTracker::new(OperationKind::Transfer);
        match self
            .transfer_steps(&mut op, amount, sender, receiver, cancel.as_mut())
            .await
        {
            Ok(record) => Ok(record),
            Err(err) => Err(op.fail(err)),
        }
    }

    async fn transfer_steps(
        &self,
        op: &mut OperationTracker,
        amount: u64,
        sender: &Account,
        receiver: Address,
        cancel: Option<&mut watch::Receiver<bool>>,
    ) -> Result<TransactionRecord> {
        if amount == 0 {
            return Err(EercError::InvalidAmount("amount must be greater than zero".into()));
        }

        op.advance(OperationState::PreconditionCheck);
        if let Some(submitter) = self.token.submitter() {
            if submitter != sender.address {
                return Err(EercError::SenderMismatch {
                    sender: sender.address,
                    submitter,
                });
            }
        }
        let sender_key = self.require_registered(sender.address).await?;
        if sender_key != sender.keys.public {
            return Err(EercError::Decryption(format!(
                "registered key for {} does not match the local key pair",
                sender.address
            )));
        }
        let receiver_key = self.require_registered(receiver).await?;
        let auditor_key = self.require_auditor().await?;

        op.advance(OperationState::BalanceFetched);
        let balance = self.encrypted_balance(sender.address).await?;
        self.prepare_decryption().await?;
        let have = self.decrypt_balance(&balance.ciphertext, &sender.keys.secret)?;
        if amount > have {
            return Err(EercError::InsufficientBalance { have, need: amount });
        }
        debug!(have, "sender balance decrypted");

        op.advance(OperationState::ProofRequested);
        let request = TransferProofRequest {
            amount,
            sender_public_key: sender_key,
            sender_private_key: sender.keys.secret.to_u256(),
            sender_balance: have,
            sender_encrypted_balance: balance.ciphertext,
            receiver_public_key: receiver_key,
            auditor_public_key: auditor_key,
        };
        let response =
            cancellable(self.prover.transfer_proof(&request), cancel, "transfer proof request").await?;

        let (bundle, balance_pct) = match interpret(response)? {
            ProverOutcome::Relayed(tx_hash) => return Ok(op.relayed(tx_hash, amount, receiver)),
            ProverOutcome::Proof {
                bundle,
                balance_pct,
            } => (bundle, balance_pct),
        };

        let signals = TransferSignals::from_signals(&bundle.public_signals).map_err(|e| {
            EercError::ProofRejected {
                reason: e.to_string(),
            }
        })?;
        if !signals.binds(&sender_key, &balance.ciphertext, &receiver_key, &auditor_key) {
            return Err(EercError::ProofRejected {
                reason: "proof does not bind the sender balance and the sender, receiver and auditor keys"
                    .into(),
            });
        }
        let balance_pct = balance_pct_words(balance_pct)?;

        op.advance(OperationState::ProofSubmitted);
        info!(nullifier = %bundle.nullifier(), "submitting transfer proof");
        let submission = self
            .token
            .transfer(receiver, self.config.contracts.token_id, bundle, balance_pct)
            .await?;
        op.finish(submission, amount, receiver)
    }
}
