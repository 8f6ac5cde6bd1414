//! Private mint.

use alloy::primitives::{Address, U256};
use eerc_lib::{MintProofRequest, MintSignals, OperationKind, OperationState, TransactionRecord};
use tokio::sync::watch;
use tracing::{info, instrument};

use crate::client::{cancellable, EercClient};
use crate::error::{EercError, Result};
use crate::operation::{interpret, OperationTracker, ProverOutcome};

impl EercClient {
    /// Mint `amount` base units to `recipient`.
    pub async fn mint(&self, amount: u64, recipient: Address) -> Result<TransactionRecord> {
        self.run_mint(amount, recipient, None).await
    }

    /// As [`EercClient::mint`]; sending `true` on `cancel` abandons the
    /// operation while the proof is being generated.
    pub async fn mint_with_cancel(
        &self,
        amount: u64,
        recipient: Address,
        cancel: watch::Receiver<bool>,
    ) -> Result<TransactionRecord> {
        self.run_mint(amount, recipient, Some(cancel)).await
    }

    #[instrument(name = "mint", skip_all, fields(amount = amount, recipient = %recipient))]
    async fn run_mint(
        &self,
        amount: u64,
        recipient: Address,
        mut cancel: Option<watch::Receiver<bool>>,
    ) -> Result<TransactionRecord> {
        let mut op = OperationTracker::new(OperationKind::Mint);
        match self.mint_steps(&mut op, amount, recipient, cancel.as_mut()).await {
            Ok(record) => Ok(record),
            Err(err) => Err(op.fail(err)),
        }
    }

    async fn mint_steps(
        &self,
        op: &mut OperationTracker,
        amount: u64,
        recipient: Address,
        cancel: Option<&mut watch::Receiver<bool>>,
    ) -> Result<TransactionRecord> {
        if amount == 0 {
            return Err(EercError::InvalidAmount("amount must be greater than zero".into()));
        }

        op.advance(OperationState::PreconditionCheck);
        let recipient_key = self.require_registered(recipient).await?;
        let auditor_key = self.require_auditor().await?;

        op.advance(OperationState::ProofRequested);
        let request = MintProofRequest {
            amount,
            recipient_public_key: recipient_key,
            auditor_public_key: auditor_key,
        };
        let response = cancellable(self.prover.mint_proof(&request), cancel, "mint proof request").await?;

        let bundle = match interpret(response)? {
            ProverOutcome::Relayed(tx_hash) => return Ok(op.relayed(tx_hash, amount, recipient)),
            ProverOutcome::Proof { bundle, .. } => bundle,
        };

        let signals = MintSignals::from_signals(&bundle.public_signals).map_err(|e| {
            EercError::ProofRejected {
                reason: e.to_string(),
            }
        })?;
        if signals.chain_id != U256::from(self.config.network.chain_id) {
            return Err(EercError::ProofRejected {
                reason: format!("proof is for chain {}", signals.chain_id),
            });
        }
        if !signals.binds(&recipient_key, &auditor_key) {
            return Err(EercError::ProofRejected {
                reason: "proof does not bind the recipient and auditor keys".into(),
            });
        }

        op.advance(OperationState::ProofSubmitted);
        info!(nullifier = %bundle.nullifier(), "submitting mint proof");
        let submission = self.token.private_mint(recipient, bundle).await?;
        op.finish(submission, amount, recipient)
    }
}
