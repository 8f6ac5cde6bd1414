//! State tracking and response handling shared by mint and transfer.

use alloy::primitives::{Address, B256, U256};
use eerc_lib::{
    OperationKind, OperationState, ProofBundle, ProverResponse, TransactionRecord, TxStatus,
};
use tracing::{debug, info, warn};

use crate::chain::Submission;
use crate::error::{EercError, Result};

pub(crate) struct OperationTracker {
    kind: OperationKind,
    state: OperationState,
}

impl OperationTracker {
    pub(crate) fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            state: OperationState::Idle,
        }
    }

    pub(crate) fn state(&self) -> OperationState {
        self.state
    }

    pub(crate) fn advance(&mut self, next: OperationState) {
        debug_assert!(
            self.state.can_advance(self.kind, next),
            "{} cannot move from {} to {}",
            self.kind,
            self.state,
            next
        );
        debug!(kind = %self.kind, from = %self.state, to = %next, "operation state");
        self.state = next;
    }

    /// Record the failure and hand the error back to the caller.
    pub(crate) fn fail(&mut self, err: EercError) -> EercError {
        if self.state.can_advance(self.kind, OperationState::Failed) {
            warn!(kind = %self.kind, at = %self.state, code = err.error_code(), error = %err, "operation failed");
            self.state = OperationState::Failed;
        }
        err
    }

    /// Turn the node's answer to a submission into a record.
    pub(crate) fn finish(
        &mut self,
        submission: Submission,
        amount: u64,
        counterpart: Address,
    ) -> Result<TransactionRecord> {
        let record = TransactionRecord {
            kind: self.kind,
            amount,
            counterpart,
            tx_hash: submission.tx_hash,
            status: submission.status,
        };
        match submission.status {
            TxStatus::Confirmed => {
                self.advance(OperationState::Confirmed);
                info!(kind = %self.kind, tx_hash = %record.tx_hash, "confirmed");
                Ok(record)
            }
            TxStatus::Pending => {
                info!(kind = %self.kind, tx_hash = %record.tx_hash, "submitted, confirmation pending");
                Ok(record)
            }
            TxStatus::Failed => Err(EercError::ProofRejected {
                reason: format!("transaction {} reverted", submission.tx_hash),
            }),
        }
    }

    /// The backend already relayed the transaction; all we know is its hash.
    pub(crate) fn relayed(
        &self,
        tx_hash: B256,
        amount: u64,
        counterpart: Address,
    ) -> TransactionRecord {
        info!(kind = %self.kind, %tx_hash, "relayed by proof backend, confirmation pending");
        TransactionRecord {
            kind: self.kind,
            amount,
            counterpart,
            tx_hash,
            status: TxStatus::Pending,
        }
    }
}

/// What the proof backend handed back.
pub(crate) enum ProverOutcome {
    /// A proof for this client to submit.
    Proof {
        bundle: ProofBundle,
        balance_pct: Vec<U256>,
    },
    /// The backend submitted the transaction itself.
    Relayed(B256),
}

pub(crate) fn interpret(response: ProverResponse) -> Result<ProverOutcome> {
    if !response.success {
        let message = response
            .message
            .unwrap_or_else(|| "backend reported failure".to_string());
        return Err(EercError::Prover(message));
    }
    match (response.proof, response.tx_hash) {
        (Some(bundle), _) => Ok(ProverOutcome::Proof {
            bundle,
            balance_pct: response.balance_pct,
        }),
        (None, Some(tx_hash)) => Ok(ProverOutcome::Relayed(tx_hash)),
        (None, None) => Err(EercError::Prover(
            "response carries neither a proof nor a transaction hash".to_string(),
        )),
    }
}
