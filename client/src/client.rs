//! The client handle and the waiting helpers every operation shares.

use std::future::Future;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use alloy::primitives::B256;
use alloy::signers::local::PrivateKeySigner;
use eerc_lib::{DlogTable, TransactionRecord, TxStatus};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::chain::{Registrar, TokenContract};
use crate::config::{ClientConfig, ConfigError};
use crate::error::{EercError, Result};
use crate::evm::EvmLedger;
use crate::prover::{HttpProofBackend, ProofBackend};

/// Entry point for every confidential-token operation.
///
/// Holds no balances or proofs between calls; the registrar and token
/// contract are the systems of record.
pub struct EercClient {
    pub(crate) config: Arc<ClientConfig>,
    pub(crate) registrar: Arc<dyn Registrar>,
    pub(crate) token: Arc<dyn TokenContract>,
    pub(crate) prover: Arc<dyn ProofBackend>,
    dlog: OnceLock<Arc<DlogTable>>,
}

impl EercClient {
    pub fn new(
        config: Arc<ClientConfig>,
        registrar: Arc<dyn Registrar>,
        token: Arc<dyn TokenContract>,
        prover: Arc<dyn ProofBackend>,
    ) -> Self {
        Self {
            config,
            registrar,
            token,
            prover,
            dlog: OnceLock::new(),
        }
    }

    /// Connect to the configured node with a signing wallet and the HTTP
    /// proof backend.
    pub async fn connect(config: ClientConfig, signer: PrivateKeySigner) -> Result<Self> {
        config.validate()?;
        let ledger = Arc::new(EvmLedger::connect(&config, signer).await?);
        let prover = Arc::new(HttpProofBackend::from_config(&config)?);
        Ok(Self::new(Arc::new(config), ledger.clone(), ledger, prover))
    }

    /// Connect without a wallet. Reads work; submissions are refused.
    pub async fn connect_read_only(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let ledger = Arc::new(EvmLedger::connect_read_only(&config).await?);
        let prover = Arc::new(HttpProofBackend::from_config(&config)?);
        Ok(Self::new(Arc::new(config), ledger.clone(), ledger, prover))
    }

    /// Share an already-built discrete-log table instead of building one.
    /// Its bound must equal `decryption.max_balance`.
    pub fn with_dlog_table(self, table: Arc<DlogTable>) -> Result<Self> {
        let expected = self.config.decryption.max_balance;
        if table.bound() != expected {
            return Err(ConfigError::Invalid {
                key: "decryption.max_balance",
                reason: format!("shared table searches up to {}, configured {expected}", table.bound()),
            }
            .into());
        }
        if self.dlog.set(table).is_err() {
            return Err(EercError::Decryption("discrete-log table already set".into()));
        }
        Ok(self)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the discrete-log table on a blocking thread if it is not there
    /// yet. Operations that decrypt call this first.
    pub async fn prepare_decryption(&self) -> Result<Arc<DlogTable>> {
        if let Some(table) = self.dlog.get() {
            return Ok(table.clone());
        }
        let bound = self.config.decryption.max_balance;
        debug!(bound, "building discrete-log table");
        let table = tokio::task::spawn_blocking(move || Arc::new(DlogTable::new(bound)))
            .await
            .map_err(|e| EercError::Decryption(format!("building discrete-log table: {e}")))?;
        Ok(self.dlog.get_or_init(|| table).clone())
    }

    /// The table, built inline on first use when not prepared.
    pub(crate) fn dlog_table(&self) -> Arc<DlogTable> {
        self.dlog
            .get_or_init(|| Arc::new(DlogTable::new(self.config.decryption.max_balance)))
            .clone()
    }

    pub async fn transaction_status(&self, tx_hash: B256) -> Result<TxStatus> {
        self.token.transaction_status(tx_hash).await
    }

    /// Poll until a pending record is mined or `max_polls` runs out. Never
    /// resubmits anything.
    pub async fn await_confirmation(
        &self,
        record: TransactionRecord,
        poll_interval: Duration,
        max_polls: u32,
    ) -> Result<TransactionRecord> {
        if record.status != TxStatus::Pending {
            return Ok(record);
        }
        for poll in 0..max_polls {
            match self.token.transaction_status(record.tx_hash).await? {
                TxStatus::Pending => {
                    debug!(tx_hash = %record.tx_hash, poll, "still pending");
                    tokio::time::sleep(poll_interval).await;
                }
                status => {
                    info!(tx_hash = %record.tx_hash, ?status, "transaction resolved");
                    return Ok(record.with_status(status));
                }
            }
        }
        Ok(record)
    }
}

/// Race `fut` against a cancellation signal.
///
/// `true` on the channel cancels. A dropped sender means nobody can cancel
/// any more, so the future simply runs to completion.
pub(crate) async fn cancellable<F, T>(
    fut: F,
    cancel: Option<&mut watch::Receiver<bool>>,
    stage: &str,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let Some(cancel) = cancel else {
        return fut.await;
    };
    let cancelled = || EercError::Cancelled {
        stage: stage.to_string(),
    };
    if *cancel.borrow_and_update() {
        return Err(cancelled());
    }

    tokio::pin!(fut);
    loop {
        tokio::select! {
            out = &mut fut => return out,
            changed = cancel.changed() => match changed {
                Ok(()) if *cancel.borrow_and_update() => return Err(cancelled()),
                Ok(()) => continue,
                Err(_) => return (&mut fut).await,
            },
        }
    }
}
