//! Registrar and token contract access over JSON-RPC.

use std::time::Duration;

use alloy::{
    network::ReceiptResponse,
    primitives::{Address, B256, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::RpcError,
};
use async_trait::async_trait;
use eerc_lib::{AmountPct, EncryptedBalance, ProofBundle, TxStatus, WireCiphertext, WirePoint};
use tracing::{debug, info, warn};

use crate::chain::{Registrar, Submission, TokenContract, BALANCE_PCT_WORDS};
use crate::config::ClientConfig;
use crate::error::{EercError, Result};

// ---------------------------------------------------------------------------
// Contract bindings (inline, no ABI files needed)
// ---------------------------------------------------------------------------

mod bindings {
    use alloy::sol;

    sol! {
        struct Point { uint256 x; uint256 y; }
        struct EGCT { Point c1; Point c2; }
        struct AmountPCT { uint256[7] pct; uint256 index; }
        struct ProofPoints { uint256[2] a; uint256[2][2] b; uint256[2] c; }
        struct MintProof { ProofPoints proofPoints; uint256[] publicSignals; }
        struct TransferProof { ProofPoints proofPoints; uint256[] publicSignals; }

        #[sol(rpc)]
        interface IRegistrar {
            function isUserRegistered(address user) external view returns (bool);
            function getUserPublicKey(address user) external view returns (uint256[2] memory publicKey);
        }

        #[sol(rpc)]
        interface IEncryptedERC {
            function auditorPublicKey() external view returns (uint256 x, uint256 y);
            function balanceOf(address user, uint256 tokenId) external view returns (EGCT memory eGCT, uint256 nonce, AmountPCT[] memory amountPCTs, uint256[7] memory balancePCT, uint256 transactionIndex);
            function privateMint(address user, MintProof calldata proof) external;
            function transfer(address to, uint256 tokenId, TransferProof calldata proof, uint256[7] calldata balancePCT) external;
        }
    }
}

use bindings::{IEncryptedERC, IRegistrar};

/// How long a submission waits for its receipt before reporting `Pending`.
const RECEIPT_TIMEOUT: Duration = Duration::from_secs(60);

/// Both contracts behind one type-erased provider.
#[derive(Clone)]
pub struct EvmLedger {
    provider: DynProvider,
    registrar: Address,
    token: Address,
    receipt_timeout: Duration,
    submitter: Option<Address>,
}

impl EvmLedger {
    /// Connect with a wallet that signs submissions.
    pub async fn connect(config: &ClientConfig, signer: PrivateKeySigner) -> Result<Self> {
        let submitter = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(signer)
            .connect_http(config.rpc_url()?)
            .erased();
        Self::with_provider(provider, config, Some(submitter)).await
    }

    /// Connect for reads only; submissions will be refused by the node.
    pub async fn connect_read_only(config: &ClientConfig) -> Result<Self> {
        let provider = ProviderBuilder::new().connect_http(config.rpc_url()?).erased();
        Self::with_provider(provider, config, None).await
    }

    async fn with_provider(
        provider: DynProvider,
        config: &ClientConfig,
        submitter: Option<Address>,
    ) -> Result<Self> {
        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| EercError::Connectivity(e.to_string()))?;
        if chain_id != config.network.chain_id {
            return Err(EercError::Contract(format!(
                "RPC reports chain id {chain_id}, configured {}",
                config.network.chain_id
            )));
        }
        debug!(chain_id, registrar = %config.contracts.registrar, token = %config.contracts.token, "connected");
        Ok(Self {
            provider,
            registrar: config.contracts.registrar,
            token: config.contracts.token,
            receipt_timeout: RECEIPT_TIMEOUT,
            submitter,
        })
    }

    pub fn with_receipt_timeout(mut self, timeout: Duration) -> Self {
        self.receipt_timeout = timeout;
        self
    }

    async fn await_receipt(
        &self,
        pending: alloy::providers::PendingTransactionBuilder<alloy::network::Ethereum>,
    ) -> Submission {
        let tx_hash = *pending.tx_hash();
        info!(%tx_hash, "transaction sent");
        match pending.with_timeout(Some(self.receipt_timeout)).get_receipt().await {
            Ok(receipt) if receipt.status() => Submission {
                tx_hash,
                status: TxStatus::Confirmed,
            },
            Ok(_) => Submission {
                tx_hash,
                status: TxStatus::Failed,
            },
            Err(e) => {
                warn!(%tx_hash, error = %e, "receipt not observed, reporting pending");
                Submission {
                    tx_hash,
                    status: TxStatus::Pending,
                }
            }
        }
    }
}

/// Reads: node error responses are contract failures, everything else is
/// the network.
fn read_error(err: alloy::contract::Error) -> EercError {
    match err {
        alloy::contract::Error::TransportError(RpcError::ErrorResp(payload)) => {
            EercError::Contract(payload.message.to_string())
        }
        alloy::contract::Error::TransportError(e) => EercError::Connectivity(e.to_string()),
        other => EercError::Contract(other.to_string()),
    }
}

/// Submissions: a revert during gas estimation means the contract refused
/// the proof.
fn submit_error(err: alloy::contract::Error) -> EercError {
    match err {
        alloy::contract::Error::TransportError(RpcError::ErrorResp(payload)) => {
            let reason = payload.message.to_string();
            if reason.to_lowercase().contains("insufficient") {
                EercError::InsufficientBalanceOnChain { reason }
            } else {
                EercError::ProofRejected { reason }
            }
        }
        alloy::contract::Error::TransportError(e) => EercError::Connectivity(e.to_string()),
        other => EercError::Contract(other.to_string()),
    }
}

fn to_wire_point(point: &bindings::Point) -> WirePoint {
    WirePoint::new(point.x, point.y)
}

fn to_proof_points(points: &eerc_lib::ProofPoints) -> bindings::ProofPoints {
    bindings::ProofPoints {
        a: points.a,
        b: points.b,
        c: points.c,
    }
}

#[async_trait]
impl Registrar for EvmLedger {
    async fn is_registered(&self, address: Address) -> Result<bool> {
        IRegistrar::new(self.registrar, &self.provider)
            .isUserRegistered(address)
            .call()
            .await
            .map_err(read_error)
    }

    async fn public_key(&self, address: Address) -> Result<WirePoint> {
        let words = IRegistrar::new(self.registrar, &self.provider)
            .getUserPublicKey(address)
            .call()
            .await
            .map_err(read_error)?;
        Ok(WirePoint::from(words))
    }
}

#[async_trait]
impl TokenContract for EvmLedger {
    fn submitter(&self) -> Option<Address> {
        self.submitter
    }

    async fn auditor_key(&self) -> Result<WirePoint> {
        let key = IEncryptedERC::new(self.token, &self.provider)
            .auditorPublicKey()
            .call()
            .await
            .map_err(read_error)?;
        Ok(WirePoint::new(key.x, key.y))
    }

    async fn balance_of(&self, address: Address, token_id: U256) -> Result<EncryptedBalance> {
        let balance = IEncryptedERC::new(self.token, &self.provider)
            .balanceOf(address, token_id)
            .call()
            .await
            .map_err(read_error)?;
        Ok(EncryptedBalance {
            ciphertext: WireCiphertext {
                c1: to_wire_point(&balance.eGCT.c1),
                c2: to_wire_point(&balance.eGCT.c2),
            },
            nonce: balance.nonce,
            transaction_index: balance.transactionIndex,
            amount_history: balance
                .amountPCTs
                .iter()
                .map(|amount| AmountPct {
                    pct: amount.pct.to_vec(),
                    index: amount.index,
                })
                .collect(),
            balance_pct: balance.balancePCT.to_vec(),
        })
    }

    async fn private_mint(&self, recipient: Address, proof: ProofBundle) -> Result<Submission> {
        let proof = bindings::MintProof {
            proofPoints: to_proof_points(&proof.points),
            publicSignals: proof.public_signals,
        };
        let pending = IEncryptedERC::new(self.token, &self.provider)
            .privateMint(recipient, proof)
            .send()
            .await
            .map_err(submit_error)?;
        Ok(self.await_receipt(pending).await)
    }

    async fn transfer(
        &self,
        to: Address,
        token_id: U256,
        proof: ProofBundle,
        balance_pct: [U256; BALANCE_PCT_WORDS],
    ) -> Result<Submission> {
        let proof = bindings::TransferProof {
            proofPoints: to_proof_points(&proof.points),
            publicSignals: proof.public_signals,
        };
        let pending = IEncryptedERC::new(self.token, &self.provider)
            .transfer(to, token_id, proof, balance_pct)
            .send()
            .await
            .map_err(submit_error)?;
        Ok(self.await_receipt(pending).await)
    }

    async fn transaction_status(&self, tx_hash: B256) -> Result<TxStatus> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| EercError::Connectivity(e.to_string()))?;
        Ok(match receipt {
            None => TxStatus::Pending,
            Some(receipt) if receipt.status() => TxStatus::Confirmed,
            Some(_) => TxStatus::Failed,
        })
    }
}
