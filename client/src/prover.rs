//! Out-of-process proof generation.

use std::time::Duration;

use async_trait::async_trait;
use eerc_lib::{MintProofRequest, ProverErrorBody, ProverResponse, TransferProofRequest};
use reqwest::Url;
use serde::Serialize;
use tracing::debug;

use crate::config::{ClientConfig, ConfigError};
use crate::error::{EercError, Result};

#[async_trait]
pub trait ProofBackend: Send + Sync {
    async fn mint_proof(&self, request: &MintProofRequest) -> Result<ProverResponse>;

    async fn transfer_proof(&self, request: &TransferProofRequest) -> Result<ProverResponse>;
}

/// Proof backend reached over HTTP: `POST {base}/mint`, `POST {base}/transfer`.
#[derive(Clone, Debug)]
pub struct HttpProofBackend {
    client: reqwest::Client,
    base: Url,
}

impl HttpProofBackend {
    /// `base` must end in `/`; see [`ClientConfig::prover_url`].
    pub fn new(base: Url, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::Invalid {
                key: "prover",
                reason: e.to_string(),
            })?;
        Ok(Self { client, base })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(
            config.prover_url()?,
            Duration::from_secs(config.prover.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    async fn post<T: Serialize + Sync>(&self, endpoint: &str, body: &T) -> Result<ProverResponse> {
        let url = self
            .base
            .join(endpoint)
            .map_err(|e| EercError::Prover(format!("bad endpoint {endpoint}: {e}")))?;
        debug!(%url, "requesting proof");

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProverErrorBody>(&text)
                .ok()
                .filter(|body| !body.error.is_empty())
                .map(|body| body.error)
                .unwrap_or(text);
            return Err(EercError::Prover(format!("HTTP {status}: {message}")));
        }

        response
            .json::<ProverResponse>()
            .await
            .map_err(|e| EercError::Prover(format!("malformed response: {e}")))
    }
}

fn transport_error(err: reqwest::Error) -> EercError {
    if err.is_connect() || err.is_timeout() {
        EercError::Connectivity(format!("proof backend: {err}"))
    } else {
        EercError::Prover(err.to_string())
    }
}

#[async_trait]
impl ProofBackend for HttpProofBackend {
    async fn mint_proof(&self, request: &MintProofRequest) -> Result<ProverResponse> {
        self.post("mint", request).await
    }

    async fn transfer_proof(&self, request: &TransferProofRequest) -> Result<ProverResponse> {
        self.post("transfer", request).await
    }
}
