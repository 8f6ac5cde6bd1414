//! Auditor policy.

use eerc_lib::PublicKey;

use crate::client::EercClient;
use crate::error::{EercError, Result};

impl EercClient {
    /// `None` until an administrator configures the auditor.
    pub async fn auditor_key(&self) -> Result<Option<PublicKey>> {
        let wire = self.token.auditor_key().await?;
        if wire.is_unset() {
            return Ok(None);
        }
        PublicKey::try_from(wire)
            .map(Some)
            .map_err(|e| EercError::Contract(format!("token holds an invalid auditor key: {e}")))
    }

    pub async fn require_auditor(&self) -> Result<PublicKey> {
        self.auditor_key().await?.ok_or(EercError::AuditorUnset)
    }
}
