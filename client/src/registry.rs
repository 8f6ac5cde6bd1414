//! Registrar lookups.

use alloy::primitives::Address;
use eerc_lib::PublicKey;
use tracing::debug;

use crate::client::EercClient;
use crate::error::{EercError, Result};

impl EercClient {
    pub async fn is_registered(&self, address: Address) -> Result<bool> {
        self.registrar.is_registered(address).await
    }

    /// The registered public key of `address`.
    pub async fn public_key(&self, address: Address) -> Result<PublicKey> {
        let wire = self.registrar.public_key(address).await?;
        if wire.is_unset() {
            return Err(EercError::NotRegistered { address });
        }
        PublicKey::try_from(wire).map_err(|e| {
            EercError::Contract(format!("registrar holds an invalid key for {address}: {e}"))
        })
    }

    /// Registration gate for mint and transfer.
    pub async fn require_registered(&self, address: Address) -> Result<PublicKey> {
        if !self.is_registered(address).await? {
            debug!(%address, "registration gate closed");
            return Err(EercError::NotRegistered { address });
        }
        self.public_key(address).await
    }
}
