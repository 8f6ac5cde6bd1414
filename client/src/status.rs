use alloy::primitives::Address;
use serde::Serialize;

use crate::client::EercClient;
use crate::error::Result;

/// Readiness snapshot for one account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SystemStatus {
    pub registered: bool,
    pub auditor_set: bool,
    /// Both gates open: mint and transfer can proceed.
    pub ready: bool,
}

impl EercClient {
    pub async fn system_status(&self, address: Address) -> Result<SystemStatus> {
        let (registered, auditor) =
            tokio::try_join!(self.is_registered(address), self.auditor_key())?;
        let auditor_set = auditor.is_some();
        Ok(SystemStatus {
            registered,
            auditor_set,
            ready: registered && auditor_set,
        })
    }
}
