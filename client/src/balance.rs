//! Balance reads and local decryption.

use alloy::primitives::Address;
use eerc_lib::{decrypt_amount, scale, unscale, Account, EncryptedBalance, SecretKey, WireCiphertext};
use serde::Serialize;

use crate::client::EercClient;
use crate::error::{EercError, Result};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DecryptedBalance {
    /// Base units.
    pub units: u64,
    /// `units` rendered with the token's decimals.
    pub formatted: String,
    pub record: EncryptedBalance,
}

impl EercClient {
    /// Read-only; works whether or not the auditor is set.
    pub async fn encrypted_balance(&self, address: Address) -> Result<EncryptedBalance> {
        self.token
            .balance_of(address, self.config.contracts.token_id)
            .await
    }

    /// Decrypt locally with the owner's secret. Deterministic; touches no network.
    /// Builds the discrete-log table on the calling thread unless
    /// [`EercClient::prepare_decryption`] ran first.
    pub fn decrypt_balance(&self, ciphertext: &WireCiphertext, secret: &SecretKey) -> Result<u64> {
        let ciphertext = ciphertext.decode()?;
        decrypt_amount(&ciphertext, secret, &self.dlog_table()).map_err(|e| {
            EercError::Decryption(format!("{e}; the key may not match this balance"))
        })
    }

    pub async fn balance(&self, account: &Account) -> Result<DecryptedBalance> {
        let record = self.encrypted_balance(account.address).await?;
        self.prepare_decryption().await?;
        let units = self.decrypt_balance(&record.ciphertext, &account.keys.secret)?;
        Ok(DecryptedBalance {
            units,
            formatted: self.format_units(units)?,
            record,
        })
    }

    /// Decimal text to base units, truncating extra digits.
    pub fn parse_amount(&self, text: &str) -> Result<u64> {
        Ok(scale(text, self.config.token.decimals)?)
    }

    pub fn format_units(&self, units: u64) -> Result<String> {
        Ok(unscale(units, self.config.token.decimals)?)
    }
}
