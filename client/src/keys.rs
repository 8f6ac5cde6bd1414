//! Deriving the confidential key pair from an EVM wallet.

use alloy::signers::Signer;
use eerc_lib::{registration_message, Account, KeyPair, SecretKey};

use crate::error::{EercError, Result};

/// Sign the registration message and derive the account's BabyJubJub keys
/// from the signature. The same wallet always yields the same keys.
pub async fn derive_account<S: Signer + Sync>(signer: &S) -> Result<Account> {
    let address = signer.address();
    let signature = signer
        .sign_message(registration_message(&address).as_bytes())
        .await
        .map_err(|e| EercError::Signer(format!("cannot sign registration message: {e}")))?;
    let secret = SecretKey::from_signature(&signature.as_bytes())?;
    Ok(Account::new(address, KeyPair::new(secret)))
}
