//! BabyJubJub key material for confidential accounts.

use std::fmt;

use alloy_primitives::{Address, U256};
use ark_ec::{CurveGroup, Group};
use ark_ed_on_bn254::{EdwardsProjective, Fr};
use ark_ff::{BigInt, PrimeField, Zero};
use ark_std::UniformRand;
use rand::{CryptoRng, RngCore};

use crate::curve::PublicKey;
use crate::error::CryptoError;
use crate::keccak256;

/// Message an account signs with its EVM wallet to derive its BabyJubJub key.
/// Signing is deterministic, so the same wallet always recovers the same key.
pub fn registration_message(address: &Address) -> String {
    format!(
        "eERC\nRegistering user with\n Address:{}",
        address.to_string().to_lowercase()
    )
}

/// A scalar in the BabyJubJub prime-order subgroup.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Fr);

impl SecretKey {
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        loop {
            let scalar = Fr::rand(rng);
            if !scalar.is_zero() {
                return Self(scalar);
            }
        }
    }

    /// secret = keccak256(seed) mod subgroup order
    pub fn from_seed(seed: &[u8]) -> Result<Self, CryptoError> {
        let scalar = Fr::from_be_bytes_mod_order(&keccak256(seed));
        if scalar.is_zero() {
            return Err(CryptoError::InvalidSecretKey);
        }
        Ok(Self(scalar))
    }

    /// Derive from a 65-byte wallet signature over [`registration_message`].
    pub fn from_signature(signature: &[u8]) -> Result<Self, CryptoError> {
        Self::from_seed(signature)
    }

    pub fn from_u256(value: U256) -> Result<Self, CryptoError> {
        let scalar = Fr::from_bigint(BigInt(value.into_limbs())).ok_or(CryptoError::InvalidSecretKey)?;
        if scalar.is_zero() {
            return Err(CryptoError::InvalidSecretKey);
        }
        Ok(Self(scalar))
    }

    pub fn to_u256(&self) -> U256 {
        U256::from_limbs(self.0.into_bigint().0)
    }

    pub fn scalar(&self) -> &Fr {
        &self.0
    }

    pub fn public_key(&self) -> PublicKey {
        // Non-zero scalars below the subgroup order never map to the identity.
        PublicKey::from_point_unchecked((EdwardsProjective::generator() * self.0).into_affine())
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPair {
    pub secret: SecretKey,
    pub public: PublicKey,
}

impl KeyPair {
    pub fn new(secret: SecretKey) -> Self {
        let public = secret.public_key();
        Self { secret, public }
    }

    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self::new(SecretKey::random(rng))
    }
}

/// An EVM address together with the confidential key pair registered for it.
#[derive(Clone, Debug)]
pub struct Account {
    pub address: Address,
    pub keys: KeyPair,
}

impl Account {
    pub fn new(address: Address, keys: KeyPair) -> Self {
        Self { address, keys }
    }
}
