//! Exponential ElGamal over BabyJubJub.
//!
//! An amount `m` encrypted to public key `PK = sk·G` with randomness `r` is
//! the pair `(c1, c2) = (r·G, m·G + r·PK)`. Decryption recovers `m·G = c2 - sk·c1`
//! and then solves the discrete log, which is only feasible for bounded `m`.
//! Ciphertexts under the same key add and subtract component-wise, which is
//! how the token contract updates balances without learning them.

use std::collections::HashMap;

use ark_ec::{AffineRepr, CurveGroup, Group};
use ark_ed_on_bn254::{EdwardsAffine, EdwardsProjective, Fr};
use ark_ff::PrimeField;
use ark_std::UniformRand;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::curve::{PublicKey, WirePoint};
use crate::error::CryptoError;
use crate::keys::SecretKey;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ciphertext {
    pub c1: EdwardsAffine,
    pub c2: EdwardsAffine,
}

impl Ciphertext {
    /// The encryption of zero with zero randomness.
    pub fn zero() -> Self {
        Self {
            c1: EdwardsAffine::zero(),
            c2: EdwardsAffine::zero(),
        }
    }

    pub fn encrypt<R: RngCore + CryptoRng>(amount: u64, key: &PublicKey, rng: &mut R) -> Self {
        let r = Fr::rand(rng);
        let g = EdwardsProjective::generator();
        let c1 = g * r;
        let c2 = g * Fr::from(amount) + key.as_point().into_group() * r;
        Self::from_projective(c1, c2)
    }

    fn from_projective(c1: EdwardsProjective, c2: EdwardsProjective) -> Self {
        let affine = EdwardsProjective::normalize_batch(&[c1, c2]);
        Self {
            c1: affine[0],
            c2: affine[1],
        }
    }

    pub fn add(&self, other: &Ciphertext) -> Self {
        Self::from_projective(
            self.c1.into_group() + other.c1.into_group(),
            self.c2.into_group() + other.c2.into_group(),
        )
    }

    pub fn sub(&self, other: &Ciphertext) -> Self {
        Self::from_projective(
            self.c1.into_group() - other.c1.into_group(),
            self.c2.into_group() - other.c2.into_group(),
        )
    }

    /// m·G = c2 - sk·c1
    pub fn decrypt_point(&self, secret: &SecretKey) -> EdwardsProjective {
        self.c2.into_group() - self.c1.into_group() * secret.scalar()
    }

    pub fn to_wire(&self) -> WireCiphertext {
        WireCiphertext {
            c1: WirePoint::encode(&self.c1),
            c2: WirePoint::encode(&self.c2),
        }
    }

    pub fn to_words(&self) -> [alloy_primitives::U256; 4] {
        self.to_wire().to_words()
    }
}

/// A ciphertext exactly as stored on-chain (the contract's EGCT).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireCiphertext {
    pub c1: WirePoint,
    pub c2: WirePoint,
}

impl WireCiphertext {
    /// Accounts that were never credited hold an all-zero ciphertext.
    pub fn is_unset(&self) -> bool {
        self.c1.is_unset() && self.c2.is_unset()
    }

    pub fn decode(&self) -> Result<Ciphertext, CryptoError> {
        if self.is_unset() {
            return Ok(Ciphertext::zero());
        }
        if self.c1.is_unset() || self.c2.is_unset() {
            return Err(CryptoError::MalformedCiphertext);
        }
        Ok(Ciphertext {
            c1: self.c1.decode()?,
            c2: self.c2.decode()?,
        })
    }

    pub fn to_words(self) -> [alloy_primitives::U256; 4] {
        [self.c1.x, self.c1.y, self.c2.x, self.c2.y]
    }

    pub fn from_words(words: [alloy_primitives::U256; 4]) -> Self {
        Self {
            c1: WirePoint::new(words[0], words[1]),
            c2: WirePoint::new(words[2], words[3]),
        }
    }
}

/// Largest bound [`DlogTable::new`] accepts: about a million baby steps,
/// which is a table of a few hundred MiB.
pub const MAX_DLOG_BOUND: u64 = 1 << 40;

type PointKey = ([u64; 4], [u64; 4]);

fn point_key(point: &EdwardsAffine) -> PointKey {
    (point.x.into_bigint().0, point.y.into_bigint().0)
}

/// Baby-step giant-step table for discrete logs in `0..=bound`.
///
/// Holds `ceil(sqrt(bound + 1))` precomputed points; a lookup costs at most the
/// same number of point additions. Building it is CPU-bound, so async callers
/// should do it on a blocking thread.
pub struct DlogTable {
    bound: u64,
    step: u64,
    baby_steps: HashMap<PointKey, u64>,
    giant_step: EdwardsProjective,
}

impl DlogTable {
    /// Bounds above [`MAX_DLOG_BOUND`] are clamped to it.
    pub fn new(bound: u64) -> Self {
        let bound = bound.min(MAX_DLOG_BOUND);
        let mut step: u64 = 1;
        while (step as u128) * (step as u128) <= bound as u128 {
            step += 1;
        }

        let g = EdwardsProjective::generator();
        let mut points = Vec::with_capacity(step as usize);
        let mut acc = <EdwardsProjective as ark_ff::Zero>::zero();
        for _ in 0..step {
            points.push(acc);
            acc += g;
        }
        let baby_steps = EdwardsProjective::normalize_batch(&points)
            .iter()
            .enumerate()
            .map(|(j, p)| (point_key(p), j as u64))
            .collect();

        Self {
            bound,
            step,
            baby_steps,
            giant_step: -(g * Fr::from(step)),
        }
    }

    pub fn bound(&self) -> u64 {
        self.bound
    }

    /// Find `m` in `0..=bound` with `m·G == target`.
    pub fn solve(&self, target: EdwardsProjective) -> Option<u64> {
        let mut current = target;
        for i in 0..=self.step {
            if let Some(j) = self.baby_steps.get(&point_key(&current.into_affine())) {
                let m = i.checked_mul(self.step)?.checked_add(*j)?;
                return (m <= self.bound).then_some(m);
            }
            current += self.giant_step;
        }
        None
    }
}

/// Decrypt a ciphertext to its amount in base units.
pub fn decrypt_amount(
    ciphertext: &Ciphertext,
    secret: &SecretKey,
    table: &DlogTable,
) -> Result<u64, CryptoError> {
    table
        .solve(ciphertext.decrypt_point(secret))
        .ok_or(CryptoError::OutOfRange {
            bound: table.bound(),
        })
}
