//! BabyJubJub points and their on-chain encoding.
//!
//! Contracts store points as a pair of `uint256` affine coordinates. The
//! pair `(0, 0)` is not a curve point; contracts use it to mean "unset".

use alloy_primitives::U256;
use ark_ec::{AffineRepr, CurveGroup};
use ark_ed_on_bn254::{EdwardsAffine, EdwardsProjective, Fq};
use ark_ff::{BigInt, PrimeField};
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

/// Convert a 256-bit word into a base field element, rejecting values at or
/// above the modulus.
pub fn fq_from_u256(value: U256) -> Result<Fq, CryptoError> {
    Fq::from_bigint(BigInt(value.into_limbs())).ok_or(CryptoError::NonCanonicalCoordinate)
}

pub fn fq_to_u256(value: Fq) -> U256 {
    U256::from_limbs(value.into_bigint().0)
}

/// Raw affine coordinates as they appear in calldata and JSON.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WirePoint {
    pub x: U256,
    pub y: U256,
}

impl WirePoint {
    pub const UNSET: WirePoint = WirePoint {
        x: U256::ZERO,
        y: U256::ZERO,
    };

    pub fn new(x: U256, y: U256) -> Self {
        Self { x, y }
    }

    pub fn is_unset(&self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }

    /// Decode into a curve point in the prime-order subgroup.
    pub fn decode(&self) -> Result<EdwardsAffine, CryptoError> {
        let point = EdwardsAffine::new_unchecked(fq_from_u256(self.x)?, fq_from_u256(self.y)?);
        if !point.is_on_curve() {
            return Err(CryptoError::NotOnCurve);
        }
        if !point.is_in_correct_subgroup_assuming_on_curve() {
            return Err(CryptoError::WrongSubgroup);
        }
        Ok(point)
    }

    pub fn encode(point: &EdwardsAffine) -> Self {
        Self {
            x: fq_to_u256(point.x),
            y: fq_to_u256(point.y),
        }
    }

    pub fn from_projective(point: EdwardsProjective) -> Self {
        Self::encode(&point.into_affine())
    }

    pub fn to_words(self) -> [U256; 2] {
        [self.x, self.y]
    }
}

impl From<[U256; 2]> for WirePoint {
    fn from(words: [U256; 2]) -> Self {
        Self::new(words[0], words[1])
    }
}

/// A validated BabyJubJub public key: on the curve, in the subgroup, and
/// not the identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WirePoint", into = "WirePoint")]
pub struct PublicKey(EdwardsAffine);

impl PublicKey {
    pub fn from_point(point: EdwardsAffine) -> Result<Self, CryptoError> {
        if point.is_zero() {
            return Err(CryptoError::IdentityKey);
        }
        Ok(Self(point))
    }

    pub(crate) fn from_point_unchecked(point: EdwardsAffine) -> Self {
        Self(point)
    }

    pub fn as_point(&self) -> &EdwardsAffine {
        &self.0
    }

    pub fn to_wire(&self) -> WirePoint {
        WirePoint::encode(&self.0)
    }
}

impl TryFrom<WirePoint> for PublicKey {
    type Error = CryptoError;

    fn try_from(wire: WirePoint) -> Result<Self, Self::Error> {
        Self::from_point(wire.decode()?)
    }
}

impl From<PublicKey> for WirePoint {
    fn from(key: PublicKey) -> Self {
        key.to_wire()
    }
}
