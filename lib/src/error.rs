//! Error types for the pure core.

use thiserror::Error;

/// Failures while decoding points, keys, ciphertexts or signal layouts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("coordinate is not a canonical field element")]
    NonCanonicalCoordinate,

    #[error("point is not on the BabyJubJub curve")]
    NotOnCurve,

    #[error("point is not in the prime-order subgroup")]
    WrongSubgroup,

    #[error("public key is the identity point")]
    IdentityKey,

    #[error("secret scalar is zero or not reduced")]
    InvalidSecretKey,

    #[error("ciphertext has one unset component")]
    MalformedCiphertext,

    #[error("decrypted amount is outside the searchable range 0..={bound} (wrong key or balance too large)")]
    OutOfRange { bound: u64 },

    #[error("expected {expected} public signals, got {got}")]
    SignalLayout { expected: usize, got: usize },
}

/// Failures while converting between decimal text and base units.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("invalid character {0:?} in amount")]
    InvalidCharacter(char),

    #[error("amount has more than one decimal point")]
    MultipleDecimalPoints,

    #[error("token decimals {0} exceed the supported maximum of 18")]
    UnsupportedDecimals(u8),

    #[error("amount does not fit in 64-bit base units")]
    Overflow,
}
