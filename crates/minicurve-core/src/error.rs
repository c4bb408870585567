use num_bigint::BigUint;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid curve parameters: {0}")]
    InvalidCurveParameters(String),

    #[error("modulus must be a positive odd integer")]
    InvalidModulus,

    #[error("value is not a quadratic residue")]
    NotAResidue,

    #[error("operand has no inverse modulo the given modulus")]
    NoInverse,

    #[error("coordinate out of range: must be below the field prime")]
    CoordinateOutOfRange,

    #[error("generator must be a valid, non-identity point on the curve")]
    InvalidGenerator,

    #[error("order not found after scanning {scanned} multiples")]
    OrderNotFound { scanned: u64 },

    #[error("no quadratic non-residue found after {draws} draws")]
    NonResidueSearchExhausted { draws: u32 },

    #[error("private key out of range: must satisfy 0 < d < n")]
    InvalidPrivateKey,

    #[error("ephemeral scalar out of range: must satisfy 0 < k < n")]
    InvalidEphemeral,

    #[error("ephemeral scalar yields r = 0 or s = 0; draw a fresh one")]
    DegenerateSignature,

    #[error("public key is not a valid subgroup point")]
    InvalidPublicKey,

    #[error("peer key is not a valid subgroup point")]
    InvalidPeerKey,

    #[error("no point of order at least {min_order} on this curve")]
    GeneratorNotFound { min_order: BigUint },
}
