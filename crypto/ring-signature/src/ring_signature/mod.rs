// Copyright (c) 2018-2025 The Botho Foundation

//! Generators, hash functions and the MLSAG construction.

pub use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_POINT,
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
    traits::Identity,
};

mod commitment;
mod error;
mod key_image;
mod mlsag;

pub use self::{
    commitment::{CompressedCommitment, Commitment},
    error::Error,
    key_image::KeyImage,
    mlsag::{Mlsag, MlsagKind, Ring, SignableRing, MAX_DIMENSION, MESSAGE_LEN, RING_PREFIX},
};

use crate::domain_separators::{
    ASSET_TAG_DOMAIN_TAG, BLINDING_GENERATOR_DOMAIN_TAG, HASH_TO_POINT_DOMAIN_TAG,
    HASH_TO_SCALAR_DOMAIN_TAG, VALUE_GENERATOR_DOMAIN_TAG,
};
use blake2::{Blake2b512, Digest};
use lazy_static::lazy_static;
use prv_crypto_keys::RistrettoPublic;

/// The spend key generator `G`.
pub const G: RistrettoPoint = RISTRETTO_BASEPOINT_POINT;

lazy_static! {
    /// The Pedersen value generator.
    pub static ref G_VALUE: RistrettoPoint = hash_bytes_to_point(VALUE_GENERATOR_DOMAIN_TAG, &[]);

    /// The Pedersen blinding generator. Commitments to zero are multiples of
    /// this point.
    pub static ref B_BLINDING: RistrettoPoint = hash_bytes_to_point(BLINDING_GENERATOR_DOMAIN_TAG, &[]);
}

/// A pair of generators `(B, B_blinding)` committing to `v*B + r*B_blinding`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PedersenGens {
    /// Base for the committed value.
    pub B: RistrettoPoint,
    /// Base for the blinding factor.
    pub B_blinding: RistrettoPoint,
}

impl PedersenGens {
    /// Commit to `value` with `blinding`.
    pub fn commit(&self, value: Scalar, blinding: Scalar) -> RistrettoPoint {
        value * self.B + blinding * self.B_blinding
    }
}

/// Generators for plain (single asset) commitments.
pub fn generators() -> PedersenGens {
    PedersenGens {
        B: *G_VALUE,
        B_blinding: *B_BLINDING,
    }
}

/// Generators for confidential-asset commitments, using the coin's asset tag
/// as the value base.
pub fn asset_generators(asset_tag: &RistrettoPoint) -> PedersenGens {
    PedersenGens {
        B: *asset_tag,
        B_blinding: *B_BLINDING,
    }
}

/// The unblinded asset generator for a token: `Hp(ASSET_TAG ‖ token_id)`.
pub fn asset_generator(token_id: &[u8; 32]) -> RistrettoPoint {
    hash_bytes_to_point(ASSET_TAG_DOMAIN_TAG, token_id)
}

/// Hashes a public key to a curve point, `Hp(P)`.
pub fn hash_to_point(public_key: &RistrettoPublic) -> RistrettoPoint {
    hash_bytes_to_point(HASH_TO_POINT_DOMAIN_TAG, &public_key.to_bytes())
}

/// Hashes `domain ‖ data` to a curve point.
pub fn hash_bytes_to_point(domain: &[u8], data: &[u8]) -> RistrettoPoint {
    let mut hasher = Blake2b512::new();
    hasher.update(domain);
    hasher.update(data);
    RistrettoPoint::from_hash(hasher)
}

/// Hashes `domain ‖ parts...` to a scalar, `Hs`.
pub fn hash_to_scalar(domain: &[u8], parts: &[&[u8]]) -> Scalar {
    let mut hasher = Blake2b512::new();
    hasher.update(HASH_TO_SCALAR_DOMAIN_TAG);
    hasher.update(domain);
    for part in parts {
        hasher.update(part);
    }
    Scalar::from_hash(hasher)
}

/// Decodes a canonical scalar.
pub fn scalar_from_bytes(bytes: &[u8]) -> Result<Scalar, Error> {
    let bytes: [u8; 32] = bytes
        .try_into()
        .map_err(|_| Error::LengthMismatch(bytes.len(), 32))?;
    Option::<Scalar>::from(Scalar::from_canonical_bytes(bytes)).ok_or(Error::InvalidScalar)
}

/// Decodes a compressed point.
pub fn point_from_bytes(bytes: &[u8]) -> Result<RistrettoPoint, Error> {
    CompressedRistretto::from_slice(bytes)
        .map_err(|_| Error::LengthMismatch(bytes.len(), 32))?
        .decompress()
        .ok_or(Error::InvalidCurvePoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generators_are_distinct() {
        assert_ne!(*G_VALUE, *B_BLINDING);
        assert_ne!(*G_VALUE, G);
        assert_ne!(*B_BLINDING, G);
        assert_ne!(asset_generator(&[0u8; 32]), asset_generator(&[1u8; 32]));
    }

    #[test]
    fn test_hash_to_scalar_separates_domains() {
        let a = hash_to_scalar(b"a", &[b"x"]);
        let b = hash_to_scalar(b"b", &[b"x"]);
        assert_ne!(a, b);
        assert_eq!(a, hash_to_scalar(b"a", &[b"x"]));
    }

    #[test]
    fn test_scalar_decoding_rejects_non_canonical() {
        assert_eq!(scalar_from_bytes(&[0xff; 32]), Err(Error::InvalidScalar));
        assert_eq!(scalar_from_bytes(&[0u8; 31]), Err(Error::LengthMismatch(31, 32)));
        assert_eq!(scalar_from_bytes(&[0u8; 32]), Ok(Scalar::ZERO));
    }

    #[test]
    fn test_point_decoding_rejects_invalid() {
        assert_eq!(point_from_bytes(&[0xff; 32]), Err(Error::InvalidCurvePoint));
        let p = G.compress();
        assert_eq!(point_from_bytes(p.as_bytes()), Ok(G));
    }
}
