// Copyright (c) 2018-2025 The Botho Foundation

use super::{Error, PedersenGens, Scalar};
use core::fmt;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use prv_crypto_keys::serde_b64;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

/// A Pedersen commitment `v*B + r*B_blinding`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Commitment {
    /// The commitment point.
    pub point: RistrettoPoint,
}

impl Commitment {
    /// Commit to `value` with `blinding` under `generator`.
    pub fn new(value: u64, blinding: Scalar, generator: &PedersenGens) -> Self {
        Self {
            point: generator.commit(Scalar::from(value), blinding),
        }
    }

    /// Compress the commitment.
    pub fn compress(&self) -> CompressedCommitment {
        CompressedCommitment {
            point: self.point.compress(),
        }
    }
}

impl From<RistrettoPoint> for Commitment {
    fn from(point: RistrettoPoint) -> Self {
        Self { point }
    }
}

impl TryFrom<&CompressedCommitment> for Commitment {
    type Error = Error;

    fn try_from(src: &CompressedCommitment) -> Result<Self, Error> {
        let point = src.point.decompress().ok_or(Error::InvalidCurvePoint)?;
        Ok(Self { point })
    }
}

/// A compressed Pedersen commitment, as stored on chain.
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq)]
pub struct CompressedCommitment {
    /// The compressed commitment point.
    pub point: CompressedRistretto,
}

impl CompressedCommitment {
    /// Commit to `value` with `blinding` under `generator`.
    pub fn new(value: u64, blinding: Scalar, generator: &PedersenGens) -> Self {
        Commitment::new(value, blinding, generator).compress()
    }

    /// The raw compressed bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.point.as_bytes()
    }
}

impl From<&Commitment> for CompressedCommitment {
    fn from(src: &Commitment) -> Self {
        src.compress()
    }
}

impl TryFrom<&[u8]> for CompressedCommitment {
    type Error = Error;

    fn try_from(src: &[u8]) -> Result<Self, Error> {
        let point =
            CompressedRistretto::from_slice(src).map_err(|_| Error::LengthMismatch(src.len(), 32))?;
        Ok(Self { point })
    }
}

impl fmt::Debug for CompressedCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompressedCommitment({})", hex::encode(self.as_bytes()))
    }
}

impl Serialize for CompressedCommitment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde_b64::serialize(self.as_bytes(), serializer)
    }
}

impl<'de> Deserialize<'de> for CompressedCommitment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = serde_b64::deserialize(deserializer)?;
        Self::try_from(&bytes[..]).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{generators, B_BLINDING, G_VALUE};

    #[test]
    fn test_commitment_is_homomorphic() {
        let gens = generators();
        let a = Commitment::new(5, Scalar::from(11u64), &gens);
        let b = Commitment::new(7, Scalar::from(13u64), &gens);
        let sum = Commitment::new(12, Scalar::from(24u64), &gens);
        assert_eq!(a.point + b.point, sum.point);
    }

    #[test]
    fn test_zero_value_is_blinding_multiple() {
        let r = Scalar::from(99u64);
        let c = Commitment::new(0, r, &generators());
        assert_eq!(c.point, r * *B_BLINDING);
        assert_eq!(Commitment::new(3, Scalar::ZERO, &generators()).point, Scalar::from(3u64) * *G_VALUE);
    }

    #[test]
    fn test_compressed_roundtrip() {
        let c = Commitment::new(1, Scalar::from(2u64), &generators());
        let compressed = c.compress();
        assert_eq!(Commitment::try_from(&compressed).unwrap(), c);
        assert!(CompressedCommitment::try_from(&[0u8; 10][..]).is_err());
    }
}
