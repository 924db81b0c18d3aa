// Copyright (c) 2018-2025 The Botho Foundation

use crate::{serde_b64, KeyError};
use core::fmt;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

/// A 64 byte Schnorrkel signature over the Ristretto group.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct RistrettoSignature([u8; 64]);

impl RistrettoSignature {
    /// Length of the encoded signature.
    pub const LEN: usize = 64;

    /// The raw signature bytes.
    pub fn to_bytes(&self) -> [u8; 64] {
        self.0
    }
}

impl Default for RistrettoSignature {
    fn default() -> Self {
        Self([0u8; 64])
    }
}

impl fmt::Debug for RistrettoSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RistrettoSignature({})", hex::encode(self.0))
    }
}

impl From<[u8; 64]> for RistrettoSignature {
    fn from(src: [u8; 64]) -> Self {
        Self(src)
    }
}

impl TryFrom<&[u8]> for RistrettoSignature {
    type Error = KeyError;

    fn try_from(src: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; 64] = src
            .try_into()
            .map_err(|_| KeyError::LengthMismatch(src.len(), Self::LEN))?;
        Ok(Self(bytes))
    }
}

impl AsRef<[u8]> for RistrettoSignature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for RistrettoSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde_b64::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for RistrettoSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = serde_b64::deserialize(deserializer)?;
        Self::try_from(&bytes[..]).map_err(D::Error::custom)
    }
}
