// Copyright (c) 2018-2025 The Botho Foundation

//! Token identifiers and a registry of well-known tokens.

use core::{fmt, str::FromStr};
use prv_crypto_ring_signature::{asset_generator, RistrettoPoint};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

/// A 32 byte token identifier, hex encoded on the wire.
#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TokenId([u8; 32]);

impl TokenId {
    /// The network's native coin.
    pub const NATIVE: Self = Self::with_last_byte(4);

    /// The umbrella id every confidential-asset coin is published under,
    /// whatever token it actually carries.
    pub const CONFIDENTIAL_ASSET: Self = Self::with_last_byte(5);

    const fn with_last_byte(byte: u8) -> Self {
        let mut bytes = [0u8; 32];
        bytes[31] = byte;
        Self(bytes)
    }

    /// Wrap raw bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// True for the native coin.
    pub fn is_native(&self) -> bool {
        *self == Self::NATIVE
    }

    /// The unblinded asset generator of this token.
    pub fn asset_generator(&self) -> RistrettoPoint {
        asset_generator(&self.0)
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TokenId({})", hex::encode(self.0))
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl From<[u8; 32]> for TokenId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl FromStr for TokenId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl Serialize for TokenId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for TokenId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}

/// A generic representation of a token.
pub trait Token {
    /// Token Id.
    const ID: TokenId;

    /// Default minimum fee for this token.
    const MINIMUM_FEE: u64;
}

/// Structures exposing constants of well-known tokens.
pub mod tokens {
    use super::*;

    /// The native PRV coin.
    pub struct Prv;
    impl Token for Prv {
        /// Token Id.
        const ID: TokenId = TokenId::NATIVE;

        /// Minimum fee, denominated in nano-PRV.
        const MINIMUM_FEE: u64 = 100;
    }
}
