// Copyright (c) 2018-2025 The Botho Foundation

//! Ristretto255 private and public keys.

use crate::{serde_b64, FromRandom, KeyError, RistrettoSignature};
use blake2::{Blake2b512, Digest};
use core::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};
use curve25519_dalek::{
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
};
use rand_core::{CryptoRng, RngCore};
use schnorrkel_og::{PublicKey as SchnorrPublic, SecretKey as SchnorrSecret};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

const SCHNORRKEL_NONCE_DOMAIN: &[u8] = b"prv_schnorrkel_nonce";

/// A Ristretto scalar used as a private key.
#[derive(Clone, Default)]
pub struct RistrettoPrivate(pub(crate) Scalar);

impl RistrettoPrivate {
    /// The canonical little-endian encoding of the scalar.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Sign `message` under the signing `context` with a Schnorrkel
    /// signature. The resulting signature verifies against
    /// `RistrettoPublic::from(self)`.
    pub fn sign_schnorrkel(&self, context: &[u8], message: &[u8]) -> RistrettoSignature {
        let mut nonce_hasher = Blake2b512::new();
        nonce_hasher.update(SCHNORRKEL_NONCE_DOMAIN);
        nonce_hasher.update(self.0.as_bytes());
        let nonce = nonce_hasher.finalize();

        let mut secret_bytes = [0u8; 64];
        secret_bytes[..32].copy_from_slice(self.0.as_bytes());
        secret_bytes[32..].copy_from_slice(&nonce[..32]);

        // A canonical scalar followed by 32 arbitrary bytes is always a valid
        // schnorrkel secret key.
        let signature = match SchnorrSecret::from_bytes(&secret_bytes) {
            Ok(secret) => {
                let public = secret.to_public();
                RistrettoSignature::from(secret.sign_simple(context, message, &public).to_bytes())
            }
            Err(_) => RistrettoSignature::default(),
        };
        secret_bytes.zeroize();
        signature
    }
}

impl Drop for RistrettoPrivate {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for RistrettoPrivate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RistrettoPrivate(<redacted>)")
    }
}

impl PartialEq for RistrettoPrivate {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for RistrettoPrivate {}

impl FromRandom for RistrettoPrivate {
    fn from_random<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        Self(Scalar::random(rng))
    }
}

impl From<Scalar> for RistrettoPrivate {
    fn from(scalar: Scalar) -> Self {
        Self(scalar)
    }
}

impl AsRef<Scalar> for RistrettoPrivate {
    fn as_ref(&self) -> &Scalar {
        &self.0
    }
}

impl TryFrom<&[u8]> for RistrettoPrivate {
    type Error = KeyError;

    fn try_from(src: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; 32] = src
            .try_into()
            .map_err(|_| KeyError::LengthMismatch(src.len(), 32))?;
        Self::try_from(&bytes)
    }
}

impl TryFrom<&[u8; 32]> for RistrettoPrivate {
    type Error = KeyError;

    fn try_from(src: &[u8; 32]) -> Result<Self, KeyError> {
        Option::<Scalar>::from(Scalar::from_canonical_bytes(*src))
            .map(Self)
            .ok_or(KeyError::InvalidPrivateKey)
    }
}

/// A Ristretto point used as a public key.
#[derive(Clone, Copy, Default, Eq, PartialEq)]
pub struct RistrettoPublic(pub(crate) RistrettoPoint);

impl RistrettoPublic {
    /// The compressed 32 byte encoding of the point.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.compress().to_bytes()
    }

    /// Verify a signature produced by [`RistrettoPrivate::sign_schnorrkel`].
    pub fn verify_schnorrkel(
        &self,
        context: &[u8],
        message: &[u8],
        signature: &RistrettoSignature,
    ) -> Result<(), KeyError> {
        let public =
            SchnorrPublic::from_bytes(&self.to_bytes()).map_err(|_| KeyError::InvalidPublicKey)?;
        let signature = schnorrkel_og::Signature::from_bytes(signature.as_ref())
            .map_err(|_| KeyError::InvalidSignature)?;
        public
            .verify_simple(context, message, &signature)
            .map_err(|_| KeyError::SignatureMismatch)
    }
}

impl fmt::Debug for RistrettoPublic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RistrettoPublic({})", hex::encode(self.to_bytes()))
    }
}

impl Hash for RistrettoPublic {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state)
    }
}

impl From<&RistrettoPrivate> for RistrettoPublic {
    fn from(private: &RistrettoPrivate) -> Self {
        Self(RistrettoPoint::mul_base(&private.0))
    }
}

impl From<RistrettoPoint> for RistrettoPublic {
    fn from(point: RistrettoPoint) -> Self {
        Self(point)
    }
}

impl AsRef<RistrettoPoint> for RistrettoPublic {
    fn as_ref(&self) -> &RistrettoPoint {
        &self.0
    }
}

impl TryFrom<&[u8]> for RistrettoPublic {
    type Error = KeyError;

    fn try_from(src: &[u8]) -> Result<Self, KeyError> {
        let compressed = CompressedRistrettoPublic::try_from(src)?;
        Self::try_from(&compressed)
    }
}

impl TryFrom<&CompressedRistrettoPublic> for RistrettoPublic {
    type Error = KeyError;

    fn try_from(src: &CompressedRistrettoPublic) -> Result<Self, KeyError> {
        CompressedRistretto(src.0)
            .decompress()
            .map(Self)
            .ok_or(KeyError::InvalidPublicKey)
    }
}

impl Serialize for RistrettoPublic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde_b64::serialize(&self.to_bytes(), serializer)
    }
}

impl<'de> Deserialize<'de> for RistrettoPublic {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = serde_b64::deserialize(deserializer)?;
        Self::try_from(&bytes[..]).map_err(D::Error::custom)
    }
}

/// The compressed form of a public key. Cheap to compare, hash and order,
/// so it is the form used as a map key and on the wire.
#[derive(Clone, Copy, Default, Eq, PartialEq, Hash)]
pub struct CompressedRistrettoPublic([u8; 32]);

impl CompressedRistrettoPublic {
    /// The raw compressed bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The last byte of the encoding, used for shard routing.
    pub fn last_byte(&self) -> u8 {
        self.0[31]
    }
}

impl fmt::Debug for CompressedRistrettoPublic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompressedRistrettoPublic({})", hex::encode(self.0))
    }
}

impl Ord for CompressedRistrettoPublic {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for CompressedRistrettoPublic {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&RistrettoPublic> for CompressedRistrettoPublic {
    fn from(src: &RistrettoPublic) -> Self {
        Self(src.to_bytes())
    }
}

impl From<[u8; 32]> for CompressedRistrettoPublic {
    fn from(src: [u8; 32]) -> Self {
        Self(src)
    }
}

impl TryFrom<&[u8]> for CompressedRistrettoPublic {
    type Error = KeyError;

    fn try_from(src: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; 32] = src
            .try_into()
            .map_err(|_| KeyError::LengthMismatch(src.len(), 32))?;
        Ok(Self(bytes))
    }
}

impl AsRef<[u8]> for CompressedRistrettoPublic {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for CompressedRistrettoPublic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde_b64::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for CompressedRistrettoPublic {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = serde_b64::deserialize(deserializer)?;
        Self::try_from(&bytes[..]).map_err(D::Error::custom)
    }
}
