// Copyright (c) 2018-2025 The Botho Foundation

//! MLSAG (Multilayered Linkable Spontaneous Anonymous Group) signatures.
//!
//! A ring is an `n x m` matrix of public keys. Exactly one row (the real
//! row) is known to the signer, who holds the discrete log of every key in
//! it. The leading columns are spend columns: their keys are `x*G` and each
//! gets a key image `x*Hp(K)`. The trailing columns are blinding columns:
//! commitments to zero `z*B_BLINDING`, which prove value balance and carry no
//! key image.
//!
//! The plain kind has one trailing blinding column. The confidential-asset
//! kind has two (asset-tag balance, then commitment balance) and uses its own
//! round-hash domain and encoding prefix, so signatures of one kind never
//! verify as the other.

use super::{
    hash_to_point, point_from_bytes, scalar_from_bytes, Error, KeyImage, RistrettoPoint, Scalar,
    B_BLINDING, G,
};
use crate::domain_separators::{MLSAG_CA_ROUND_HASH_DOMAIN_TAG, MLSAG_ROUND_HASH_DOMAIN_TAG};
use blake2::{Blake2b512, Digest};
use prv_crypto_keys::RistrettoPublic;
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

/// Encoding prefix of a serialized [`Ring`].
pub const RING_PREFIX: u8 = 0x52;
const MLSAG_PREFIX: u8 = 0x4d;
const MLSAG_CA_PREFIX: u8 = 0x43;

/// Length of the message an MLSAG signs.
pub const MESSAGE_LEN: usize = 32;

/// Largest dimension representable in the byte encodings.
pub const MAX_DIMENSION: usize = u8::MAX as usize;

/// Which MLSAG variant a ring is signed with.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MlsagKind {
    /// One trailing commitment-to-zero column.
    Plain,
    /// Two trailing columns: asset-tag balance and commitment balance.
    ConfidentialAsset,
}

impl MlsagKind {
    /// Number of trailing blinding columns.
    pub fn blinding_columns(&self) -> usize {
        match self {
            Self::Plain => 1,
            Self::ConfidentialAsset => 2,
        }
    }

    fn prefix(&self) -> u8 {
        match self {
            Self::Plain => MLSAG_PREFIX,
            Self::ConfidentialAsset => MLSAG_CA_PREFIX,
        }
    }

    fn from_prefix(prefix: u8) -> Result<Self, Error> {
        match prefix {
            MLSAG_PREFIX => Ok(Self::Plain),
            MLSAG_CA_PREFIX => Ok(Self::ConfidentialAsset),
            other => Err(Error::InvalidPrefix(other)),
        }
    }

    fn domain_tag(&self) -> &'static [u8] {
        match self {
            Self::Plain => MLSAG_ROUND_HASH_DOMAIN_TAG,
            Self::ConfidentialAsset => MLSAG_CA_ROUND_HASH_DOMAIN_TAG,
        }
    }

    fn spend_columns(&self, columns: usize) -> Result<usize, Error> {
        columns
            .checked_sub(self.blinding_columns())
            .filter(|spend| *spend > 0)
            .ok_or(Error::TooFewColumns(self.blinding_columns()))
    }
}

/// A rectangular matrix of ring members, one row per candidate signer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ring {
    keys: Vec<Vec<RistrettoPoint>>,
}

impl Ring {
    /// Build a ring from its rows. Rows must be non-empty and of equal
    /// length.
    pub fn new(keys: Vec<Vec<RistrettoPoint>>) -> Result<Self, Error> {
        let columns = keys.first().map(Vec::len).unwrap_or(0);
        if columns == 0 {
            return Err(Error::EmptyRing);
        }
        if keys.iter().any(|row| row.len() != columns) {
            return Err(Error::RaggedRing);
        }
        Ok(Self { keys })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.keys.len()
    }

    /// Number of columns.
    pub fn columns(&self) -> usize {
        self.keys[0].len()
    }

    /// The `i`th row.
    pub fn row(&self, i: usize) -> Option<&[RistrettoPoint]> {
        self.keys.get(i).map(Vec::as_slice)
    }

    /// All rows.
    pub fn keys(&self) -> &[Vec<RistrettoPoint>] {
        &self.keys
    }

    /// `RING_PREFIX ‖ n ‖ m ‖ points`, row-major.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let (n, m) = (self.rows(), self.columns());
        if n > MAX_DIMENSION || m > MAX_DIMENSION {
            return Err(Error::RingTooLarge(n, m));
        }
        let mut bytes = Vec::with_capacity(3 + 32 * n * m);
        bytes.push(RING_PREFIX);
        bytes.push(n as u8);
        bytes.push(m as u8);
        for point in self.keys.iter().flatten() {
            bytes.extend_from_slice(point.compress().as_bytes());
        }
        Ok(bytes)
    }

    /// Decode [`Ring::to_bytes`] output.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < 3 {
            return Err(Error::LengthMismatch(bytes.len(), 3));
        }
        if bytes[0] != RING_PREFIX {
            return Err(Error::InvalidPrefix(bytes[0]));
        }
        let (n, m) = (bytes[1] as usize, bytes[2] as usize);
        let expected = 3 + 32 * n * m;
        if bytes.len() != expected {
            return Err(Error::LengthMismatch(bytes.len(), expected));
        }
        let mut chunks = bytes[3..].chunks_exact(32);
        let mut keys = Vec::with_capacity(n);
        for _ in 0..n {
            let row = chunks
                .by_ref()
                .take(m)
                .map(point_from_bytes)
                .collect::<Result<Vec<_>, _>>()?;
            keys.push(row);
        }
        Self::new(keys)
    }
}

/// A ring paired with the real row index and its secrets. Ready to sign
/// exactly once.
pub struct SignableRing {
    ring: Ring,
    kind: MlsagKind,
    real_index: usize,
    private_keys: Vec<Scalar>,
}

// Test-only: `assert_matches!` needs `Debug`; private keys are not printed.
#[cfg(test)]
impl core::fmt::Debug for SignableRing {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SignableRing")
            .field("kind", &self.kind)
            .field("real_index", &self.real_index)
            .finish_non_exhaustive()
    }
}

impl Drop for SignableRing {
    fn drop(&mut self) {
        self.private_keys.zeroize();
    }
}

impl SignableRing {
    /// Pair a ring with the secrets of row `real_index`, one per column.
    pub fn new(
        ring: Ring,
        kind: MlsagKind,
        real_index: usize,
        private_keys: Vec<Scalar>,
    ) -> Result<Self, Error> {
        if real_index >= ring.rows() {
            return Err(Error::IndexOutOfBounds);
        }
        kind.spend_columns(ring.columns())?;
        if private_keys.len() != ring.columns() {
            return Err(Error::WrongNumberOfKeys(ring.columns(), private_keys.len()));
        }
        Ok(Self {
            ring,
            kind,
            real_index,
            private_keys,
        })
    }

    /// The ring being signed.
    pub fn ring(&self) -> &Ring {
        &self.ring
    }

    /// The signature variant.
    pub fn kind(&self) -> MlsagKind {
        self.kind
    }

    /// Key images the signature will publish, one per spend column.
    pub fn key_images(&self) -> Vec<KeyImage> {
        let spend = self.ring.columns() - self.kind.blinding_columns();
        self.private_keys[..spend]
            .iter()
            .map(KeyImage::from)
            .collect()
    }

    /// Sign a 32 byte message, consuming the ring.
    ///
    /// Before any signature is produced, each real-row key is checked
    /// against its secret. A spend key mismatch yields
    /// [`Error::SecretMismatch`], a commitment-to-zero mismatch yields
    /// [`Error::ValueNotConserved`].
    pub fn sign<R: CryptoRng + RngCore>(self, message: &[u8], rng: &mut R) -> Result<Mlsag, Error> {
        if message.len() != MESSAGE_LEN {
            return Err(Error::InvalidMessageLength(message.len()));
        }
        let n = self.ring.rows();
        let m = self.ring.columns();
        let spend = self.kind.spend_columns(m)?;
        let pi = self.real_index;
        let real_row = &self.ring.keys[pi];

        for (j, (key, x)) in real_row.iter().zip(&self.private_keys).enumerate() {
            let base = if j < spend { G } else { *B_BLINDING };
            if *key != x * base {
                return Err(if j < spend {
                    Error::SecretMismatch(j)
                } else {
                    Error::ValueNotConserved(j)
                });
            }
        }

        let hashed = hash_spend_columns(&self.ring, spend);
        let key_images: Vec<RistrettoPoint> = (0..spend)
            .map(|j| self.private_keys[j] * hashed[pi][j])
            .collect();

        let mut alpha: Vec<Scalar> = (0..m).map(|_| Scalar::random(rng)).collect();
        let mut responses: Vec<Vec<Scalar>> = (0..n)
            .map(|i| {
                (0..m)
                    .map(|_| {
                        if i == pi {
                            Scalar::ZERO
                        } else {
                            Scalar::random(rng)
                        }
                    })
                    .collect()
            })
            .collect();
        let mut challenges = vec![Scalar::ZERO; n];

        let mut points = Vec::with_capacity(2 * m);
        for j in 0..m {
            if j < spend {
                points.push(alpha[j] * G);
                points.push(alpha[j] * hashed[pi][j]);
            } else {
                points.push(alpha[j] * *B_BLINDING);
            }
        }
        challenges[(pi + 1) % n] = round_hash(self.kind, message, &points);

        for step in 1..n {
            let i = (pi + step) % n;
            let points = round_points(
                &self.ring.keys[i],
                &hashed[i],
                &responses[i],
                challenges[i],
                &key_images,
            );
            challenges[(i + 1) % n] = round_hash(self.kind, message, &points);
        }

        let c_pi = challenges[pi];
        for j in 0..m {
            responses[pi][j] = alpha[j] - c_pi * self.private_keys[j];
        }
        alpha.zeroize();

        Ok(Mlsag {
            kind: self.kind,
            c_zero: challenges[0],
            key_images: key_images
                .iter()
                .map(|point| KeyImage {
                    point: point.compress(),
                })
                .collect(),
            responses,
        })
    }
}

/// A signed MLSAG.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Mlsag {
    kind: MlsagKind,
    c_zero: Scalar,
    key_images: Vec<KeyImage>,
    responses: Vec<Vec<Scalar>>,
}

impl Mlsag {
    /// The signature variant.
    pub fn kind(&self) -> MlsagKind {
        self.kind
    }

    /// The initial challenge `c[0]`.
    pub fn c_zero(&self) -> &Scalar {
        &self.c_zero
    }

    /// Key images "spent" by this signature, one per spend column.
    pub fn key_images(&self) -> &[KeyImage] {
        &self.key_images
    }

    /// The `n x m` response matrix.
    pub fn responses(&self) -> &[Vec<Scalar>] {
        &self.responses
    }

    /// Verify against the ring that was signed.
    pub fn verify(&self, message: &[u8], ring: &Ring) -> Result<(), Error> {
        if message.len() != MESSAGE_LEN {
            return Err(Error::InvalidMessageLength(message.len()));
        }
        let n = ring.rows();
        let m = ring.columns();
        if self.responses.len() != n {
            return Err(Error::LengthMismatch(self.responses.len(), n));
        }
        if let Some(row) = self.responses.iter().find(|row| row.len() != m) {
            return Err(Error::LengthMismatch(row.len(), m));
        }
        let spend = self.kind.spend_columns(m)?;
        if self.key_images.len() != spend {
            return Err(Error::LengthMismatch(self.key_images.len(), spend));
        }
        let key_images = self
            .key_images
            .iter()
            .map(KeyImage::decompress)
            .collect::<Result<Vec<_>, _>>()?;

        let hashed = hash_spend_columns(ring, spend);
        let mut c = self.c_zero;
        for i in 0..n {
            let points = round_points(&ring.keys[i], &hashed[i], &self.responses[i], c, &key_images);
            c = round_hash(self.kind, message, &points);
        }

        if c == self.c_zero {
            Ok(())
        } else {
            Err(Error::InvalidSignature)
        }
    }

    /// `prefix ‖ n ‖ m ‖ k ‖ c0 ‖ key images ‖ responses`, with responses
    /// row-major.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let n = self.responses.len();
        let m = self.responses.first().map(Vec::len).unwrap_or(0);
        if n > MAX_DIMENSION || m > MAX_DIMENSION {
            return Err(Error::RingTooLarge(n, m));
        }
        let k = self.key_images.len();
        let mut bytes = Vec::with_capacity(4 + 32 * (1 + k + n * m));
        bytes.push(self.kind.prefix());
        bytes.push(n as u8);
        bytes.push(m as u8);
        bytes.push(k as u8);
        bytes.extend_from_slice(self.c_zero.as_bytes());
        for key_image in &self.key_images {
            bytes.extend_from_slice(key_image.as_bytes());
        }
        for response in self.responses.iter().flatten() {
            bytes.extend_from_slice(response.as_bytes());
        }
        Ok(bytes)
    }

    /// Decode [`Mlsag::to_bytes`] output.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < 4 {
            return Err(Error::LengthMismatch(bytes.len(), 4));
        }
        let kind = MlsagKind::from_prefix(bytes[0])?;
        let (n, m, k) = (bytes[1] as usize, bytes[2] as usize, bytes[3] as usize);
        if n == 0 {
            return Err(Error::EmptyRing);
        }
        let spend = kind.spend_columns(m)?;
        if k != spend {
            return Err(Error::LengthMismatch(k, spend));
        }
        let expected = 4 + 32 * (1 + k + n * m);
        if bytes.len() != expected {
            return Err(Error::LengthMismatch(bytes.len(), expected));
        }

        let mut chunks = bytes[4..].chunks_exact(32);
        let c_zero = chunks
            .next()
            .ok_or(Error::LengthMismatch(bytes.len(), expected))
            .and_then(scalar_from_bytes)?;
        let key_images = chunks
            .by_ref()
            .take(k)
            .map(KeyImage::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let mut responses = Vec::with_capacity(n);
        for _ in 0..n {
            let row = chunks
                .by_ref()
                .take(m)
                .map(scalar_from_bytes)
                .collect::<Result<Vec<_>, _>>()?;
            responses.push(row);
        }

        Ok(Self {
            kind,
            c_zero,
            key_images,
            responses,
        })
    }
}

/// `Hp(K[i][j])` for every spend column of every row.
fn hash_spend_columns(ring: &Ring, spend: usize) -> Vec<Vec<RistrettoPoint>> {
    ring.keys
        .iter()
        .map(|row| {
            row[..spend]
                .iter()
                .map(|key| hash_to_point(&RistrettoPublic::from(*key)))
                .collect()
        })
        .collect()
}

/// The points hashed for one row: `(r*G + c*K, r*Hp(K) + c*I)` per spend
/// column, then `r*B_BLINDING + c*K` per blinding column.
fn round_points(
    keys: &[RistrettoPoint],
    hashed: &[RistrettoPoint],
    responses: &[Scalar],
    c: Scalar,
    key_images: &[RistrettoPoint],
) -> Vec<RistrettoPoint> {
    let spend = hashed.len();
    let mut points = Vec::with_capacity(2 * keys.len());
    for (j, (key, r)) in keys.iter().zip(responses).enumerate() {
        if j < spend {
            points.push(r * G + c * key);
            points.push(r * hashed[j] + c * key_images[j]);
        } else {
            points.push(r * *B_BLINDING + c * key);
        }
    }
    points
}

fn round_hash(kind: MlsagKind, message: &[u8], points: &[RistrettoPoint]) -> Scalar {
    let mut hasher = Blake2b512::new();
    hasher.update(kind.domain_tag());
    hasher.update(message);
    for point in points {
        hasher.update(point.compress().as_bytes());
    }
    Scalar::from_hash(hasher)
}
