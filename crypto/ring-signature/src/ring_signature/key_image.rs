// Copyright (c) 2018-2025 The Botho Foundation

use super::{hash_to_point, Error, Scalar};
use core::{cmp::Ordering, fmt};
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use prv_crypto_keys::{serde_b64, RistrettoPrivate, RistrettoPublic};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

/// The "image" of a private key `x`: I = x * Hp(x * G) = x * Hp(P).
///
/// Two spends of the same key produce the same image, which is how double
/// spends are detected without revealing which ring member was spent.
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq)]
pub struct KeyImage {
    /// The curve point corresponding to the key image
    pub point: CompressedRistretto,
}

impl KeyImage {
    /// View the underlying `CompressedRistretto` as an array of bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.point.as_bytes()
    }

    /// Copies `self` into a new Vec.
    pub fn to_vec(&self) -> Vec<u8> {
        self.point.as_bytes().to_vec()
    }

    /// The decompressed point.
    pub fn decompress(&self) -> Result<RistrettoPoint, Error> {
        self.point.decompress().ok_or(Error::InvalidKeyImage)
    }
}

impl From<&RistrettoPrivate> for KeyImage {
    fn from(x: &RistrettoPrivate) -> Self {
        let P = RistrettoPublic::from(x);
        let Hp = hash_to_point(&P);
        let point = x.as_ref() * Hp;
        KeyImage {
            point: point.compress(),
        }
    }
}

impl From<&Scalar> for KeyImage {
    fn from(x: &Scalar) -> Self {
        Self::from(&RistrettoPrivate::from(*x))
    }
}

// Many tests use this
impl From<u64> for KeyImage {
    fn from(n: u64) -> Self {
        let private_key = RistrettoPrivate::from(Scalar::from(n));
        Self::from(&private_key)
    }
}

impl TryFrom<[u8; 32]> for KeyImage {
    type Error = Error;
    fn try_from(src: [u8; 32]) -> Result<Self, Self::Error> {
        Self::try_from(&src[..])
    }
}

impl TryFrom<&[u8]> for KeyImage {
    type Error = Error;
    fn try_from(src: &[u8]) -> Result<Self, Error> {
        if src.len() != 32 {
            return Err(Error::LengthMismatch(src.len(), 32));
        }
        let point = CompressedRistretto::from_slice(src).map_err(|_e| Error::InvalidCurvePoint)?;
        point.decompress().ok_or(Error::InvalidKeyImage)?;
        Ok(Self { point })
    }
}

impl AsRef<[u8]> for KeyImage {
    fn as_ref(&self) -> &[u8] {
        &self.as_bytes()[..]
    }
}

impl Ord for KeyImage {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl PartialOrd for KeyImage {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for KeyImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyImage({})", hex::encode(self.as_bytes()))
    }
}

impl fmt::Display for KeyImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.as_bytes()))
    }
}

impl Serialize for KeyImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde_b64::serialize(self.as_bytes(), serializer)
    }
}

impl<'de> Deserialize<'de> for KeyImage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = serde_b64::deserialize(deserializer)?;
        Self::try_from(&bytes[..]).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prv_crypto_keys::FromRandom;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_key_image_from_private_key() {
        let mut rng: StdRng = SeedableRng::from_seed([1u8; 32]);
        let private = RistrettoPrivate::from_random(&mut rng);
        let key_image = KeyImage::from(&private);

        // Same private key should produce same key image
        let key_image2 = KeyImage::from(&private);
        assert_eq!(key_image, key_image2);
    }

    #[test]
    fn test_different_keys_different_images() {
        let mut rng: StdRng = SeedableRng::from_seed([2u8; 32]);
        let private1 = RistrettoPrivate::from_random(&mut rng);
        let private2 = RistrettoPrivate::from_random(&mut rng);

        assert_ne!(KeyImage::from(&private1), KeyImage::from(&private2));
    }

    #[test]
    fn test_key_image_from_u64() {
        let image1 = KeyImage::from(1u64);
        let image2 = KeyImage::from(2u64);
        let image1_again = KeyImage::from(1u64);

        assert_ne!(image1, image2);
        assert_eq!(image1, image1_again);
    }

    #[test]
    fn test_key_image_bytes_roundtrip() {
        let key_image = KeyImage::from(7u64);
        let bytes: [u8; 32] = *key_image.as_bytes();
        let recovered = KeyImage::try_from(bytes).expect("Should recover key image");
        assert_eq!(key_image, recovered);
    }

    #[test]
    fn test_key_image_invalid_length() {
        let short_bytes = [0u8; 16];
        assert_eq!(
            KeyImage::try_from(&short_bytes[..]),
            Err(Error::LengthMismatch(16, 32))
        );
    }

    #[test]
    fn test_key_image_rejects_invalid_point() {
        assert_eq!(KeyImage::try_from([0xffu8; 32]), Err(Error::InvalidKeyImage));
    }

    #[test]
    fn test_key_image_serde() {
        let key_image = KeyImage::from(42u64);
        let json = serde_json::to_string(&key_image).unwrap();
        let back: KeyImage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key_image);
    }
}
