// Copyright (c) 2018-2025 The Botho Foundation

//! The coin model.
//!
//! Wire coins are [`Coin`]s; coins decrypted with the owner's key set are
//! [`PlainCoin`]s. Both versions share [`CoinBase`], decrypted coins add
//! [`Spendable`].

mod asset_tag;
mod v1;
mod v2;

pub use self::{
    asset_tag::{asset_tag_blinder, AssetTag, AssetTagCache},
    v1::{CoinV1, CoinV1Opening, EncryptedOpening, OutputCoinV1, PlainCoinV1},
    v2::{new_output_coin, CoinV2, OutputCoin, PlainCoinV2, TxRandom},
};

use crate::{CryptoError, Result};
use core::fmt;
use prv_account_keys::KeySet;
use prv_crypto_keys::{CompressedRistrettoPublic, RistrettoPrivate};
use prv_crypto_ring_signature::{CompressedCommitment, KeyImage, RistrettoPoint, Scalar};
use serde::{Deserialize, Serialize};

/// Coin format version.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum CoinVersion {
    /// Legacy coins paid to the owner's reusable key.
    V1 = 1,
    /// One-time-address coins.
    V2 = 2,
}

impl CoinVersion {
    /// The wire discriminator.
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<u8> for CoinVersion {
    type Error = crate::Error;

    fn try_from(src: u8) -> Result<Self> {
        match src {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            other => Err(crate::ProtocolError::UnsupportedVersion(other).into()),
        }
    }
}

impl fmt::Display for CoinVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "v{}", self.as_u8())
    }
}

/// What every coin exposes.
pub trait CoinBase {
    /// Coin format version.
    fn version(&self) -> CoinVersion;

    /// The public key stored with the coin.
    fn public_key(&self) -> &CompressedRistrettoPublic;

    /// The Pedersen commitment to the coin's value.
    fn commitment(&self) -> &CompressedCommitment;

    /// The key a ring row uses for this coin.
    fn ring_key(&self) -> Result<RistrettoPoint>;

    /// The asset tag of confidential-asset coins.
    fn asset_tag(&self) -> Option<&AssetTag>;
}

/// What a decrypted coin exposes.
pub trait Spendable: CoinBase {
    /// The coin's value.
    fn value(&self) -> u64;

    /// The commitment randomness.
    fn randomness(&self) -> &Scalar;

    /// The key image, known when the key set could spend.
    fn key_image(&self) -> Option<&KeyImage>;
}

/// A coin as stored on chain.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Coin {
    /// A version 1 coin.
    V1(CoinV1),
    /// A version 2 coin.
    V2(CoinV2),
}

impl CoinBase for Coin {
    fn version(&self) -> CoinVersion {
        match self {
            Self::V1(_) => CoinVersion::V1,
            Self::V2(_) => CoinVersion::V2,
        }
    }

    fn public_key(&self) -> &CompressedRistrettoPublic {
        match self {
            Self::V1(coin) => &coin.public_key,
            Self::V2(coin) => &coin.public_key,
        }
    }

    fn commitment(&self) -> &CompressedCommitment {
        match self {
            Self::V1(coin) => &coin.commitment,
            Self::V2(coin) => &coin.commitment,
        }
    }

    fn ring_key(&self) -> Result<RistrettoPoint> {
        match self {
            Self::V1(coin) => coin.ring_key(),
            Self::V2(coin) => coin.ring_key(),
        }
    }

    fn asset_tag(&self) -> Option<&AssetTag> {
        match self {
            Self::V1(_) => None,
            Self::V2(coin) => coin.asset_tag.as_ref(),
        }
    }
}

impl From<CoinV1> for Coin {
    fn from(src: CoinV1) -> Self {
        Self::V1(src)
    }
}

impl From<CoinV2> for Coin {
    fn from(src: CoinV2) -> Self {
        Self::V2(src)
    }
}

/// A coin decrypted with its owner's key set.
#[derive(Clone, Debug)]
pub enum PlainCoin {
    /// A version 1 coin.
    V1(PlainCoinV1),
    /// A version 2 coin.
    V2(PlainCoinV2),
}

impl PlainCoin {
    /// The wire coin.
    pub fn to_coin(&self) -> Coin {
        match self {
            Self::V1(coin) => Coin::V1(coin.coin.clone()),
            Self::V2(coin) => Coin::V2(coin.coin.clone()),
        }
    }

    /// The secret of the coin's ring key, when the key set could spend.
    pub fn spend_secret(&self) -> Option<&RistrettoPrivate> {
        match self {
            Self::V1(coin) => coin.spend_secret.as_ref(),
            Self::V2(coin) => coin.spend_secret.as_ref(),
        }
    }
}

impl CoinBase for PlainCoin {
    fn version(&self) -> CoinVersion {
        match self {
            Self::V1(_) => CoinVersion::V1,
            Self::V2(_) => CoinVersion::V2,
        }
    }

    fn public_key(&self) -> &CompressedRistrettoPublic {
        match self {
            Self::V1(coin) => &coin.coin.public_key,
            Self::V2(coin) => &coin.coin.public_key,
        }
    }

    fn commitment(&self) -> &CompressedCommitment {
        match self {
            Self::V1(coin) => &coin.coin.commitment,
            Self::V2(coin) => &coin.coin.commitment,
        }
    }

    fn ring_key(&self) -> Result<RistrettoPoint> {
        match self {
            Self::V1(coin) => coin.coin.ring_key(),
            Self::V2(coin) => coin.coin.ring_key(),
        }
    }

    fn asset_tag(&self) -> Option<&AssetTag> {
        match self {
            Self::V1(_) => None,
            Self::V2(coin) => coin.coin.asset_tag.as_ref(),
        }
    }
}

impl Spendable for PlainCoin {
    fn value(&self) -> u64 {
        match self {
            Self::V1(coin) => coin.value,
            Self::V2(coin) => coin.value,
        }
    }

    fn randomness(&self) -> &Scalar {
        match self {
            Self::V1(coin) => &coin.randomness,
            Self::V2(coin) => &coin.randomness,
        }
    }

    fn key_image(&self) -> Option<&KeyImage> {
        match self {
            Self::V1(coin) => coin.key_image.as_ref(),
            Self::V2(coin) => coin.key_image.as_ref(),
        }
    }
}

/// Decrypt `coin` with its owner's key set.
///
/// Fails with [`CryptoError::CoinNotOwned`] for someone else's coin and with
/// [`CryptoError::CommitmentMismatch`] if the recovered opening does not
/// match the commitment.
pub fn decrypt(coin: &Coin, key_set: &KeySet) -> Result<PlainCoin> {
    match coin {
        Coin::V1(coin) => coin.decrypt(key_set).map(PlainCoin::V1),
        Coin::V2(coin) => coin.decrypt(key_set).map(PlainCoin::V2),
    }
}

/// The key image `x*Hp(K)` of `coin` spent with secret `x`, `K` being the
/// coin's ring key. Fails unless `x*G == K`.
pub fn compute_key_image(coin: &Coin, private_key: &RistrettoPrivate) -> Result<KeyImage> {
    let ring_key = coin.ring_key()?;
    if private_key.as_ref() * prv_crypto_ring_signature::G != ring_key {
        return Err(CryptoError::CoinNotOwned.into());
    }
    Ok(KeyImage::from(private_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, PaymentInfo, ProtocolConfig};
    use assert_matches::assert_matches;
    use prv_account_keys::AccountKey;
    use prv_crypto_keys::FromRandom;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_key_image_is_deterministic() {
        let mut rng: StdRng = SeedableRng::from_seed([31u8; 32]);
        let account = AccountKey::random(&mut rng);
        let info = PaymentInfo::new(account.public_address(), 10);
        let coin = Coin::V2(
            new_output_coin(&info, 0, None, &ProtocolConfig::default(), &mut rng)
                .unwrap()
                .coin,
        );
        let plain = decrypt(&coin, &account.key_set()).unwrap();
        let secret = plain.spend_secret().unwrap();

        let first = compute_key_image(&coin, secret).unwrap();
        let second = compute_key_image(&coin, secret).unwrap();
        assert_eq!(first.as_bytes(), second.as_bytes());
        assert_eq!(plain.key_image(), Some(&first));
    }

    #[test]
    fn test_key_image_requires_matching_secret() {
        let mut rng: StdRng = SeedableRng::from_seed([32u8; 32]);
        let account = AccountKey::random(&mut rng);
        let info = PaymentInfo::new(account.public_address(), 10);
        let coin = Coin::V1(CoinV1::new_output(&info, false, &mut rng).coin);
        assert_matches!(
            compute_key_image(&coin, &RistrettoPrivate::from_random(&mut rng)),
            Err(Error::Crypto(CryptoError::CoinNotOwned))
        );
    }

    #[test]
    fn test_plain_coin_accessors_dispatch() {
        let mut rng: StdRng = SeedableRng::from_seed([33u8; 32]);
        let account = AccountKey::random(&mut rng);
        let info = PaymentInfo::new(account.public_address(), 10);

        let v1 = Coin::from(CoinV1::new_output(&info, true, &mut rng).coin);
        let v2 = Coin::from(
            new_output_coin(&info, 0, None, &ProtocolConfig::default(), &mut rng)
                .unwrap()
                .coin,
        );
        for coin in [v1, v2] {
            let plain = decrypt(&coin, &account.key_set()).unwrap();
            assert_eq!(plain.version(), coin.version());
            assert_eq!(plain.value(), 10);
            assert_eq!(plain.commitment(), coin.commitment());
            assert_eq!(plain.to_coin(), coin);
            assert!(plain.asset_tag().is_none());
        }
    }

    #[test]
    fn test_coin_version_discriminator() {
        assert_eq!(CoinVersion::try_from(2u8).unwrap(), CoinVersion::V2);
        assert_matches!(
            CoinVersion::try_from(3u8),
            Err(Error::Protocol(crate::ProtocolError::UnsupportedVersion(3)))
        );
    }
}
