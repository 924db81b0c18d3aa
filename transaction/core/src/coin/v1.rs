// Copyright (c) 2018-2025 The Botho Foundation

//! Legacy (version 1) coins.
//!
//! A v1 coin is paid to the owner's reusable spend key `B`. What makes each
//! coin distinct is its serial number derivator `snd`: the coin is spent
//! with the secret `b + Hs(snd)`, whose public point `B + Hs(snd)*G` is the
//! coin's ring key. Amounts are either in the clear or encrypted to the
//! owner's view key with an ephemeral Diffie-Hellman key.

use crate::{
    domain_separators::{
        SERIAL_NUMBER_DOMAIN_TAG, V1_AMOUNT_MASK_DOMAIN_TAG, V1_RANDOMNESS_MASK_DOMAIN_TAG,
    },
    CryptoError, PaymentInfo, Result,
};
use prv_account_keys::KeySet;
use prv_crypto_keys::{
    serde_b64, CompressedRistrettoPublic, FromRandom, RistrettoPrivate, RistrettoPublic,
};
use prv_crypto_ring_signature::{
    generators, hash_to_scalar, onetime_keys::create_shared_secret, scalar_from_bytes,
    CompressedCommitment, KeyImage, RistrettoPoint, Scalar, G,
};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

/// How a v1 coin's value and randomness are carried.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum CoinV1Opening {
    /// Readable by anyone. Used when privacy is off.
    Clear {
        /// The coin's value.
        value: u64,
        /// The commitment randomness.
        #[serde(with = "serde_b64::array")]
        randomness: [u8; 32],
    },
    /// Encrypted to the owner's view key.
    Encrypted(EncryptedOpening),
}

/// A v1 opening encrypted under `D = e*A = a*E`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EncryptedOpening {
    /// The ephemeral public key `E = e*G`.
    pub ephemeral_public_key: CompressedRistrettoPublic,
    /// Value XOR a mask derived from `D`.
    pub masked_value: u64,
    /// Randomness plus a mask derived from `D`.
    #[serde(with = "serde_b64::array")]
    pub masked_randomness: [u8; 32],
}

/// A version 1 coin as it appears on chain.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CoinV1 {
    /// The owner's spend public key.
    pub public_key: CompressedRistrettoPublic,
    /// `value*G_VALUE + randomness*B_BLINDING`.
    pub commitment: CompressedCommitment,
    /// Serial number derivator.
    #[serde(with = "serde_b64::array")]
    pub snd: [u8; 32],
    /// Value and randomness.
    pub opening: CoinV1Opening,
    /// Free-form bytes from the payment message.
    #[serde(with = "serde_b64", default)]
    pub info: Vec<u8>,
}

/// A freshly created v1 output together with its opening.
#[derive(Clone, Debug)]
pub struct OutputCoinV1 {
    /// The wire coin.
    pub coin: CoinV1,
    /// Its value.
    pub value: u64,
    /// Its commitment randomness.
    pub randomness: Scalar,
}

/// A decrypted v1 coin.
#[derive(Clone, Debug)]
pub struct PlainCoinV1 {
    /// The wire coin.
    pub coin: CoinV1,
    /// Its value.
    pub value: u64,
    /// Its commitment randomness.
    pub randomness: Scalar,
    /// `b + Hs(snd)`, when the key set can spend.
    pub spend_secret: Option<RistrettoPrivate>,
    /// The key image, when the key set can spend.
    pub key_image: Option<KeyImage>,
}

impl CoinV1 {
    /// Create an output paying `payment_info`. With `private` the opening is
    /// encrypted to the recipient's view key, otherwise it is clear.
    pub fn new_output<R: CryptoRng + RngCore>(
        payment_info: &PaymentInfo,
        private: bool,
        rng: &mut R,
    ) -> OutputCoinV1 {
        let address = &payment_info.address;
        let value = payment_info.amount;
        let randomness = Scalar::random(rng);
        let snd = Scalar::random(rng).to_bytes();
        let commitment = CompressedCommitment::new(value, randomness, &generators());

        let opening = if private {
            let ephemeral = RistrettoPrivate::from_random(rng);
            let shared = create_shared_secret(address.view_public_key(), &ephemeral);
            CoinV1Opening::Encrypted(EncryptedOpening {
                ephemeral_public_key: CompressedRistrettoPublic::from(&RistrettoPublic::from(
                    &ephemeral,
                )),
                masked_value: value ^ value_mask(&shared),
                masked_randomness: (randomness + randomness_mask(&shared)).to_bytes(),
            })
        } else {
            CoinV1Opening::Clear {
                value,
                randomness: randomness.to_bytes(),
            }
        };

        OutputCoinV1 {
            coin: CoinV1 {
                public_key: CompressedRistrettoPublic::from(address.spend_public_key()),
                commitment,
                snd,
                opening,
                info: payment_info.message.clone(),
            },
            value,
            randomness,
        }
    }

    /// `Hs(snd)`, the offset from the owner key to this coin's spend point.
    pub fn spend_offset(&self) -> Scalar {
        hash_to_scalar(SERIAL_NUMBER_DOMAIN_TAG, &[&self.snd])
    }

    /// The coin's ring key `B + Hs(snd)*G`.
    pub fn ring_key(&self) -> Result<RistrettoPoint> {
        let owner = RistrettoPublic::try_from(&self.public_key)?;
        let owner: &RistrettoPoint = owner.as_ref();
        Ok(owner + self.spend_offset() * G)
    }

    /// True if the amounts are public.
    pub fn is_clear(&self) -> bool {
        matches!(self.opening, CoinV1Opening::Clear { .. })
    }

    /// Recover the opening with the owner's key set.
    pub fn decrypt(&self, key_set: &KeySet) -> Result<PlainCoinV1> {
        let owner = CompressedRistrettoPublic::from(key_set.payment_address().spend_public_key());
        if owner != self.public_key {
            return Err(CryptoError::CoinNotOwned.into());
        }

        let (value, randomness) = match &self.opening {
            CoinV1Opening::Clear { value, randomness } => (*value, scalar_from_bytes(randomness)?),
            CoinV1Opening::Encrypted(encrypted) => {
                let ephemeral = RistrettoPublic::try_from(&encrypted.ephemeral_public_key)?;
                let shared = create_shared_secret(&ephemeral, key_set.view_private_key());
                let masked = scalar_from_bytes(&encrypted.masked_randomness)?;
                (
                    encrypted.masked_value ^ value_mask(&shared),
                    masked - randomness_mask(&shared),
                )
            }
        };

        if CompressedCommitment::new(value, randomness, &generators()) != self.commitment {
            return Err(CryptoError::CommitmentMismatch.into());
        }

        let spend_secret = key_set
            .spend_private_key()
            .map(|b| RistrettoPrivate::from(b.as_ref() + self.spend_offset()));
        let key_image = spend_secret.as_ref().map(KeyImage::from);

        Ok(PlainCoinV1 {
            coin: self.clone(),
            value,
            randomness,
            spend_secret,
            key_image,
        })
    }
}

fn value_mask(shared_secret: &RistrettoPublic) -> u64 {
    let mask = hash_to_scalar(V1_AMOUNT_MASK_DOMAIN_TAG, &[&shared_secret.to_bytes()]);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&mask.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

fn randomness_mask(shared_secret: &RistrettoPublic) -> Scalar {
    hash_to_scalar(V1_RANDOMNESS_MASK_DOMAIN_TAG, &[&shared_secret.to_bytes()])
}
