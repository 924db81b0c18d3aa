// Copyright (c) 2018-2025 The Botho Foundation

//! One-time-address (version 2) coins.

use super::asset_tag::{asset_tag_blinder, AssetTag};
use crate::{
    domain_separators::{AMOUNT_MASK_DOMAIN_TAG, RANDOMNESS_MASK_DOMAIN_TAG},
    CryptoError, PaymentInfo, ProtocolConfig, ProtocolError, Result, TokenId,
};
use prv_account_keys::{shard_id_from_last_byte, KeySet};
use prv_crypto_keys::{
    serde_b64, CompressedRistrettoPublic, FromRandom, RistrettoPrivate, RistrettoPublic,
};
use prv_crypto_ring_signature::{
    asset_generators, generators, hash_to_scalar,
    onetime_keys::{
        create_shared_secret, create_target_key_from_shared_secret, recover_onetime_private_key,
        view_key_matches_output,
    },
    scalar_from_bytes, CompressedCommitment, KeyImage, PedersenGens, RistrettoPoint, Scalar,
    B_BLINDING,
};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

/// The sender-side randomness published with an output.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TxRandom {
    /// `R = r*G`.
    pub tx_public_key: CompressedRistrettoPublic,
    /// Position of the output in its transaction.
    pub index: u32,
}

/// A version 2 coin as it appears on chain.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CoinV2 {
    /// One-time public key `Hs(D ‖ index)*G + B`, or the burn key.
    pub public_key: CompressedRistrettoPublic,
    /// `value*base + randomness*B_BLINDING`, `base` being the asset tag if
    /// present and `G_VALUE` otherwise.
    pub commitment: CompressedCommitment,
    /// Absent for burn outputs, whose amounts are public.
    pub tx_random: Option<TxRandom>,
    /// The value, masked unless this is a burn output.
    pub amount: u64,
    /// The commitment randomness, masked unless this is a burn output.
    #[serde(with = "serde_b64::array")]
    pub randomness: [u8; 32],
    /// Present on confidential-asset coins.
    pub asset_tag: Option<AssetTag>,
    /// Free-form bytes from the payment message.
    #[serde(with = "serde_b64", default)]
    pub info: Vec<u8>,
}

/// A freshly created v2 output together with everything the prover needs.
#[derive(Clone, Debug)]
pub struct OutputCoin {
    /// The wire coin.
    pub coin: CoinV2,
    /// Its value.
    pub value: u64,
    /// Its commitment randomness.
    pub randomness: Scalar,
    /// Its asset tag, for confidential-asset outputs.
    pub asset_tag: Option<RistrettoPoint>,
    /// The asset tag blinder; zero when unblinded.
    pub asset_blinder: Scalar,
    /// `D = r*A`; `None` for burn outputs.
    pub shared_secret: Option<RistrettoPublic>,
}

impl OutputCoin {
    /// The commitment point.
    pub fn commitment(&self) -> RistrettoPoint {
        self.generators().commit(Scalar::from(self.value), self.randomness)
    }

    /// The generators the commitment is taken over.
    pub fn generators(&self) -> PedersenGens {
        self.asset_tag
            .as_ref()
            .map(asset_generators)
            .unwrap_or_else(generators)
    }
}

/// A decrypted v2 coin.
#[derive(Clone, Debug)]
pub struct PlainCoinV2 {
    /// The wire coin.
    pub coin: CoinV2,
    /// Its value.
    pub value: u64,
    /// Its commitment randomness.
    pub randomness: Scalar,
    /// `D = a*R`; `None` for burn outputs.
    pub shared_secret: Option<RistrettoPublic>,
    /// One-time private key, when the key set can spend.
    pub spend_secret: Option<RistrettoPrivate>,
    /// The key image, when the key set can spend.
    pub key_image: Option<KeyImage>,
}

impl PlainCoinV2 {
    /// The asset tag blinder of this coin, given the token it carries.
    ///
    /// An unblinded tag is recognized by comparing it with the token's raw
    /// generator; a token id comparison would not do, since every
    /// confidential-asset coin is published under the same umbrella id.
    pub fn asset_blinder_for(&self, raw_tag: &RistrettoPoint) -> Result<Scalar> {
        let tag = self
            .coin
            .asset_tag
            .as_ref()
            .ok_or(ProtocolError::TokenMismatch)?
            .decompress()?;
        if tag == *raw_tag {
            tracing::trace!("unblinded asset tag");
            return Ok(Scalar::ZERO);
        }
        let (shared_secret, tx_random) = self
            .shared_secret
            .as_ref()
            .zip(self.coin.tx_random.as_ref())
            .ok_or(ProtocolError::TokenMismatch)?;
        let blinder = asset_tag_blinder(shared_secret, tx_random.index);
        if tag != raw_tag + blinder * *B_BLINDING {
            return Err(ProtocolError::TokenMismatch.into());
        }
        Ok(blinder)
    }
}

/// Create a one-time-address output paying `payment_info` as output `index`.
///
/// Each attempt draws a fresh tx key until the one-time key's last byte
/// routes to the recipient's shard. With `token_id` the output is a
/// confidential-asset coin. Burn outputs skip the shared secret: the burn key
/// is used as is, the amount is public and the asset tag unblinded.
pub fn new_output_coin<R: CryptoRng + RngCore>(
    payment_info: &PaymentInfo,
    index: u32,
    token_id: Option<&TokenId>,
    config: &ProtocolConfig,
    rng: &mut R,
) -> Result<OutputCoin> {
    payment_info.validate()?;
    let address = &payment_info.address;
    let value = payment_info.amount;
    let randomness = Scalar::random(rng);

    if config.is_burn_address(address) {
        tracing::debug!(value, "creating burn output");
        let asset_tag = token_id.map(TokenId::asset_generator);
        let output = OutputCoin {
            coin: CoinV2 {
                public_key: CompressedRistrettoPublic::from(address.spend_public_key()),
                commitment: CompressedCommitment::default(),
                tx_random: None,
                amount: value,
                randomness: randomness.to_bytes(),
                asset_tag: asset_tag.as_ref().map(AssetTag::from),
                info: payment_info.message.clone(),
            },
            value,
            randomness,
            asset_tag,
            asset_blinder: Scalar::ZERO,
            shared_secret: None,
        };
        return Ok(with_commitment(output));
    }

    let target_shard = address.shard_id(config.num_shards);
    let (tx_private, shared_secret, public_key) = (0..config.max_shard_match_attempts)
        .find_map(|_| {
            let tx_private = RistrettoPrivate::from_random(rng);
            let shared = create_shared_secret(address.view_public_key(), &tx_private);
            let target =
                create_target_key_from_shared_secret(&shared, address.spend_public_key(), index);
            let compressed = CompressedRistrettoPublic::from(&target);
            (shard_id_from_last_byte(compressed.last_byte(), config.num_shards) == target_shard)
                .then_some((tx_private, shared, compressed))
        })
        .ok_or(CryptoError::ShardMatchExhausted(index))?;

    let (asset_tag, asset_blinder) = match token_id {
        None => (None, Scalar::ZERO),
        Some(token) if token.is_native() => (Some(token.asset_generator()), Scalar::ZERO),
        Some(token) => {
            let blinder = asset_tag_blinder(&shared_secret, index);
            (
                Some(token.asset_generator() + blinder * *B_BLINDING),
                blinder,
            )
        }
    };

    let output = OutputCoin {
        coin: CoinV2 {
            public_key,
            commitment: CompressedCommitment::default(),
            tx_random: Some(TxRandom {
                tx_public_key: CompressedRistrettoPublic::from(&RistrettoPublic::from(
                    &tx_private,
                )),
                index,
            }),
            amount: value ^ amount_mask(&shared_secret, index),
            randomness: (randomness + randomness_mask(&shared_secret, index)).to_bytes(),
            asset_tag: asset_tag.as_ref().map(AssetTag::from),
            info: payment_info.message.clone(),
        },
        value,
        randomness,
        asset_tag,
        asset_blinder,
        shared_secret: Some(shared_secret),
    };
    Ok(with_commitment(output))
}

fn with_commitment(mut output: OutputCoin) -> OutputCoin {
    output.coin.commitment = CompressedCommitment {
        point: output.commitment().compress(),
    };
    output
}

impl CoinV2 {
    /// True for burn outputs.
    pub fn is_burn(&self) -> bool {
        self.tx_random.is_none()
    }

    /// The coin's ring key, its one-time public key.
    pub fn ring_key(&self) -> Result<RistrettoPoint> {
        let key = RistrettoPublic::try_from(&self.public_key)?;
        Ok(*key.as_ref())
    }

    /// Recover the opening with the owner's key set.
    pub fn decrypt(&self, key_set: &KeySet) -> Result<PlainCoinV2> {
        let address = key_set.payment_address();
        let public_key = RistrettoPublic::try_from(&self.public_key)?;

        let (value, randomness, shared_secret) = match &self.tx_random {
            None => {
                if public_key != *address.spend_public_key() {
                    return Err(CryptoError::CoinNotOwned.into());
                }
                (self.amount, scalar_from_bytes(&self.randomness)?, None)
            }
            Some(tx_random) => {
                let tx_public_key = RistrettoPublic::try_from(&tx_random.tx_public_key)?;
                if !view_key_matches_output(
                    key_set.view_private_key(),
                    address.spend_public_key(),
                    &public_key,
                    &tx_public_key,
                    tx_random.index,
                ) {
                    return Err(CryptoError::CoinNotOwned.into());
                }
                let shared = create_shared_secret(&tx_public_key, key_set.view_private_key());
                let masked = scalar_from_bytes(&self.randomness)?;
                (
                    self.amount ^ amount_mask(&shared, tx_random.index),
                    masked - randomness_mask(&shared, tx_random.index),
                    Some(shared),
                )
            }
        };

        let gens = match &self.asset_tag {
            Some(tag) => asset_generators(&tag.decompress()?),
            None => generators(),
        };
        if CompressedCommitment::new(value, randomness, &gens) != self.commitment {
            return Err(CryptoError::CommitmentMismatch.into());
        }

        let spend_secret = match (&self.tx_random, key_set.spend_private_key()) {
            (Some(tx_random), Some(spend_private)) => {
                let tx_public_key = RistrettoPublic::try_from(&tx_random.tx_public_key)?;
                Some(recover_onetime_private_key(
                    &tx_public_key,
                    key_set.view_private_key(),
                    spend_private,
                    tx_random.index,
                ))
            }
            _ => None,
        };
        let key_image = spend_secret.as_ref().map(KeyImage::from);

        Ok(PlainCoinV2 {
            coin: self.clone(),
            value,
            randomness,
            shared_secret,
            spend_secret,
            key_image,
        })
    }
}

fn amount_mask(shared_secret: &RistrettoPublic, index: u32) -> u64 {
    let mask = hash_to_scalar(
        AMOUNT_MASK_DOMAIN_TAG,
        &[&shared_secret.to_bytes(), &index.to_le_bytes()],
    );
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&mask.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

fn randomness_mask(shared_secret: &RistrettoPublic, index: u32) -> Scalar {
    hash_to_scalar(
        RANDOMNESS_MASK_DOMAIN_TAG,
        &[&shared_secret.to_bytes(), &index.to_le_bytes()],
    )
}
