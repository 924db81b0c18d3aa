// Copyright (c) 2018-2025 The Botho Foundation

//! Confidential-asset tags and the cache mapping tags back to tokens.

use super::PlainCoinV2;
use crate::{domain_separators::ASSET_BLINDER_DOMAIN_TAG, ProtocolError, Result, TokenId};
use prv_crypto_keys::{serde_b64, RistrettoPublic};
use prv_crypto_ring_signature::{
    hash_to_scalar, CompressedRistretto, RistrettoPoint, Scalar, B_BLINDING,
};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use std::{collections::HashMap, fmt};

/// A compressed asset tag, `AssetGen(t)` or `AssetGen(t) + bl*B_BLINDING`.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct AssetTag {
    /// The compressed tag point.
    pub point: CompressedRistretto,
}

impl AssetTag {
    /// Decompress the tag.
    pub fn decompress(&self) -> Result<RistrettoPoint> {
        self.point
            .decompress()
            .ok_or_else(|| crate::CryptoError::InvalidPoint.into())
    }

    /// The raw compressed bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.point.as_bytes()
    }
}

impl From<&RistrettoPoint> for AssetTag {
    fn from(point: &RistrettoPoint) -> Self {
        Self {
            point: point.compress(),
        }
    }
}

impl fmt::Debug for AssetTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "AssetTag({})", hex::encode(self.point.as_bytes()))
    }
}

impl Serialize for AssetTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serde_b64::serialize(self.point.as_bytes(), serializer)
    }
}

impl<'de> Deserialize<'de> for AssetTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let bytes = serde_b64::deserialize(deserializer)?;
        let point = CompressedRistretto::from_slice(&bytes).map_err(D::Error::custom)?;
        Ok(Self { point })
    }
}

/// The blinder of output `index`'s asset tag, derived from the shared secret.
pub fn asset_tag_blinder(shared_secret: &RistrettoPublic, index: u32) -> Scalar {
    hash_to_scalar(
        ASSET_BLINDER_DOMAIN_TAG,
        &[&shared_secret.to_bytes(), &index.to_le_bytes()],
    )
}

/// Caches the raw (unblinded) asset tag of every known token, in both
/// directions.
///
/// The caller builds it from the chain's token list and refreshes it when
/// that list changes. Lookups never mutate, so a cache can be shared behind
/// an `Arc` by concurrent builders.
#[derive(Clone, Debug, Default)]
pub struct AssetTagCache {
    by_token: HashMap<TokenId, RistrettoPoint>,
    by_tag: HashMap<CompressedRistretto, TokenId>,
}

impl AssetTagCache {
    /// A cache holding only the native coin.
    pub fn new() -> Self {
        Self::with_tokens(core::iter::empty())
    }

    /// A cache holding the native coin and `tokens`.
    pub fn with_tokens(tokens: impl IntoIterator<Item = TokenId>) -> Self {
        let mut cache = Self::default();
        cache.refresh(tokens);
        cache
    }

    /// Replace the contents with the native coin and `tokens`.
    pub fn refresh(&mut self, tokens: impl IntoIterator<Item = TokenId>) {
        self.by_token.clear();
        self.by_tag.clear();
        self.insert(TokenId::NATIVE);
        for token in tokens {
            self.insert(token);
        }
        tracing::debug!(tokens = self.by_token.len(), "asset tag cache refreshed");
    }

    /// Add one token.
    pub fn insert(&mut self, token: TokenId) {
        let tag = token.asset_generator();
        self.by_tag.insert(tag.compress(), token);
        self.by_token.insert(token, tag);
    }

    /// Number of cached tokens.
    pub fn len(&self) -> usize {
        self.by_token.len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.by_token.is_empty()
    }

    /// True if `token` is cached.
    pub fn contains(&self, token: &TokenId) -> bool {
        self.by_token.contains_key(token)
    }

    /// The raw asset tag of `token`.
    pub fn raw_tag(&self, token: &TokenId) -> Result<RistrettoPoint> {
        self.by_token
            .get(token)
            .copied()
            .ok_or_else(|| ProtocolError::UnknownToken.into())
    }

    /// Recover which token a received confidential-asset coin carries.
    ///
    /// Unblinded tags match a raw tag directly. Blinded tags are unblinded
    /// with the blinder derived from the coin's shared secret first.
    pub fn identify(&self, coin: &PlainCoinV2) -> Result<TokenId> {
        let tag = coin
            .coin
            .asset_tag
            .as_ref()
            .ok_or(ProtocolError::TokenMismatch)?;
        if let Some(token) = self.by_tag.get(&tag.point) {
            return Ok(*token);
        }
        let (shared_secret, index) = coin
            .shared_secret
            .as_ref()
            .zip(coin.coin.tx_random.as_ref().map(|t| t.index))
            .ok_or(ProtocolError::UnknownToken)?;
        let unblinded =
            tag.decompress()? - asset_tag_blinder(shared_secret, index) * *B_BLINDING;
        self.by_tag
            .get(&unblinded.compress())
            .copied()
            .ok_or_else(|| ProtocolError::UnknownToken.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        coin::{decrypt, new_output_coin, Coin, PlainCoin},
        Error, PaymentInfo, ProtocolConfig,
    };
    use assert_matches::assert_matches;
    use prv_account_keys::AccountKey;
    use rand::{rngs::StdRng, SeedableRng};

    fn received_coin(token: &TokenId, rng: &mut StdRng) -> PlainCoinV2 {
        let account = AccountKey::random(rng);
        let info = PaymentInfo::new(account.public_address(), 42);
        let output =
            new_output_coin(&info, 0, Some(token), &ProtocolConfig::default(), rng).unwrap();
        match decrypt(&Coin::V2(output.coin), &account.key_set()).unwrap() {
            PlainCoin::V2(coin) => coin,
            PlainCoin::V1(_) => unreachable!(),
        }
    }

    #[test]
    fn test_identify_blinded_and_unblinded() {
        let mut rng: StdRng = SeedableRng::from_seed([7u8; 32]);
        let token = TokenId::new([3u8; 32]);
        let cache = AssetTagCache::with_tokens([token]);
        assert_eq!(cache.len(), 2);

        let blinded = received_coin(&token, &mut rng);
        assert_eq!(cache.identify(&blinded).unwrap(), token);

        let native = received_coin(&TokenId::NATIVE, &mut rng);
        assert_eq!(cache.identify(&native).unwrap(), TokenId::NATIVE);
    }

    #[test]
    fn test_unknown_token_until_refreshed() {
        let mut rng: StdRng = SeedableRng::from_seed([8u8; 32]);
        let token = TokenId::new([4u8; 32]);
        let mut cache = AssetTagCache::new();
        let coin = received_coin(&token, &mut rng);

        assert_matches!(
            cache.identify(&coin),
            Err(Error::Protocol(ProtocolError::UnknownToken))
        );
        assert_matches!(
            cache.raw_tag(&token),
            Err(Error::Protocol(ProtocolError::UnknownToken))
        );

        cache.refresh([token]);
        assert!(cache.contains(&token));
        assert_eq!(cache.identify(&coin).unwrap(), token);
        assert_eq!(cache.raw_tag(&token).unwrap(), token.asset_generator());
    }

    #[test]
    fn test_asset_tag_serde() {
        let tag = AssetTag::from(&TokenId::NATIVE.asset_generator());
        let json = serde_json::to_string(&tag).unwrap();
        let back: AssetTag = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tag);
    }
}
