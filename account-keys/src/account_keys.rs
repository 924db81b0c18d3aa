// Copyright (c) 2018-2025 The Botho Foundation

//! Account keys.
//!
//! An account is a pair of private keys (a, b) used for identifying owned
//! coins and spending them, respectively. Senders only ever see the public
//! address (A, B). Version 2 coins are sent to one-time keys derived from the
//! address, version 1 coins are locked to `B` directly.

use crate::{shard_id_from_last_byte, Error, ShardId};
use core::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};
use prv_crypto_keys::{FromRandom, RistrettoPrivate, RistrettoPublic};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

/// A user's public payment address.
#[derive(Clone, Copy, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct PublicAddress {
    /// The public spend key `B`.
    spend_public_key: RistrettoPublic,

    /// The public view key `A`.
    view_public_key: RistrettoPublic,
}

impl fmt::Display for PublicAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PRV")?;
        for byte in self.to_bytes().iter() {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for PublicAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PublicAddress({self})")
    }
}

impl PublicAddress {
    /// Create a new public address.
    ///
    /// # Arguments
    /// `spend_public_key` - The user's public spend key `B`,
    /// `view_public_key` - The user's public view key `A`,
    #[inline]
    pub fn new(spend_public_key: &RistrettoPublic, view_public_key: &RistrettoPublic) -> Self {
        Self {
            spend_public_key: *spend_public_key,
            view_public_key: *view_public_key,
        }
    }

    /// Get the public view key.
    pub fn view_public_key(&self) -> &RistrettoPublic {
        &self.view_public_key
    }

    /// Get the public spend key.
    pub fn spend_public_key(&self) -> &RistrettoPublic {
        &self.spend_public_key
    }

    /// The shard this address's version 1 coins live on. Version 2 coins are
    /// routed to the same shard through their one-time keys.
    pub fn shard_id(&self, num_shards: u8) -> ShardId {
        shard_id_from_last_byte(self.spend_public_key.to_bytes()[31], num_shards)
    }

    /// `spend ‖ view`, 64 bytes.
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.spend_public_key.to_bytes());
        out[32..].copy_from_slice(&self.view_public_key.to_bytes());
        out
    }
}

impl TryFrom<&[u8]> for PublicAddress {
    type Error = Error;

    fn try_from(src: &[u8]) -> Result<Self, Error> {
        if src.len() != 64 {
            return Err(Error::AddressLength(src.len()));
        }
        let spend_public_key = RistrettoPublic::try_from(&src[..32])?;
        let view_public_key = RistrettoPublic::try_from(&src[32..])?;
        Ok(Self {
            spend_public_key,
            view_public_key,
        })
    }
}

impl Ord for PublicAddress {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_bytes().cmp(&other.to_bytes())
    }
}

impl PartialOrd for PublicAddress {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Complete AccountKey.
///
/// Containing the pair of secret keys, which can be used
/// for spending. This should only ever be present in client code.
#[derive(Clone)]
pub struct AccountKey {
    /// Private key `a` used for view-key matching.
    view_private_key: RistrettoPrivate,

    /// Private key `b` used for spending.
    spend_private_key: RistrettoPrivate,
}

// Note: Hash, Ord is implemented in terms of public_address() because
// we don't want comparisons to leak private key details over side-channels.
impl Hash for AccountKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.public_address().hash(state)
    }
}

impl Eq for AccountKey {}

impl PartialEq for AccountKey {
    fn eq(&self, other: &Self) -> bool {
        self.public_address().eq(&other.public_address())
    }
}

impl PartialOrd for AccountKey {
    fn partial_cmp(&self, other: &AccountKey) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AccountKey {
    fn cmp(&self, other: &AccountKey) -> Ordering {
        self.public_address().cmp(&other.public_address())
    }
}

impl fmt::Debug for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "AccountKey({})", self.public_address())
    }
}

impl AccountKey {
    /// A user's AccountKey.
    ///
    /// # Arguments
    /// * `spend_private_key` - The user's private spend key `b`.
    /// * `view_private_key` - The user's private view key `a`.
    #[inline]
    pub fn new(spend_private_key: &RistrettoPrivate, view_private_key: &RistrettoPrivate) -> Self {
        Self {
            spend_private_key: spend_private_key.clone(),
            view_private_key: view_private_key.clone(),
        }
    }

    /// Get the view private key.
    pub fn view_private_key(&self) -> &RistrettoPrivate {
        &self.view_private_key
    }

    /// Get the spend private key.
    pub fn spend_private_key(&self) -> &RistrettoPrivate {
        &self.spend_private_key
    }

    /// Create an account key with random secret keys (intended for tests).
    pub fn random<T: RngCore + CryptoRng>(rng: &mut T) -> Self {
        Self::new(
            &RistrettoPrivate::from_random(rng),
            &RistrettoPrivate::from_random(rng),
        )
    }

    /// The account's public payment address.
    pub fn public_address(&self) -> PublicAddress {
        PublicAddress::new(
            &RistrettoPublic::from(&self.spend_private_key),
            &RistrettoPublic::from(&self.view_private_key),
        )
    }

    /// A spending key set for this account.
    pub fn key_set(&self) -> KeySet {
        KeySet {
            payment_address: self.public_address(),
            view_private_key: self.view_private_key.clone(),
            spend_private_key: Some(self.spend_private_key.clone()),
        }
    }
}

/// The keys a wallet holds for one account: enough to recognise and open
/// incoming coins, and optionally to spend them.
#[derive(Clone)]
pub struct KeySet {
    payment_address: PublicAddress,
    view_private_key: RistrettoPrivate,
    spend_private_key: Option<RistrettoPrivate>,
}

impl fmt::Debug for KeySet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("KeySet")
            .field("payment_address", &self.payment_address)
            .field("can_spend", &self.spend_private_key.is_some())
            .finish()
    }
}

impl KeySet {
    /// A view-only key set: can scan and decrypt, cannot sign.
    pub fn view_only(view_private_key: RistrettoPrivate, spend_public_key: RistrettoPublic) -> Self {
        let view_public = RistrettoPublic::from(&view_private_key);
        Self {
            payment_address: PublicAddress::new(&spend_public_key, &view_public),
            view_private_key,
            spend_private_key: None,
        }
    }

    /// The account's payment address.
    pub fn payment_address(&self) -> &PublicAddress {
        &self.payment_address
    }

    /// The private view key `a`.
    pub fn view_private_key(&self) -> &RistrettoPrivate {
        &self.view_private_key
    }

    /// The private spend key `b`, if this key set can spend.
    pub fn spend_private_key(&self) -> Option<&RistrettoPrivate> {
        self.spend_private_key.as_ref()
    }

    /// The private spend key, or `Error::ViewOnly`.
    pub fn require_spend_private_key(&self) -> Result<&RistrettoPrivate, Error> {
        self.spend_private_key.as_ref().ok_or(Error::ViewOnly)
    }
}

impl From<&AccountKey> for KeySet {
    fn from(account: &AccountKey) -> Self {
        account.key_set()
    }
}
