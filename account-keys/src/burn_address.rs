// Copyright (c) 2018-2025 The Botho Foundation

//! The burn address. Nobody knows the discrete log of its spend key, so coins
//! sent to it are provably unspendable.

use crate::{
    domain_separators::{BURN_ADDRESS_DOMAIN_SEPARATOR, BURN_ADDRESS_VIEW_DOMAIN_SEPARATOR},
    PublicAddress,
};
use blake2::{Blake2b512, Digest};
use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar};
use prv_crypto_keys::{RistrettoPrivate, RistrettoPublic};

/// The spend public key of the burn address derived from `seed`.
pub fn burn_spend_public(seed: &str) -> RistrettoPublic {
    let mut hasher = Blake2b512::new();
    hasher.update(seed.as_bytes());
    RistrettoPublic::from(RistrettoPoint::from_hash(hasher))
}

/// The burn address for a custom seed.
///
/// The view key is public knowledge so anyone can audit burned amounts.
pub fn burn_address_from_seed(seed: &str) -> PublicAddress {
    let mut hasher = Blake2b512::new();
    hasher.update(BURN_ADDRESS_VIEW_DOMAIN_SEPARATOR.as_bytes());
    hasher.update(seed.as_bytes());
    let view_private = RistrettoPrivate::from(Scalar::from_hash(hasher));
    PublicAddress::new(
        &burn_spend_public(seed),
        &RistrettoPublic::from(&view_private),
    )
}

/// The network burn address.
pub fn burn_address() -> PublicAddress {
    burn_address_from_seed(BURN_ADDRESS_DOMAIN_SEPARATOR)
}

/// True if `address` spends to the network burn key.
pub fn is_burn_address(address: &PublicAddress) -> bool {
    address.spend_public_key() == &burn_spend_public(BURN_ADDRESS_DOMAIN_SEPARATOR)
}
