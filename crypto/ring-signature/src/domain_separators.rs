// Copyright (c) 2018-2025 The Botho Foundation

//! Domain separation tags for hash functions used in the ring signature
//! crate. Every hash-to-curve and hash-to-scalar call prefixes one of these.

/// Domain separator for hashing a public key to a curve point, `Hp(P)`.
pub const HASH_TO_POINT_DOMAIN_TAG: &[u8] = b"prv_hash_to_point";

/// Domain separator for the generic hash-to-scalar function `Hs`.
pub const HASH_TO_SCALAR_DOMAIN_TAG: &[u8] = b"prv_hash_to_scalar";

/// Domain separator for the Pedersen value generator.
pub const VALUE_GENERATOR_DOMAIN_TAG: &[u8] = b"prv_value_generator";

/// Domain separator for the Pedersen blinding generator.
pub const BLINDING_GENERATOR_DOMAIN_TAG: &[u8] = b"prv_blinding_generator";

/// Domain separator for per-token asset generators.
pub const ASSET_TAG_DOMAIN_TAG: &[u8] = b"prv_asset_tag";

/// Domain separator for one-time key derivation scalars.
pub const ONETIME_KEY_DOMAIN_TAG: &[u8] = b"prv_onetime_key";

/// Domain separator for the MLSAG round hash.
pub const MLSAG_ROUND_HASH_DOMAIN_TAG: &[u8] = b"prv_mlsag_round_hash";

/// Domain separator for the confidential-asset MLSAG round hash.
pub const MLSAG_CA_ROUND_HASH_DOMAIN_TAG: &[u8] = b"prv_mlsag_ca_round_hash";
