// Copyright (c) 2018-2025 The Botho Foundation

//! Domain separation tags for hashes used by coins and transactions.

/// Mask applied to a v2 coin's amount.
pub const AMOUNT_MASK_DOMAIN_TAG: &[u8] = b"prv_amount_mask";

/// Mask applied to a v2 coin's commitment randomness.
pub const RANDOMNESS_MASK_DOMAIN_TAG: &[u8] = b"prv_randomness_mask";

/// Blinder of a confidential-asset tag.
pub const ASSET_BLINDER_DOMAIN_TAG: &[u8] = b"prv_asset_blinder";

/// Offset from a v1 owner key to the coin's spend point.
pub const SERIAL_NUMBER_DOMAIN_TAG: &[u8] = b"prv_serial_number_derivator";

/// Encryption of v1 coin openings to the owner's view key.
pub const V1_AMOUNT_MASK_DOMAIN_TAG: &[u8] = b"prv_v1_amount_mask";

/// Encryption of v1 coin randomness to the owner's view key.
pub const V1_RANDOMNESS_MASK_DOMAIN_TAG: &[u8] = b"prv_v1_randomness_mask";

/// Merlin transcript label for range proofs.
pub const RANGE_PROOF_DOMAIN_TAG: &[u8] = b"prv_range_proof";

/// Parent hash of a token transaction.
pub const TOKEN_TX_HASH_DOMAIN_TAG: &[u8] = b"prv_token_tx_hash";

/// Schnorr signing context for non-ring transaction signatures.
pub const TX_SCHNORR_CONTEXT: &[u8] = b"prv_tx_schnorr";

/// Schnorr signing context for metadata signatures.
pub const METADATA_SCHNORR_CONTEXT: &[u8] = b"prv_metadata_schnorr";
