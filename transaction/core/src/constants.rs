// Copyright (c) 2018-2025 The Botho Foundation

//! Protocol constants.

/// Maximum number of input coins a transaction may spend.
pub const MAX_INPUTS: usize = 255;

/// Maximum number of payment infos (outputs before change) per transaction.
pub const MAX_PAYMENT_INFOS: usize = 254;

/// Default number of rows in every ring, real row included.
pub const DEFAULT_RING_SIZE: usize = 8;

/// Maximum size in bytes of a serialized transaction.
pub const MAX_TX_SIZE: usize = 100 * 1024;

/// Maximum length of the free-form `Info` field, and of a payment message.
pub const MAX_INFO_LEN: usize = 512;

/// Tx keys tried per output before giving up on shard routing.
pub const MAX_SHARD_MATCH_ATTEMPTS: usize = 4096;

/// Wire version of legacy transactions.
pub const TX_VERSION_1: u8 = 1;

/// Wire version of one-time-address transactions.
pub const TX_VERSION_2: u8 = 2;

/// Seed of the network's burn address.
pub const DEFAULT_BURN_ADDRESS_SEED: &str = "prv_burn_address_spend_public";

/// Bit width of range-proved values.
pub const RANGE_PROOF_BITS: usize = 64;
