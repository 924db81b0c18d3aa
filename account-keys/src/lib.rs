// Copyright (c) 2018-2025 The Botho Foundation

#![deny(missing_docs)]
#![deny(unsafe_code)]

//! This crate defines account key structures: private account keys, public
//! payment addresses, key sets used to scan and spend coins, and the shard
//! routing rule derived from a public key's last byte.

mod account_keys;
mod burn_address;
mod domain_separators;
mod error;
mod shard;

pub use crate::{
    account_keys::{AccountKey, KeySet, PublicAddress},
    burn_address::{burn_address, burn_address_from_seed, burn_spend_public, is_burn_address},
    error::{Error, Result},
    shard::{shard_id_from_last_byte, ShardId, DEFAULT_NUM_SHARDS},
};
