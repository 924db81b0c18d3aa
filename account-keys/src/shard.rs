// Copyright (c) 2018-2025 The Botho Foundation

//! Shard routing. A coin lives on the shard selected by the last byte of its
//! public key.

/// Index of a shard.
pub type ShardId = u8;

/// Number of shards on the network unless configured otherwise.
pub const DEFAULT_NUM_SHARDS: u8 = 8;

/// Map a public key's last byte to the shard that stores it.
///
/// A shard count of zero is treated as a single shard.
pub fn shard_id_from_last_byte(last_byte: u8, num_shards: u8) -> ShardId {
    if num_shards == 0 {
        return 0;
    }
    last_byte % num_shards
}
