// Copyright (c) 2018-2025 The Botho Foundation

//! Protocol parameters used when building and validating transactions.

use crate::{
    constants::{
        DEFAULT_BURN_ADDRESS_SEED, DEFAULT_RING_SIZE, MAX_INPUTS, MAX_PAYMENT_INFOS,
        MAX_SHARD_MATCH_ATTEMPTS, MAX_TX_SIZE,
    },
    Error, Result, SerializationError, ValidationError,
};
use prv_account_keys::{burn_address_from_seed, PublicAddress, DEFAULT_NUM_SHARDS};
use prv_crypto_ring_signature::MAX_DIMENSION;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Network-wide protocol parameters.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Rows per ring, real row included.
    #[serde(default = "default_ring_size")]
    pub ring_size: usize,

    /// Maximum inputs per transaction.
    #[serde(default = "default_max_inputs")]
    pub max_inputs: usize,

    /// Maximum payment infos per transaction.
    #[serde(default = "default_max_payment_infos")]
    pub max_payment_infos: usize,

    /// Maximum serialized transaction size in bytes.
    #[serde(default = "default_max_tx_size")]
    pub max_tx_size: usize,

    /// Number of shards coins are routed across.
    #[serde(default = "default_num_shards")]
    pub num_shards: u8,

    /// Seed of the burn address.
    #[serde(default = "default_burn_address_seed")]
    pub burn_address_seed: String,

    /// Tx keys tried per output before shard routing gives up.
    #[serde(default = "default_max_shard_match_attempts")]
    pub max_shard_match_attempts: usize,
}

fn default_ring_size() -> usize {
    DEFAULT_RING_SIZE
}

fn default_max_inputs() -> usize {
    MAX_INPUTS
}

fn default_max_payment_infos() -> usize {
    MAX_PAYMENT_INFOS
}

fn default_max_tx_size() -> usize {
    MAX_TX_SIZE
}

fn default_num_shards() -> u8 {
    DEFAULT_NUM_SHARDS
}

fn default_burn_address_seed() -> String {
    DEFAULT_BURN_ADDRESS_SEED.to_string()
}

fn default_max_shard_match_attempts() -> usize {
    MAX_SHARD_MATCH_ATTEMPTS
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            ring_size: default_ring_size(),
            max_inputs: default_max_inputs(),
            max_payment_infos: default_max_payment_infos(),
            max_tx_size: default_max_tx_size(),
            num_shards: default_num_shards(),
            burn_address_seed: default_burn_address_seed(),
            max_shard_match_attempts: default_max_shard_match_attempts(),
        }
    }
}

impl ProtocolConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| SerializationError::Toml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| SerializationError::Io(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| SerializationError::Toml(e.to_string()).into())
    }

    /// Check the parameters are usable.
    pub fn validate(&self) -> Result<()> {
        if self.ring_size == 0 || self.ring_size > MAX_DIMENSION {
            return Err(ValidationError::InvalidRingSize(self.ring_size).into());
        }
        if self.max_inputs == 0 || self.max_inputs > MAX_INPUTS {
            return Err(invalid(format!("max_inputs must be in 1..={MAX_INPUTS}")));
        }
        if self.max_payment_infos == 0 || self.max_payment_infos > MAX_PAYMENT_INFOS {
            return Err(invalid(format!(
                "max_payment_infos must be in 1..={MAX_PAYMENT_INFOS}"
            )));
        }
        if self.num_shards == 0 {
            return Err(invalid("num_shards must be positive".to_string()));
        }
        if self.max_shard_match_attempts == 0 {
            return Err(invalid("max_shard_match_attempts must be positive".to_string()));
        }
        Ok(())
    }

    /// The burn address derived from the configured seed.
    pub fn burn_address(&self) -> PublicAddress {
        burn_address_from_seed(&self.burn_address_seed)
    }

    /// True if `address` is this network's burn address.
    pub fn is_burn_address(&self, address: &PublicAddress) -> bool {
        *address == self.burn_address()
    }
}

fn invalid(msg: String) -> Error {
    ValidationError::InvalidConfig(msg).into()
}
