// Copyright (c) 2018-2025 The Botho Foundation

//! Privacy transaction data types: coins, confidential-asset tags, range
//! proofs, ring assembly, the transaction wire format and local validation.

#![deny(missing_docs)]
#![allow(non_snake_case)]

pub mod coin;
pub mod constants;
pub mod domain_separators;
pub mod range_proofs;
pub mod ring_ct;
pub mod tx;
pub mod validation;

mod config;
mod error;
mod payment_info;
mod token;

pub use crate::{
    coin::{Coin, CoinBase, CoinVersion, PlainCoin, Spendable},
    config::ProtocolConfig,
    error::{CryptoError, Error, ProtocolError, Result, SerializationError, ValidationError},
    payment_info::{total_amount, PaymentInfo},
    token::{tokens, Token, TokenId},
};

/// Re-export of the ring signature crate.
pub mod ring_signature {
    pub use prv_crypto_ring_signature::*;
}

pub use prv_account_keys::{AccountKey, KeySet, PublicAddress};
