// Copyright (c) 2018-2025 The Botho Foundation

//! Construction of privacy transactions: parameter objects, coin selection,
//! decoy preparation, the payment, token and conversion pipelines, and a
//! batch runner for consolidating coins.

#![deny(missing_docs)]

mod consolidation;
mod conversion;
mod decoys;
mod error;
mod params;
mod token_builder;
mod transaction_builder;
mod utxo_selection;

pub mod test_utils;

pub use crate::{
    consolidation::{
        consolidation_params, plan_consolidation, split_into_batches, BatchReport, BatchRunner,
        ConsolidationConfig, TxBroadcaster,
    },
    decoys::{prepare_decoys, DecoyEntry, DecoyProvider, DecoySet, RingParams},
    error::ConsolidationError,
    params::{
        common_version, total_input, ConversionParams, InputCoin, TokenConversionParams,
        TokenParam, TxPrivacyInitParams, TxTokenParams,
    },
    transaction_builder::{BuiltTx, TransactionBuilder},
    utxo_selection::{choose_best_coins_by_amount, choose_best_indexes, divide_coins, select_coins},
};
