// Copyright (c) 2018-2025 The Botho Foundation

//! Local verification of transactions: signatures, range proofs, balance and
//! ring reconstruction from published chain indexes.

mod validate;

pub use self::validate::{
    validate, validate_key_images_are_unique, validate_number_of_inputs,
    validate_number_of_outputs, validate_open_balance, validate_outputs_public_keys_are_unique,
    validate_per_input_signatures, validate_range_proofs, validate_revealed_inputs,
    validate_ring_signature, validate_schnorr_signature, validate_token_key_images_are_unique,
    validate_tx, validate_tx_token, RingMemberSource,
};
