// Copyright (c) 2018-2025 The Botho Foundation

//! Token transactions: a native-coin fee transaction paired with a token
//! transaction, both signing the parent hash.

use super::{hash_parts, Tx, TxHash, TxType};
use crate::{domain_separators::TOKEN_TX_HASH_DOMAIN_TAG, ProtocolError, Result, TokenId};
use prv_crypto_ring_signature::KeyImage;
use serde::{Deserialize, Serialize};

/// Whether a token transaction mints or moves a token.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum TokenType {
    /// Creates a token with a caller-chosen id.
    Init,
    /// Moves an existing token.
    Transfer,
}

/// Token fields of a token transaction.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TokenData {
    /// Token id; the confidential-asset umbrella id on v2 transactions.
    #[serde(rename = "PropertyID")]
    pub property_id: TokenId,
    /// Display name.
    pub property_name: String,
    /// Ticker.
    pub property_symbol: String,
    /// Init or transfer.
    #[serde(rename = "Type")]
    pub token_type: TokenType,
    /// Whether more can be minted later.
    pub mintable: bool,
    /// Amount minted by an init; zero on transfers.
    pub amount: u64,
}

/// `H(tag ‖ fee_hash ‖ token_hash ‖ token_data)`, the message both
/// sub-transactions sign.
pub fn token_parent_hash(
    fee_hash: &TxHash,
    token_hash: &TxHash,
    token_data: &TokenData,
) -> Result<TxHash> {
    let data = serde_json::to_vec(token_data)?;
    Ok(hash_parts(&[TOKEN_TX_HASH_DOMAIN_TAG, fee_hash, token_hash, &data]))
}

/// A token transaction.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TxToken {
    /// Shared version of both sub-transactions.
    pub version: u8,
    /// [`TxType::TokenTransfer`] or [`TxType::TokenConversion`].
    #[serde(rename = "Type")]
    pub tx_type: TxType,
    /// Pays the fee in native coin.
    pub fee_tx: Tx,
    /// Moves the token.
    pub token_tx: Tx,
    /// Token fields.
    pub token_data: TokenData,
}

impl TxToken {
    /// Pair `fee_tx` with `token_tx`; both must carry the same version.
    pub fn new(tx_type: TxType, fee_tx: Tx, token_tx: Tx, token_data: TokenData) -> Result<Self> {
        if !tx_type.is_token() {
            return Err(ProtocolError::UnknownTxType(tx_type.to_string()).into());
        }
        if fee_tx.version != token_tx.version {
            return Err(ProtocolError::VersionMismatch {
                fee: fee_tx.version,
                token: token_tx.version,
            }
            .into());
        }
        Ok(Self {
            version: fee_tx.version,
            tx_type,
            fee_tx,
            token_tx,
            token_data,
        })
    }

    /// The parent hash, the canonical id of the pair.
    pub fn hash(&self) -> Result<TxHash> {
        token_parent_hash(&self.fee_tx.hash()?, &self.token_tx.hash()?, &self.token_data)
    }

    /// The token id as published.
    pub fn token_id(&self) -> &TokenId {
        &self.token_data.property_id
    }

    /// The fee, paid by the fee transaction.
    pub fn fee(&self) -> u64 {
        self.fee_tx.fee
    }

    /// The lock time of the fee transaction.
    pub fn lock_time(&self) -> i64 {
        self.fee_tx.lock_time
    }

    /// Key images of both sub-transactions.
    pub fn key_images(&self) -> Result<Vec<KeyImage>> {
        let mut images = self.fee_tx.key_images()?;
        images.extend(self.token_tx.key_images()?);
        Ok(images)
    }

    /// Serialize to wire bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}
