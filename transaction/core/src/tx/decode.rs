// Copyright (c) 2018-2025 The Botho Foundation

use super::{Tx, TxHash, TxToken, TxType};
use crate::{
    constants::{TX_VERSION_1, TX_VERSION_2},
    ProtocolError, Result,
};
use prv_crypto_ring_signature::KeyImage;
use serde::Deserialize;

/// The fields read before dispatching on the transaction kind.
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Header {
    version: u8,
    #[serde(rename = "Type")]
    tx_type: String,
}

/// Any decodable transaction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AnyTx {
    /// A payment or conversion.
    Tx(Tx),
    /// A token transaction.
    Token(TxToken),
}

impl AnyTx {
    /// The canonical id.
    pub fn hash(&self) -> Result<TxHash> {
        match self {
            Self::Tx(tx) => tx.hash(),
            Self::Token(tx) => tx.hash(),
        }
    }

    /// Serialize to wire bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::Tx(tx) => tx.to_bytes(),
            Self::Token(tx) => tx.to_bytes(),
        }
    }

    /// Key images published by the ring signatures.
    pub fn key_images(&self) -> Result<Vec<KeyImage>> {
        match self {
            Self::Tx(tx) => tx.key_images(),
            Self::Token(tx) => tx.key_images(),
        }
    }
}

/// Decode wire bytes, reading `Version` and `Type` first.
pub fn decode_tx(bytes: &[u8]) -> Result<AnyTx> {
    let header: Header = serde_json::from_slice(bytes)?;
    if header.version != TX_VERSION_1 && header.version != TX_VERSION_2 {
        return Err(ProtocolError::UnsupportedVersion(header.version).into());
    }
    let tx_type: TxType = header.tx_type.parse()?;
    tracing::trace!(version = header.version, %tx_type, "decoding transaction");
    if tx_type.is_token() {
        let tx: TxToken = serde_json::from_slice(bytes)?;
        if tx.fee_tx.version != tx.token_tx.version {
            return Err(ProtocolError::VersionMismatch {
                fee: tx.fee_tx.version,
                token: tx.token_tx.version,
            }
            .into());
        }
        Ok(AnyTx::Token(tx))
    } else {
        Ok(AnyTx::Tx(Tx::from_bytes(bytes)?))
    }
}
