// Copyright (c) 2018-2025 The Botho Foundation

use crate::{domain_separators::METADATA_SCHNORR_CONTEXT, CryptoError, ProtocolError, Result};
use prv_crypto_keys::{
    serde_b64, CompressedRistrettoPublic, RistrettoPrivate, RistrettoPublic, RistrettoSignature,
};
use serde::{Deserialize, Serialize};

/// An opaque business payload carried by a transaction.
///
/// The engine never interprets `body`. When `signing_public_key` is set the
/// payload must be signed by that key over the transaction hash; the
/// signature itself is left out of the hash.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Metadata {
    /// Caller-defined payload kind.
    pub kind: u32,
    /// The payload.
    pub body: serde_json::Value,
    /// Key the payload must be signed with, if any.
    #[serde(default)]
    pub signing_public_key: Option<CompressedRistrettoPublic>,
    /// Schnorr signature over the transaction hash.
    #[serde(with = "serde_b64", default)]
    pub sig: Vec<u8>,
}

impl Metadata {
    /// An unsigned payload.
    pub fn new(kind: u32, body: serde_json::Value) -> Self {
        Self {
            kind,
            body,
            signing_public_key: None,
            sig: Vec::new(),
        }
    }

    /// Require a signature by `key`.
    pub fn signed_by(mut self, key: &RistrettoPublic) -> Self {
        self.signing_public_key = Some(CompressedRistrettoPublic::from(key));
        self
    }

    /// True if a signature is required.
    pub fn requires_signature(&self) -> bool {
        self.signing_public_key.is_some()
    }

    /// Sign `message` with `key`, which must match the declared signer.
    pub fn sign(&mut self, key: &RistrettoPrivate, message: &[u8; 32]) -> Result<()> {
        let expected = self
            .signing_public_key
            .ok_or(ProtocolError::MissingMetadataKey)?;
        if CompressedRistrettoPublic::from(&RistrettoPublic::from(key)) != expected {
            return Err(ProtocolError::MissingMetadataKey.into());
        }
        self.sig = key
            .sign_schnorrkel(METADATA_SCHNORR_CONTEXT, message)
            .to_bytes()
            .to_vec();
        Ok(())
    }

    /// Check the signature over `message`, if one is required.
    pub fn verify(&self, message: &[u8; 32]) -> Result<()> {
        let Some(signer) = self.signing_public_key.as_ref() else {
            return Ok(());
        };
        let signer = RistrettoPublic::try_from(signer)?;
        let sig = RistrettoSignature::try_from(&self.sig[..])
            .map_err(|_| CryptoError::InvalidSignature)?;
        signer
            .verify_schnorrkel(METADATA_SCHNORR_CONTEXT, message, &sig)
            .map_err(|_| CryptoError::InvalidSignature.into())
    }
}
