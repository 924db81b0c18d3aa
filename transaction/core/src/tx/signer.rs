// Copyright (c) 2018-2025 The Botho Foundation

//! The last step of construction: a populated transaction waiting for its
//! signature.

use super::{encode_signature_list, Tx, TxHash};
use crate::{domain_separators::TX_SCHNORR_CONTEXT, ProtocolError, Result};
use prv_crypto_keys::RistrettoPrivate;
use prv_crypto_ring_signature::{KeyImage, SignableRing};
use rand_core::{CryptoRng, RngCore};

/// What will produce the transaction's `Sig`.
pub enum TxSigner {
    /// Schnorr signature by this key.
    Schnorr(RistrettoPrivate),
    /// One ring over all inputs.
    Mlsag(SignableRing),
    /// One ring per input.
    MlsagPerInput(Vec<SignableRing>),
}

impl TxSigner {
    /// Key images the signature will publish.
    pub fn key_images(&self) -> Vec<KeyImage> {
        match self {
            Self::Schnorr(_) => Vec::new(),
            Self::Mlsag(ring) => ring.key_images(),
            Self::MlsagPerInput(rings) => rings.iter().flat_map(SignableRing::key_images).collect(),
        }
    }
}

/// A transaction with everything but its signatures.
///
/// Signing consumes it, so a ring's secrets are used for exactly one
/// signature.
pub struct UnsignedTx {
    tx: Tx,
    signer: TxSigner,
    metadata_key: Option<RistrettoPrivate>,
}

impl UnsignedTx {
    /// Pair `tx` with its signer.
    pub fn new(tx: Tx, signer: TxSigner) -> Self {
        Self {
            tx,
            signer,
            metadata_key: None,
        }
    }

    /// The key that signs the transaction's metadata.
    pub fn with_metadata_key(mut self, key: RistrettoPrivate) -> Self {
        self.metadata_key = Some(key);
        self
    }

    /// The unsigned transaction.
    pub fn tx(&self) -> &Tx {
        &self.tx
    }

    /// The signer.
    pub fn signer(&self) -> &TxSigner {
        &self.signer
    }

    /// The transaction hash, the same before and after signing.
    pub fn hash(&self) -> Result<TxHash> {
        self.tx.hash()
    }

    /// Sign over the transaction's own hash.
    pub fn sign<R: CryptoRng + RngCore>(self, rng: &mut R) -> Result<Tx> {
        let message = self.hash()?;
        self.sign_message(&message, rng)
    }

    /// Sign over `message`: the transaction's own hash, or the parent hash
    /// of a token transaction.
    pub fn sign_message<R: CryptoRng + RngCore>(
        self,
        message: &TxHash,
        rng: &mut R,
    ) -> Result<Tx> {
        let Self {
            mut tx,
            signer,
            metadata_key,
        } = self;

        if let Some(metadata) = tx.metadata.as_mut() {
            if metadata.requires_signature() {
                let key = metadata_key
                    .as_ref()
                    .ok_or(ProtocolError::MissingMetadataKey)?;
                metadata.sign(key, message)?;
            }
        }

        tx.sig = match signer {
            TxSigner::Schnorr(key) => key
                .sign_schnorrkel(TX_SCHNORR_CONTEXT, message)
                .to_bytes()
                .to_vec(),
            TxSigner::Mlsag(ring) => ring.sign(message, rng)?.to_bytes()?,
            TxSigner::MlsagPerInput(rings) => {
                let signatures = rings
                    .into_iter()
                    .map(|ring| Ok(ring.sign(message, rng)?.to_bytes()?))
                    .collect::<Result<Vec<_>>>()?;
                encode_signature_list(&signatures)?
            }
        };
        tracing::debug!(
            version = tx.version,
            tx_type = %tx.tx_type,
            sig_len = tx.sig.len(),
            "transaction signed"
        );
        Ok(tx)
    }
}
