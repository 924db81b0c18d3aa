// Copyright (c) 2018-2025 The Botho Foundation

//! Transaction wire types.
//!
//! A [`Tx`] is serialized as JSON with PascalCase field names and base64 byte
//! fields. Its hash covers everything except the signature and the metadata
//! signature, so it is the same before and after signing.

mod decode;
mod metadata;
mod proof;
mod signer;
mod token;

pub use self::{
    decode::{decode_tx, AnyTx},
    metadata::Metadata,
    proof::{
        AssetRangeProof, ConversionProof, Proof, ProofV1, ProofV2, RangeProofData, RevealedInput,
    },
    signer::{TxSigner, UnsignedTx},
    token::{token_parent_hash, TokenData, TokenType, TxToken},
};

use crate::{
    coin::Coin,
    constants::{MAX_INFO_LEN, TX_VERSION_1, TX_VERSION_2},
    ring_ct::RingIndexes,
    ProtocolError, Result, SerializationError, ValidationError,
};
use core::fmt;
use prv_crypto_keys::serde_b64;
use prv_crypto_ring_signature::{KeyImage, Mlsag};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

/// A transaction hash, the canonical transaction id.
pub type TxHash = [u8; 32];

/// The `Type` discriminator of the wire format.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum TxType {
    /// A payment.
    #[serde(rename = "n")]
    Normal,
    /// A v1 to v2 conversion.
    #[serde(rename = "cv")]
    Conversion,
    /// A token transfer, or a v1 token init.
    #[serde(rename = "tp")]
    TokenTransfer,
    /// A token conversion.
    #[serde(rename = "tcv")]
    TokenConversion,
}

impl TxType {
    /// The wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "n",
            Self::Conversion => "cv",
            Self::TokenTransfer => "tp",
            Self::TokenConversion => "tcv",
        }
    }

    /// True for the composite token kinds.
    pub fn is_token(&self) -> bool {
        matches!(self, Self::TokenTransfer | Self::TokenConversion)
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for TxType {
    type Err = crate::Error;

    fn from_str(src: &str) -> Result<Self> {
        match src {
            "n" => Ok(Self::Normal),
            "cv" => Ok(Self::Conversion),
            "tp" => Ok(Self::TokenTransfer),
            "tcv" => Ok(Self::TokenConversion),
            other => Err(ProtocolError::UnknownTxType(other.to_string()).into()),
        }
    }
}

/// How a transaction's `Sig` field is produced.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SignatureScheme {
    /// A Schnorr signature by the key in `SigPubKey`.
    Schnorr,
    /// One MLSAG over all inputs.
    Mlsag,
    /// One MLSAG per input, framed with [`encode_signature_list`].
    MlsagPerInput,
}

/// A version 1 or version 2 transaction.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tx {
    /// 1 or 2.
    pub version: u8,
    /// Kind of transaction.
    #[serde(rename = "Type")]
    pub tx_type: TxType,
    /// Unix time after which the transaction is valid.
    pub lock_time: i64,
    /// Fee, in the smallest unit of the native coin.
    pub fee: u64,
    /// Free-form bytes.
    #[serde(with = "serde_b64", default)]
    pub info: Vec<u8>,
    /// [`RingIndexes`] bytes for ring signatures, the signer's public key for
    /// Schnorr signatures.
    #[serde(with = "serde_b64", default)]
    pub sig_pub_key: Vec<u8>,
    /// The signature; see [`SignatureScheme`].
    #[serde(with = "serde_b64", default)]
    pub sig: Vec<u8>,
    /// `None` only on the zero-input fast path.
    #[serde(default)]
    pub proof: Option<Proof>,
    /// Last byte of the sender's public key.
    pub pub_key_last_byte_sender: u8,
    /// Opaque business payload.
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

impl Tx {
    /// An empty transaction, to be populated by a builder.
    pub fn new(version: u8, tx_type: TxType, lock_time: i64, fee: u64) -> Result<Self> {
        if version != TX_VERSION_1 && version != TX_VERSION_2 {
            return Err(ProtocolError::UnsupportedVersion(version).into());
        }
        Ok(Self {
            version,
            tx_type,
            lock_time,
            fee,
            info: Vec::new(),
            sig_pub_key: Vec::new(),
            sig: Vec::new(),
            proof: None,
            pub_key_last_byte_sender: 0,
            metadata: None,
        })
    }

    /// Attach the info bytes, bounded by [`MAX_INFO_LEN`].
    pub fn set_info(&mut self, info: &[u8]) -> Result<()> {
        if info.len() > MAX_INFO_LEN {
            return Err(ValidationError::InfoTooLong(info.len(), MAX_INFO_LEN).into());
        }
        self.info = info.to_vec();
        Ok(())
    }

    /// The hash, excluding `Sig` and the metadata signature.
    pub fn hash(&self) -> Result<TxHash> {
        let mut unsigned = self.clone();
        unsigned.sig.clear();
        if let Some(metadata) = unsigned.metadata.as_mut() {
            metadata.sig.clear();
        }
        let bytes = serde_json::to_vec(&unsigned)?;
        Ok(hash_parts(&[&bytes]))
    }

    /// Serialize to wire bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse wire bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let tx: Self = serde_json::from_slice(bytes)?;
        if tx.version != TX_VERSION_1 && tx.version != TX_VERSION_2 {
            return Err(ProtocolError::UnsupportedVersion(tx.version).into());
        }
        Ok(tx)
    }

    /// Which signature the transaction carries.
    pub fn signature_scheme(&self) -> SignatureScheme {
        match &self.proof {
            Some(Proof::V2(_)) => SignatureScheme::Mlsag,
            Some(Proof::V1(proof)) if !proof.pseudo_outputs.is_empty() => {
                SignatureScheme::MlsagPerInput
            }
            _ => SignatureScheme::Schnorr,
        }
    }

    /// The output coins.
    pub fn output_coins(&self) -> Vec<Coin> {
        self.proof
            .as_ref()
            .map(Proof::output_coins)
            .unwrap_or_default()
    }

    /// The ring members' chain indexes; `None` for Schnorr-signed
    /// transactions.
    pub fn ring_indexes(&self) -> Result<Option<RingIndexes>> {
        match self.signature_scheme() {
            SignatureScheme::Schnorr => Ok(None),
            _ => RingIndexes::from_bytes(&self.sig_pub_key).map(Some),
        }
    }

    /// The MLSAGs carried in `Sig`; empty for Schnorr-signed transactions.
    pub fn mlsags(&self) -> Result<Vec<Mlsag>> {
        match self.signature_scheme() {
            SignatureScheme::Schnorr => Ok(Vec::new()),
            SignatureScheme::Mlsag => Ok(vec![Mlsag::from_bytes(&self.sig)?]),
            SignatureScheme::MlsagPerInput => decode_signature_list(&self.sig)?
                .iter()
                .map(|bytes| Ok(Mlsag::from_bytes(bytes)?))
                .collect(),
        }
    }

    /// Key images published by the transaction's ring signatures.
    pub fn key_images(&self) -> Result<Vec<KeyImage>> {
        Ok(self
            .mlsags()?
            .iter()
            .flat_map(|sig| sig.key_images().iter().copied())
            .collect())
    }
}

/// Frame per-input signatures: a count byte, then each signature prefixed by
/// its little-endian `u16` length.
pub fn encode_signature_list(signatures: &[Vec<u8>]) -> Result<Vec<u8>> {
    let count = u8::try_from(signatures.len())
        .map_err(|_| SerializationError::InvalidDimension(signatures.len()))?;
    let mut bytes = vec![count];
    for sig in signatures {
        let len = u16::try_from(sig.len())
            .map_err(|_| SerializationError::LengthMismatch(sig.len(), u16::MAX as usize))?;
        bytes.extend_from_slice(&len.to_le_bytes());
        bytes.extend_from_slice(sig);
    }
    Ok(bytes)
}

/// Inverse of [`encode_signature_list`].
pub fn decode_signature_list(bytes: &[u8]) -> Result<Vec<Vec<u8>>> {
    let (&count, mut rest) = bytes
        .split_first()
        .ok_or(SerializationError::LengthMismatch(0, 1))?;
    let mut signatures = Vec::with_capacity(count as usize);
    for _ in 0..count {
        if rest.len() < 2 {
            return Err(SerializationError::LengthMismatch(rest.len(), 2).into());
        }
        let len = u16::from_le_bytes([rest[0], rest[1]]) as usize;
        rest = &rest[2..];
        if rest.len() < len {
            return Err(SerializationError::LengthMismatch(rest.len(), len).into());
        }
        signatures.push(rest[..len].to_vec());
        rest = &rest[len..];
    }
    if !rest.is_empty() {
        return Err(SerializationError::LengthMismatch(bytes.len(), bytes.len() - rest.len()).into());
    }
    Ok(signatures)
}

/// Reject serialized transactions above `max_size` bytes.
pub fn check_tx_size(bytes: &[u8], max_size: usize) -> Result<()> {
    if bytes.len() > max_size {
        return Err(ValidationError::TxTooLarge(bytes.len(), max_size).into());
    }
    Ok(())
}

/// SHA3-256 over the concatenation of `parts`.
pub(crate) fn hash_parts(parts: &[&[u8]]) -> TxHash {
    let mut hasher = Sha3_256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use assert_matches::assert_matches;

    fn sample_tx() -> Tx {
        let mut tx = Tx::new(TX_VERSION_2, TxType::Normal, 0, 100).unwrap();
        tx.set_info(b"info").unwrap();
        tx.sig_pub_key = vec![1, 2, 3];
        tx.pub_key_last_byte_sender = 7;
        tx
    }

    #[test]
    fn test_hash_ignores_signature() {
        let mut tx = sample_tx();
        tx.metadata = Some(Metadata::new(3, serde_json::json!({"k": "v"})));
        let before = tx.hash().unwrap();

        tx.sig = vec![9u8; 64];
        if let Some(metadata) = tx.metadata.as_mut() {
            metadata.sig = vec![8u8; 64];
        }
        assert_eq!(tx.hash().unwrap(), before);

        tx.fee += 1;
        assert_ne!(tx.hash().unwrap(), before);
    }

    #[test]
    fn test_wire_field_names() {
        let json = String::from_utf8(sample_tx().to_bytes().unwrap()).unwrap();
        for field in [
            "\"Version\":2",
            "\"Type\":\"n\"",
            "\"LockTime\"",
            "\"Fee\":100",
            "\"Info\":\"aW5mbw==\"",
            "\"SigPubKey\"",
            "\"PubKeyLastByteSender\":7",
        ] {
            assert!(json.contains(field), "missing {field} in {json}");
        }
        assert_eq!(Tx::from_bytes(json.as_bytes()).unwrap(), sample_tx());
    }

    #[test]
    fn test_rejects_unknown_version() {
        assert_matches!(
            Tx::new(3, TxType::Normal, 0, 0),
            Err(Error::Protocol(ProtocolError::UnsupportedVersion(3)))
        );
        let json = String::from_utf8(sample_tx().to_bytes().unwrap())
            .unwrap()
            .replace("\"Version\":2", "\"Version\":9");
        assert_matches!(
            Tx::from_bytes(json.as_bytes()),
            Err(Error::Protocol(ProtocolError::UnsupportedVersion(9)))
        );
    }

    #[test]
    fn test_info_limit() {
        let mut tx = sample_tx();
        assert_matches!(
            tx.set_info(&[0u8; MAX_INFO_LEN + 1]),
            Err(Error::Validation(ValidationError::InfoTooLong(513, 512)))
        );
    }

    #[test]
    fn test_signature_list_framing() {
        let list = vec![vec![1u8; 3], Vec::new(), vec![2u8; 300]];
        let bytes = encode_signature_list(&list).unwrap();
        assert_eq!(decode_signature_list(&bytes).unwrap(), list);

        assert!(decode_signature_list(&bytes[..bytes.len() - 1]).is_err());
        let mut trailing = bytes.clone();
        trailing.push(0);
        assert!(decode_signature_list(&trailing).is_err());
        assert!(decode_signature_list(&[]).is_err());
    }

    #[test]
    fn test_size_check() {
        check_tx_size(&[0u8; 10], 10).unwrap();
        assert_matches!(
            check_tx_size(&[0u8; 11], 10),
            Err(Error::Validation(ValidationError::TxTooLarge(11, 10)))
        );
    }

    #[test]
    fn test_tx_type_strings() {
        for tx_type in [
            TxType::Normal,
            TxType::Conversion,
            TxType::TokenTransfer,
            TxType::TokenConversion,
        ] {
            assert_eq!(tx_type.as_str().parse::<TxType>().unwrap(), tx_type);
        }
        assert_matches!(
            "x".parse::<TxType>(),
            Err(Error::Protocol(ProtocolError::UnknownTxType(_)))
        );
    }
}
