// Copyright (c) 2018-2025 The Botho Foundation

//! Errors that can occur when building, decoding or validating a transaction.
//!
//! Every failure falls into one of four classes. Validation errors are
//! recoverable by adjusting the request. Crypto errors are fatal for the
//! current call. Protocol errors flag version or token mismatches and
//! missing ring data. Serialization errors come from malformed bytes.

use displaydoc::Display;
use prv_crypto_keys::KeyError;
use prv_crypto_ring_signature::Error as RingSignatureError;

/// Result alias for this crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Any error of the transaction engine.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum Error {
    /// Validation: {0}
    Validation(ValidationError),
    /// Crypto: {0}
    Crypto(CryptoError),
    /// Protocol: {0}
    Protocol(ProtocolError),
    /// Serialization: {0}
    Serialization(SerializationError),
}

/// Malformed or out-of-bound caller input.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum ValidationError {
    /// {0} inputs exceed the limit of {1}
    TooManyInputs(usize, usize),
    /// {0} payment infos exceed the limit of {1}
    TooManyPaymentInfos(usize, usize),
    /// A version 2 transaction needs at least one input
    NoInputs,
    /// Insufficient funds: {available} available, {required} required
    InsufficientFunds {
        /// Sum of the inputs.
        available: u64,
        /// Sum of the payments plus fee.
        required: u64,
    },
    /// Conversion does not balance: inputs {inputs}, outputs plus fee {outputs}
    UnbalancedConversion {
        /// Sum of the inputs.
        inputs: u64,
        /// Sum of the outputs plus fee.
        outputs: u64,
    },
    /// Input coins mix versions 1 and 2
    MixedCoinVersions,
    /// Amount arithmetic overflowed
    AmountOverflow,
    /// Serialized transaction is {0} bytes, limit is {1}
    TxTooLarge(usize, usize),
    /// Info field is {0} bytes, limit is {1}
    InfoTooLong(usize, usize),
    /// Message must be 32 bytes, got {0}
    InvalidMessageLength(usize),
    /// Ring size {0} is outside 1..=255
    InvalidRingSize(usize),
    /// The key set has no spend private key
    MissingSpendKey,
    /// Key image appears twice
    DuplicateKeyImage,
    /// The same input is spent twice
    DuplicateInput,
    /// Output public key appears twice
    DuplicateOutputPublicKey,
    /// Confidential-asset transfers must carry a zero fee, got {0}
    NonZeroTokenFee(u64),
    /// Invalid configuration: {0}
    InvalidConfig(String),
}

/// Cryptographic failures. Fatal for the current call.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum CryptoError {
    /// Invalid curve point
    InvalidPoint,
    /// Scalar is not canonically encoded
    InvalidScalar,
    /// Key: {0}
    Key(KeyError),
    /// Ring signature: {0}
    RingSignature(RingSignatureError),
    /// Range proof: {0}
    RangeProof(String),
    /// The coin does not belong to this key set
    CoinNotOwned,
    /// The coin's commitment does not open to its decrypted amount
    CommitmentMismatch,
    /// Recomputed asset-tag commitment to zero does not match the blinders
    AssetTagMismatch,
    /// Recomputed commitment to zero does not match the blinding sums
    BalanceMismatch,
    /// No tx key routed output {0} to its receiver's shard
    ShardMatchExhausted(u32),
    /// Signature does not verify
    InvalidSignature,
}

/// Version and token mismatches, and missing ring data.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum ProtocolError {
    /// Unsupported transaction version {0}
    UnsupportedVersion(u8),
    /// Unknown transaction type {0}
    UnknownTxType(String),
    /// Fee transaction is version {fee}, token transaction is version {token}
    VersionMismatch {
        /// Version of the fee sub-transaction.
        fee: u8,
        /// Version of the token sub-transaction.
        token: u8,
    },
    /// Coin version {0} cannot be used here
    WrongCoinVersion(u8),
    /// Coin's asset tag does not match the token being spent
    TokenMismatch,
    /// Token is not in the asset tag cache
    UnknownToken,
    /// The fee transaction must spend native coins
    FeeNotNative,
    /// Token conversions must pay their fee from version 2 native coins
    ConversionFeeNotV2,
    /// Version 2 token ids are derived by the chain
    TokenInitRequiresV1,
    /// Expected {required} decoys, got {available}
    MissingDecoys {
        /// Decoys the ring needs.
        required: usize,
        /// Decoys supplied.
        available: usize,
    },
    /// Decoy {0} is missing its asset tag
    MissingAssetTag(u64),
    /// Ring member {0} is unknown
    UnknownRingMember(u64),
    /// Proof is missing or of the wrong kind
    UnexpectedProof,
    /// Metadata requires a signing key
    MissingMetadataKey,
}

/// Byte-level decoding failures.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum SerializationError {
    /// Incorrect length, provided `{0}`, required `{1}`
    LengthMismatch(usize, usize),
    /// Invalid dimension byte {0}
    InvalidDimension(usize),
    /// JSON: {0}
    Json(String),
    /// TOML: {0}
    Toml(String),
    /// IO: {0}
    Io(String),
}

impl From<ValidationError> for Error {
    fn from(src: ValidationError) -> Self {
        Self::Validation(src)
    }
}

impl From<CryptoError> for Error {
    fn from(src: CryptoError) -> Self {
        Self::Crypto(src)
    }
}

impl From<ProtocolError> for Error {
    fn from(src: ProtocolError) -> Self {
        Self::Protocol(src)
    }
}

impl From<SerializationError> for Error {
    fn from(src: SerializationError) -> Self {
        Self::Serialization(src)
    }
}

impl From<KeyError> for Error {
    fn from(src: KeyError) -> Self {
        match src {
            KeyError::LengthMismatch(got, want) => {
                SerializationError::LengthMismatch(got, want).into()
            }
            other => CryptoError::Key(other).into(),
        }
    }
}

impl From<RingSignatureError> for Error {
    fn from(src: RingSignatureError) -> Self {
        match src {
            RingSignatureError::LengthMismatch(got, want) => {
                SerializationError::LengthMismatch(got, want).into()
            }
            RingSignatureError::InvalidPrefix(prefix) => {
                SerializationError::InvalidDimension(prefix as usize).into()
            }
            RingSignatureError::InvalidMessageLength(len) => {
                ValidationError::InvalidMessageLength(len).into()
            }
            RingSignatureError::InvalidCurvePoint => CryptoError::InvalidPoint.into(),
            RingSignatureError::InvalidScalar => CryptoError::InvalidScalar.into(),
            other => CryptoError::RingSignature(other).into(),
        }
    }
}

impl From<prv_account_keys::Error> for Error {
    fn from(src: prv_account_keys::Error) -> Self {
        match src {
            prv_account_keys::Error::ViewOnly => ValidationError::MissingSpendKey.into(),
            prv_account_keys::Error::Key(key) => key.into(),
            prv_account_keys::Error::AddressLength(len) => {
                SerializationError::LengthMismatch(len, 64).into()
            }
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(src: serde_json::Error) -> Self {
        SerializationError::Json(src.to_string()).into()
    }
}

impl From<bulletproofs_og::ProofError> for Error {
    fn from(src: bulletproofs_og::ProofError) -> Self {
        CryptoError::RangeProof(format!("{src:?}")).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_ring_signature_errors_are_classified() {
        assert_matches!(
            Error::from(RingSignatureError::LengthMismatch(3, 32)),
            Error::Serialization(SerializationError::LengthMismatch(3, 32))
        );
        assert_matches!(
            Error::from(RingSignatureError::InvalidMessageLength(31)),
            Error::Validation(ValidationError::InvalidMessageLength(31))
        );
        assert_matches!(
            Error::from(RingSignatureError::ValueNotConserved(2)),
            Error::Crypto(CryptoError::RingSignature(_))
        );
        assert_matches!(
            Error::from(RingSignatureError::InvalidCurvePoint),
            Error::Crypto(CryptoError::InvalidPoint)
        );
    }

    #[test]
    fn test_view_only_key_set_is_a_validation_error() {
        assert_eq!(
            Error::from(prv_account_keys::Error::ViewOnly),
            Error::Validation(ValidationError::MissingSpendKey)
        );
    }

    #[test]
    fn test_display() {
        let err = Error::from(ValidationError::InsufficientFunds {
            available: 5,
            required: 9,
        });
        assert_eq!(
            err.to_string(),
            "Validation: Insufficient funds: 5 available, 9 required"
        );
    }
}
