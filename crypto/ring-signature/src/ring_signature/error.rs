// Copyright (c) 2018-2025 The Botho Foundation

//! Errors which can occur in connection to MLSAG signatures

use displaydoc::Display;
use serde::{Deserialize, Serialize};

/// An error which can occur when building, signing, verifying or decoding an
/// MLSAG
#[derive(Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
pub enum Error {
    /// Incorrect length for array copy, provided `{0}`, required `{1}`.
    LengthMismatch(usize, usize),

    /// Index out of bounds
    IndexOutOfBounds,

    /// Invalid curve point
    InvalidCurvePoint,

    /// Scalar is not canonically encoded
    InvalidScalar,

    /// The signature was not able to be validated
    InvalidSignature,

    /// Failed to compress/decompress a KeyImage
    InvalidKeyImage,

    /// Message must be 32 bytes, got {0}
    InvalidMessageLength(usize),

    /// Ring has no rows or no columns
    EmptyRing,

    /// Ring rows have differing column counts
    RaggedRing,

    /// Ring needs more than {0} columns for its signature kind
    TooFewColumns(usize),

    /// Ring dimensions {0}x{1} exceed the 255 limit of the byte encoding
    RingTooLarge(usize, usize),

    /// Expected {0} private keys, got {1}
    WrongNumberOfKeys(usize, usize),

    /// Secret for column {0} does not open the real row's key
    SecretMismatch(usize),

    /// Commitment to zero in column {0} does not match the expected value
    ValueNotConserved(usize),

    /// Unknown encoding prefix {0}
    InvalidPrefix(u8),
}
