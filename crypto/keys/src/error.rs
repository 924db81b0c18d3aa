// Copyright (c) 2018-2025 The Botho Foundation

use displaydoc::Display;
use serde::{Deserialize, Serialize};

/// An error which can occur when handling keys or signatures.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum KeyError {
    /// Incorrect length for array copy, provided `{0}`, required `{1}`.
    LengthMismatch(usize, usize),

    /// The provided bytes are not a valid compressed curve point
    InvalidPublicKey,

    /// The provided bytes are not a canonical scalar
    InvalidPrivateKey,

    /// The provided bytes are not a well-formed signature
    InvalidSignature,

    /// The signature does not verify against the given key and message
    SignatureMismatch,
}
