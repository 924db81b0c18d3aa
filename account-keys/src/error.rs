// Copyright (c) 2018-2025 The Botho Foundation

use displaydoc::Display;
use prv_crypto_keys::KeyError;

/// A type alias for account-keys results.
pub type Result<T> = core::result::Result<T, Error>;

/// An error which can occur when decoding account keys or addresses.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Error {
    /// Key error: {0}
    Key(KeyError),

    /// Address encoding has {0} bytes, expected 64
    AddressLength(usize),

    /// Spending requires a spend private key, but the key set is view-only
    ViewOnly,
}

impl From<KeyError> for Error {
    fn from(src: KeyError) -> Self {
        Self::Key(src)
    }
}
