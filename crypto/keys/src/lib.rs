// Copyright (c) 2018-2025 The Botho Foundation

//! Ristretto key types, Schnorr signatures and byte-encoding helpers shared
//! by the privacy transaction engine.

#![deny(missing_docs)]

mod error;
mod ristretto;
mod signature;

pub mod serde_b64;

pub use error::KeyError;
pub use ristretto::{CompressedRistrettoPublic, RistrettoPrivate, RistrettoPublic};
pub use signature::RistrettoSignature;

use rand_core::{CryptoRng, RngCore};

/// A type that can be sampled uniformly from a cryptographic RNG.
pub trait FromRandom: Sized {
    /// Sample a fresh value.
    fn from_random<R: CryptoRng + RngCore>(rng: &mut R) -> Self;
}
