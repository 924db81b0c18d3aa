// Copyright (c) 2018-2025 The Botho Foundation

//! Proof payloads of the different transaction kinds.

use crate::{
    coin::{Coin, CoinV1, CoinV2},
    CryptoError, Result,
};
use prv_crypto_keys::serde_b64;
use prv_crypto_ring_signature::{
    generators, scalar_from_bytes, CompressedCommitment, CompressedRistretto, Scalar,
};
use serde::{Deserialize, Serialize};

/// A v1 input spent in the open: the coin, its chain index and its opening.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RevealedInput {
    /// Chain index of the coin.
    pub index: u64,
    /// The coin.
    pub coin: CoinV1,
    /// Its value.
    pub value: u64,
    /// Its commitment randomness.
    #[serde(with = "serde_b64::array")]
    pub randomness: [u8; 32],
}

impl RevealedInput {
    /// Check the revealed opening against the coin's commitment.
    pub fn check_opening(&self) -> Result<()> {
        let randomness = scalar_from_bytes(&self.randomness)?;
        if CompressedCommitment::new(self.value, randomness, &generators()) != self.coin.commitment {
            return Err(CryptoError::CommitmentMismatch.into());
        }
        Ok(())
    }
}

/// Range proofs of v2 outputs.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum RangeProofData {
    /// One proof over all plain outputs.
    Aggregated(#[serde(with = "serde_b64")] Vec<u8>),
    /// One proof per confidential-asset output, in output order.
    PerOutput(Vec<AssetRangeProof>),
}

/// The range proof of one confidential-asset output.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssetRangeProof {
    /// Serialized Bulletproof.
    #[serde(with = "serde_b64")]
    pub proof: Vec<u8>,
}

/// Proof of a version 1 transaction.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProofV1 {
    /// Inputs spent without privacy.
    #[serde(default)]
    pub revealed_inputs: Vec<RevealedInput>,
    /// One pseudo-output commitment per private input.
    #[serde(default)]
    pub pseudo_outputs: Vec<CompressedCommitment>,
    /// The outputs.
    pub output_coins: Vec<CoinV1>,
    /// Aggregated range proof over the outputs; empty without privacy.
    #[serde(with = "serde_b64", default)]
    pub range_proof: Vec<u8>,
}

/// Proof of a version 2 transaction.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProofV2 {
    /// The outputs.
    pub output_coins: Vec<CoinV2>,
    /// Their range proofs.
    pub range_proof: RangeProofData,
}

/// Proof of a v1 to v2 conversion.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConversionProof {
    /// The converted v1 coins.
    pub revealed_inputs: Vec<RevealedInput>,
    /// The new v2 coins.
    pub output_coins: Vec<CoinV2>,
    /// Their range proofs.
    pub range_proof: RangeProofData,
    /// `Σ (v*bl + r)` over the outputs, opening `Σ C_out + fee*base -
    /// Σ v_in*base` as a multiple of `B_BLINDING`.
    #[serde(with = "serde_b64::array")]
    pub balance_blinding: [u8; 32],
}

impl ConversionProof {
    /// The decoded balance blinding.
    pub fn balance_blinding(&self) -> Result<Scalar> {
        Ok(scalar_from_bytes(&self.balance_blinding)?)
    }
}

/// The proof carried by a transaction.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Proof {
    /// Version 1 proof.
    V1(ProofV1),
    /// Version 2 proof.
    V2(ProofV2),
    /// Conversion proof.
    Conversion(ConversionProof),
}

impl Proof {
    /// The output coins.
    pub fn output_coins(&self) -> Vec<Coin> {
        match self {
            Self::V1(proof) => proof.output_coins.iter().cloned().map(Coin::V1).collect(),
            Self::V2(proof) => proof.output_coins.iter().cloned().map(Coin::V2).collect(),
            Self::Conversion(proof) => proof.output_coins.iter().cloned().map(Coin::V2).collect(),
        }
    }

    /// Output commitments as range proofs see them.
    pub fn output_commitments(&self) -> Vec<CompressedRistretto> {
        self.output_coins()
            .iter()
            .map(|coin| crate::coin::CoinBase::commitment(coin).point)
            .collect()
    }

    /// Inputs spent in the open.
    pub fn revealed_inputs(&self) -> &[RevealedInput] {
        match self {
            Self::V1(proof) => &proof.revealed_inputs,
            Self::V2(_) => &[],
            Self::Conversion(proof) => &proof.revealed_inputs,
        }
    }
}
