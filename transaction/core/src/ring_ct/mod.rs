// Copyright (c) 2018-2025 The Botho Foundation

//! Assembly of MLSAG rings from real inputs, decoys and outputs.
//!
//! Every ring row holds one spend key per input followed by the blinding
//! columns of its [`MlsagKind`]:
//!
//! * plain: `Σ C_in(row) - Σ C_out - fee*base`
//! * confidential asset: `n_out*Σ AT_in(row) - n_in*Σ AT_out`, then the
//!   commitment column as above
//!
//! On the real row both blinding columns are multiples of `B_BLINDING`, and
//! their discrete logs are the secrets the signer closes the ring with.

mod ring_indexes;

pub use self::ring_indexes::RingIndexes;

use crate::{
    coin::{CoinBase, OutputCoin, OutputCoinV1},
    Coin, CryptoError, ProtocolError, Result, ValidationError,
};
use prv_crypto_ring_signature::{
    Identity, MlsagKind, Ring, RistrettoPoint, Scalar, SignableRing, B_BLINDING,
};
use rand::Rng;
use rand_core::{CryptoRng, RngCore};

/// One coin as it appears in a ring.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RingMember {
    /// The coin's chain index.
    pub index: u64,
    /// The coin's ring key.
    pub public_key: RistrettoPoint,
    /// The coin's commitment.
    pub commitment: RistrettoPoint,
    /// The coin's asset tag, required in confidential-asset rings.
    pub asset_tag: Option<RistrettoPoint>,
}

impl RingMember {
    /// The ring member for chain coin `coin` at `index`.
    pub fn from_coin(index: u64, coin: &Coin) -> Result<Self> {
        let commitment = coin
            .commitment()
            .point
            .decompress()
            .ok_or(CryptoError::InvalidPoint)?;
        let asset_tag = coin.asset_tag().map(|tag| tag.decompress()).transpose()?;
        Ok(Self {
            index,
            public_key: coin.ring_key()?,
            commitment,
            asset_tag,
        })
    }

    fn required_asset_tag(&self) -> Result<RistrettoPoint> {
        self.asset_tag
            .ok_or_else(|| ProtocolError::MissingAssetTag(self.index).into())
    }
}

/// A coin being spent, with everything the signer needs.
#[derive(Clone, Debug)]
pub struct RealInput {
    /// The coin's ring member.
    pub member: RingMember,
    /// Discrete log of the ring key.
    pub secret: Scalar,
    /// The coin's value.
    pub value: u64,
    /// The coin's commitment randomness.
    pub randomness: Scalar,
    /// The coin's asset tag blinder; zero when unblinded or not a
    /// confidential-asset coin.
    pub asset_blinder: Scalar,
}

/// An output being created, with its opening.
#[derive(Clone, Debug)]
pub struct OutputSecret {
    /// The commitment.
    pub commitment: RistrettoPoint,
    /// The committed value.
    pub value: u64,
    /// The commitment randomness.
    pub randomness: Scalar,
    /// The asset tag of confidential-asset outputs.
    pub asset_tag: Option<RistrettoPoint>,
    /// The asset tag blinder.
    pub asset_blinder: Scalar,
}

impl OutputSecret {
    /// The public part of the output.
    pub fn points(&self) -> OutputPoints {
        OutputPoints {
            commitment: self.commitment,
            asset_tag: self.asset_tag,
        }
    }
}

impl From<&OutputCoin> for OutputSecret {
    fn from(src: &OutputCoin) -> Self {
        Self {
            commitment: src.commitment(),
            value: src.value,
            randomness: src.randomness,
            asset_tag: src.asset_tag,
            asset_blinder: src.asset_blinder,
        }
    }
}

impl From<&OutputCoinV1> for OutputSecret {
    fn from(src: &OutputCoinV1) -> Self {
        Self {
            commitment: prv_crypto_ring_signature::generators()
                .commit(Scalar::from(src.value), src.randomness),
            value: src.value,
            randomness: src.randomness,
            asset_tag: None,
            asset_blinder: Scalar::ZERO,
        }
    }
}

/// The public part of an output, all a verifier sees.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OutputPoints {
    /// The commitment.
    pub commitment: RistrettoPoint,
    /// The asset tag of confidential-asset outputs.
    pub asset_tag: Option<RistrettoPoint>,
}

/// A ring ready to sign plus the chain indexes to publish with it.
pub struct BuiltRing {
    /// The ring and its secrets.
    pub signable: SignableRing,
    /// Chain indexes, row by row.
    pub indexes: RingIndexes,
}

// Test-only: `assert_matches!` needs `Debug`; secrets are not printed.
#[cfg(test)]
impl core::fmt::Debug for BuiltRing {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BuiltRing")
            .field("indexes", &self.indexes)
            .finish_non_exhaustive()
    }
}

/// Assemble the ring matrix from its member rows.
///
/// `fee_base` is `G_VALUE` for plain rings and the token's asset generator
/// for confidential-asset rings.
pub fn ring_from_members(
    kind: MlsagKind,
    rows: &[Vec<RingMember>],
    outputs: &[OutputPoints],
    fee: u64,
    fee_base: &RistrettoPoint,
) -> Result<Ring> {
    let output_commitments: RistrettoPoint = outputs.iter().map(|o| o.commitment).sum();
    let fee_point = Scalar::from(fee) * fee_base;
    let output_tags = match kind {
        MlsagKind::Plain => RistrettoPoint::identity(),
        MlsagKind::ConfidentialAsset => outputs
            .iter()
            .map(|o| o.asset_tag.ok_or(ProtocolError::TokenMismatch))
            .sum::<core::result::Result<RistrettoPoint, _>>()?,
    };
    let n_out = Scalar::from(outputs.len() as u64);

    let keys = rows
        .iter()
        .map(|row| {
            let n_in = Scalar::from(row.len() as u64);
            let mut keys: Vec<RistrettoPoint> = row.iter().map(|m| m.public_key).collect();
            if kind == MlsagKind::ConfidentialAsset {
                let input_tags = row
                    .iter()
                    .map(RingMember::required_asset_tag)
                    .sum::<Result<RistrettoPoint>>()?;
                keys.push(n_out * input_tags - n_in * output_tags);
            }
            let input_commitments: RistrettoPoint = row.iter().map(|m| m.commitment).sum();
            keys.push(input_commitments - output_commitments - fee_point);
            Ok(keys)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Ring::new(keys)?)
}

/// Place the real inputs at a random row, fill the other rows from
/// `decoys` in order, `n_in` members per row, append the blinding columns
/// and pair the ring with its secrets.
///
/// The real row's blinding columns are recomputed from the secrets before
/// anything is handed to the signer; a mismatch means the inputs, outputs or
/// fee do not balance, or an asset tag is inconsistent, and is fatal.
#[allow(clippy::too_many_arguments)]
pub fn build_ring<R: CryptoRng + RngCore>(
    kind: MlsagKind,
    inputs: &[RealInput],
    decoys: &[RingMember],
    outputs: &[OutputSecret],
    fee: u64,
    fee_base: &RistrettoPoint,
    ring_size: usize,
    rng: &mut R,
) -> Result<BuiltRing> {
    let n_in = inputs.len();
    if n_in == 0 {
        return Err(ValidationError::NoInputs.into());
    }
    if ring_size == 0 {
        return Err(ValidationError::InvalidRingSize(ring_size).into());
    }
    let required = (ring_size - 1) * n_in;
    if decoys.len() < required {
        return Err(ProtocolError::MissingDecoys {
            required,
            available: decoys.len(),
        }
        .into());
    }

    let real_index = rng.gen_range(0..ring_size);
    let mut decoy_rows = decoys.chunks_exact(n_in);
    let rows: Vec<Vec<RingMember>> = (0..ring_size)
        .map(|i| {
            if i == real_index {
                inputs.iter().map(|input| input.member).collect()
            } else {
                decoy_rows.next().map(<[RingMember]>::to_vec).unwrap_or_default()
            }
        })
        .collect();

    let output_points: Vec<OutputPoints> = outputs.iter().map(OutputSecret::points).collect();
    let ring = ring_from_members(kind, &rows, &output_points, fee, fee_base)?;

    let mut secrets: Vec<Scalar> = inputs.iter().map(|input| input.secret).collect();
    let mut expected_errors = Vec::new();
    if kind == MlsagKind::ConfidentialAsset {
        let n_out = Scalar::from(outputs.len() as u64);
        let n_in = Scalar::from(n_in as u64);
        let input_blinders: Scalar = inputs.iter().map(|i| i.asset_blinder).sum();
        let output_blinders: Scalar = outputs.iter().map(|o| o.asset_blinder).sum();
        secrets.push(input_blinders * n_out - output_blinders * n_in);
        expected_errors.push(CryptoError::AssetTagMismatch);
    }
    let input_blinding: Scalar = inputs
        .iter()
        .map(|i| Scalar::from(i.value) * i.asset_blinder + i.randomness)
        .sum();
    let output_blinding: Scalar = outputs
        .iter()
        .map(|o| Scalar::from(o.value) * o.asset_blinder + o.randomness)
        .sum();
    secrets.push(input_blinding - output_blinding);
    expected_errors.push(CryptoError::BalanceMismatch);

    let real_row = ring.row(real_index).ok_or(CryptoError::BalanceMismatch)?;
    for (offset, error) in expected_errors.into_iter().enumerate() {
        let column = n_in + offset;
        if real_row[column] != secrets[column] * *B_BLINDING {
            tracing::warn!(column, "commitment to zero does not match its secret");
            return Err(error.into());
        }
    }

    let indexes = RingIndexes::new(
        rows.iter()
            .map(|row| row.iter().map(|member| member.index).collect())
            .collect(),
    )?;
    tracing::debug!(rows = ring_size, inputs = n_in, ?kind, "ring built");
    Ok(BuiltRing {
        signable: SignableRing::new(ring, kind, real_index, secrets)?,
        indexes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, TokenId};
    use assert_matches::assert_matches;
    use prv_crypto_ring_signature::{asset_generators, generators, G, G_VALUE};
    use rand::{rngs::StdRng, SeedableRng};

    fn random_member(index: u64, tag: Option<RistrettoPoint>, rng: &mut StdRng) -> RingMember {
        RingMember {
            index,
            public_key: RistrettoPoint::random(rng),
            commitment: RistrettoPoint::random(rng),
            asset_tag: tag,
        }
    }

    fn plain_input(index: u64, value: u64, rng: &mut StdRng) -> RealInput {
        let secret = Scalar::random(rng);
        let randomness = Scalar::random(rng);
        RealInput {
            member: RingMember {
                index,
                public_key: secret * G,
                commitment: generators().commit(Scalar::from(value), randomness),
                asset_tag: None,
            },
            secret,
            value,
            randomness,
            asset_blinder: Scalar::ZERO,
        }
    }

    fn plain_output(value: u64, rng: &mut StdRng) -> OutputSecret {
        let randomness = Scalar::random(rng);
        OutputSecret {
            commitment: generators().commit(Scalar::from(value), randomness),
            value,
            randomness,
            asset_tag: None,
            asset_blinder: Scalar::ZERO,
        }
    }

    fn asset_input(index: u64, value: u64, token: &TokenId, rng: &mut StdRng) -> RealInput {
        let secret = Scalar::random(rng);
        let randomness = Scalar::random(rng);
        let blinder = Scalar::random(rng);
        let tag = token.asset_generator() + blinder * *B_BLINDING;
        RealInput {
            member: RingMember {
                index,
                public_key: secret * G,
                commitment: asset_generators(&tag).commit(Scalar::from(value), randomness),
                asset_tag: Some(tag),
            },
            secret,
            value,
            randomness,
            asset_blinder: blinder,
        }
    }

    fn asset_output(value: u64, token: &TokenId, rng: &mut StdRng) -> OutputSecret {
        let randomness = Scalar::random(rng);
        let blinder = Scalar::random(rng);
        let tag = token.asset_generator() + blinder * *B_BLINDING;
        OutputSecret {
            commitment: asset_generators(&tag).commit(Scalar::from(value), randomness),
            value,
            randomness,
            asset_tag: Some(tag),
            asset_blinder: blinder,
        }
    }

    #[test]
    fn test_plain_ring_signs_and_verifies() {
        let mut rng: StdRng = SeedableRng::from_seed([51u8; 32]);
        let inputs = vec![plain_input(1, 60, &mut rng), plain_input(2, 50, &mut rng)];
        let outputs = vec![plain_output(100, &mut rng)];
        let decoys: Vec<RingMember> = (0..16).map(|i| random_member(100 + i, None, &mut rng)).collect();

        let built = build_ring(
            MlsagKind::Plain,
            &inputs,
            &decoys,
            &outputs,
            10,
            &G_VALUE,
            8,
            &mut rng,
        )
        .unwrap();
        assert_eq!(built.indexes.rows(), 8);
        assert_eq!(built.indexes.columns(), 2);
        let ring = built.signable.ring().clone();
        assert_eq!(ring.columns(), 3);

        let sig = built.signable.sign(&[7u8; 32], &mut rng).unwrap();
        sig.verify(&[7u8; 32], &ring).unwrap();
        assert_eq!(sig.key_images().len(), 2);
    }

    #[test]
    fn test_real_row_takes_every_position() {
        let mut rng: StdRng = SeedableRng::from_seed([57u8; 32]);
        let inputs = vec![plain_input(1, 20, &mut rng)];
        let outputs = vec![plain_output(20, &mut rng)];
        let decoys: Vec<RingMember> = (0..2).map(|i| random_member(100 + i, None, &mut rng)).collect();

        let mut seen = [false; 3];
        for _ in 0..64 {
            let built = build_ring(
                MlsagKind::Plain,
                &inputs,
                &decoys,
                &outputs,
                0,
                &G_VALUE,
                3,
                &mut rng,
            )
            .unwrap();
            let row = built.indexes.as_rows().iter().position(|row| row[0] == 1).unwrap();
            seen[row] = true;
        }
        assert_eq!(seen, [true; 3]);
    }

    #[test]
    fn test_unbalanced_plain_ring_is_rejected() {
        let mut rng: StdRng = SeedableRng::from_seed([52u8; 32]);
        let inputs = vec![plain_input(1, 100, &mut rng)];
        let outputs = vec![plain_output(100, &mut rng)];
        let decoys: Vec<RingMember> = (0..8).map(|i| random_member(i, None, &mut rng)).collect();
        assert_matches!(
            build_ring(MlsagKind::Plain, &inputs, &decoys, &outputs, 1, &G_VALUE, 8, &mut rng),
            Err(Error::Crypto(CryptoError::BalanceMismatch))
        );
    }

    #[test]
    fn test_missing_decoys() {
        let mut rng: StdRng = SeedableRng::from_seed([53u8; 32]);
        let inputs = vec![plain_input(1, 5, &mut rng)];
        let outputs = vec![plain_output(5, &mut rng)];
        let decoys: Vec<RingMember> = (0..3).map(|i| random_member(i, None, &mut rng)).collect();
        assert_matches!(
            build_ring(MlsagKind::Plain, &inputs, &decoys, &outputs, 0, &G_VALUE, 8, &mut rng),
            Err(Error::Protocol(ProtocolError::MissingDecoys {
                required: 7,
                available: 3
            }))
        );
    }

    #[test]
    fn test_asset_ring_has_two_blinding_columns() {
        let mut rng: StdRng = SeedableRng::from_seed([54u8; 32]);
        let token = TokenId::new([6u8; 32]);
        let inputs = vec![asset_input(1, 70, &token, &mut rng)];
        let outputs = vec![
            asset_output(30, &token, &mut rng),
            asset_output(40, &token, &mut rng),
        ];
        let decoys: Vec<RingMember> = (0..8)
            .map(|i| {
                let tag = RistrettoPoint::random(&mut rng);
                random_member(i, Some(tag), &mut rng)
            })
            .collect();

        let built = build_ring(
            MlsagKind::ConfidentialAsset,
            &inputs,
            &decoys,
            &outputs,
            0,
            &token.asset_generator(),
            8,
            &mut rng,
        )
        .unwrap();
        let ring = built.signable.ring().clone();
        assert_eq!(ring.columns(), 3);
        let sig = built.signable.sign(&[1u8; 32], &mut rng).unwrap();
        assert_eq!(sig.kind(), MlsagKind::ConfidentialAsset);
        sig.verify(&[1u8; 32], &ring).unwrap();
    }

    #[test]
    fn test_asset_ring_rejects_foreign_token_output() {
        let mut rng: StdRng = SeedableRng::from_seed([55u8; 32]);
        let token = TokenId::new([6u8; 32]);
        let other = TokenId::new([7u8; 32]);
        let inputs = vec![asset_input(1, 70, &token, &mut rng)];
        let outputs = vec![asset_output(70, &other, &mut rng)];
        let decoys: Vec<RingMember> = (0..8)
            .map(|i| random_member(i, Some(RistrettoPoint::random(&mut rng)), &mut rng))
            .collect();
        assert_matches!(
            build_ring(
                MlsagKind::ConfidentialAsset,
                &inputs,
                &decoys,
                &outputs,
                0,
                &token.asset_generator(),
                8,
                &mut rng
            ),
            Err(Error::Crypto(CryptoError::AssetTagMismatch))
        );
    }

    #[test]
    fn test_asset_ring_requires_decoy_tags() {
        let mut rng: StdRng = SeedableRng::from_seed([56u8; 32]);
        let token = TokenId::new([6u8; 32]);
        let inputs = vec![asset_input(1, 70, &token, &mut rng)];
        let outputs = vec![asset_output(70, &token, &mut rng)];
        let decoys: Vec<RingMember> = (0..8).map(|i| random_member(i, None, &mut rng)).collect();
        assert_matches!(
            build_ring(
                MlsagKind::ConfidentialAsset,
                &inputs,
                &decoys,
                &outputs,
                0,
                &token.asset_generator(),
                2,
                &mut rng
            ),
            Err(Error::Protocol(ProtocolError::MissingAssetTag(_)))
        );
    }
}
