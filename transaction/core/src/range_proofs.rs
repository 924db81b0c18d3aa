// Copyright (c) 2018-2025 The Botho Foundation

//! Bulletproof range proofs over output commitments.
//!
//! Plain outputs share one aggregated proof, padded to a power of two with
//! commitments to zero under a zero blinding (the identity point). A
//! confidential-asset output is proved on its own, with its asset tag as the
//! value base.

use crate::{
    constants::RANGE_PROOF_BITS, domain_separators::RANGE_PROOF_DOMAIN_TAG, CryptoError, Result,
    SerializationError,
};
use bulletproofs_og::{BulletproofGens, PedersenGens as BulletproofPedersenGens, RangeProof};
use merlin::Transcript;
use prv_crypto_ring_signature::{
    asset_generators, generators, CompressedRistretto, Identity, PedersenGens, RistrettoPoint,
    Scalar,
};
use rand_core::{CryptoRng, RngCore};

fn pedersen_gens(gens: &PedersenGens) -> BulletproofPedersenGens {
    BulletproofPedersenGens {
        B: gens.B,
        B_blinding: gens.B_blinding,
    }
}

/// Prove that every value lies in `[0, 2^64)`, for commitments
/// `value*G_VALUE + blinding*B_BLINDING`.
///
/// Returns the serialized proof and the commitments it was made over,
/// without padding. Empty input yields an empty proof.
pub fn generate_range_proof<R: CryptoRng + RngCore>(
    values: &[u64],
    blindings: &[Scalar],
    rng: &mut R,
) -> Result<(Vec<u8>, Vec<CompressedRistretto>)> {
    if values.len() != blindings.len() {
        return Err(SerializationError::LengthMismatch(blindings.len(), values.len()).into());
    }
    if values.is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }

    let padded_len = values.len().next_power_of_two();
    let mut values_padded = values.to_vec();
    values_padded.resize(padded_len, 0);
    let mut blindings_padded = blindings.to_vec();
    blindings_padded.resize(padded_len, Scalar::ZERO);

    let bp_gens = BulletproofGens::new(RANGE_PROOF_BITS, padded_len);
    let mut transcript = Transcript::new(RANGE_PROOF_DOMAIN_TAG);
    let (proof, mut commitments) = RangeProof::prove_multiple_with_rng(
        &bp_gens,
        &pedersen_gens(&generators()),
        &mut transcript,
        &values_padded,
        &blindings_padded,
        RANGE_PROOF_BITS,
        rng,
    )?;
    commitments.truncate(values.len());
    Ok((proof.to_bytes(), commitments))
}

/// Check an aggregated range proof over `commitments`.
pub fn check_range_proof<R: CryptoRng + RngCore>(
    proof: &[u8],
    commitments: &[CompressedRistretto],
    rng: &mut R,
) -> Result<()> {
    if commitments.is_empty() {
        return if proof.is_empty() {
            Ok(())
        } else {
            Err(CryptoError::RangeProof("proof without commitments".to_string()).into())
        };
    }

    let padded_len = commitments.len().next_power_of_two();
    let mut commitments_padded = commitments.to_vec();
    commitments_padded.resize(padded_len, RistrettoPoint::identity().compress());

    let proof = RangeProof::from_bytes(proof)?;
    let bp_gens = BulletproofGens::new(RANGE_PROOF_BITS, padded_len);
    let mut transcript = Transcript::new(RANGE_PROOF_DOMAIN_TAG);
    proof.verify_multiple_with_rng(
        &bp_gens,
        &pedersen_gens(&generators()),
        &mut transcript,
        &commitments_padded,
        RANGE_PROOF_BITS,
        rng,
    )?;
    Ok(())
}

/// Prove the value of one confidential-asset output, committed as
/// `value*asset_tag + blinding*B_BLINDING`.
pub fn generate_asset_range_proof<R: CryptoRng + RngCore>(
    value: u64,
    blinding: &Scalar,
    asset_tag: &RistrettoPoint,
    rng: &mut R,
) -> Result<(Vec<u8>, CompressedRistretto)> {
    let bp_gens = BulletproofGens::new(RANGE_PROOF_BITS, 1);
    let mut transcript = Transcript::new(RANGE_PROOF_DOMAIN_TAG);
    let (proof, commitment) = RangeProof::prove_single_with_rng(
        &bp_gens,
        &pedersen_gens(&asset_generators(asset_tag)),
        &mut transcript,
        value,
        blinding,
        RANGE_PROOF_BITS,
        rng,
    )?;
    Ok((proof.to_bytes(), commitment))
}

/// Check a confidential-asset output's range proof.
pub fn check_asset_range_proof<R: CryptoRng + RngCore>(
    proof: &[u8],
    commitment: &CompressedRistretto,
    asset_tag: &RistrettoPoint,
    rng: &mut R,
) -> Result<()> {
    let proof = RangeProof::from_bytes(proof)?;
    let bp_gens = BulletproofGens::new(RANGE_PROOF_BITS, 1);
    let mut transcript = Transcript::new(RANGE_PROOF_DOMAIN_TAG);
    proof.verify_single_with_rng(
        &bp_gens,
        &pedersen_gens(&asset_generators(asset_tag)),
        &mut transcript,
        commitment,
        RANGE_PROOF_BITS,
        rng,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, TokenId};
    use assert_matches::assert_matches;
    use prv_crypto_ring_signature::CompressedCommitment;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_aggregated_proof_over_odd_count() {
        let mut rng: StdRng = SeedableRng::from_seed([41u8; 32]);
        let values = [5u64, 0, u64::MAX];
        let blindings: Vec<Scalar> = values.iter().map(|_| Scalar::random(&mut rng)).collect();

        let (proof, commitments) = generate_range_proof(&values, &blindings, &mut rng).unwrap();
        assert_eq!(commitments.len(), 3);
        for ((value, blinding), commitment) in values.iter().zip(&blindings).zip(&commitments) {
            assert_eq!(
                CompressedCommitment::new(*value, *blinding, &generators()).point,
                *commitment
            );
        }
        check_range_proof(&proof, &commitments, &mut rng).unwrap();
    }

    #[test]
    fn test_wrong_commitments_fail() {
        let mut rng: StdRng = SeedableRng::from_seed([42u8; 32]);
        let blindings = [Scalar::random(&mut rng), Scalar::random(&mut rng)];
        let (proof, mut commitments) =
            generate_range_proof(&[1, 2], &blindings, &mut rng).unwrap();
        commitments.swap(0, 1);
        assert_matches!(
            check_range_proof(&proof, &commitments, &mut rng),
            Err(Error::Crypto(CryptoError::RangeProof(_)))
        );
    }

    #[test]
    fn test_empty_and_mismatched_inputs() {
        let mut rng: StdRng = SeedableRng::from_seed([43u8; 32]);
        let (proof, commitments) = generate_range_proof(&[], &[], &mut rng).unwrap();
        assert!(proof.is_empty() && commitments.is_empty());
        check_range_proof(&proof, &commitments, &mut rng).unwrap();

        assert_matches!(
            generate_range_proof(&[1], &[], &mut rng),
            Err(Error::Serialization(SerializationError::LengthMismatch(0, 1)))
        );
    }

    #[test]
    fn test_asset_proof_binds_asset_tag() {
        let mut rng: StdRng = SeedableRng::from_seed([44u8; 32]);
        let tag = TokenId::new([1u8; 32]).asset_generator();
        let other = TokenId::new([2u8; 32]).asset_generator();
        let blinding = Scalar::random(&mut rng);

        let (proof, commitment) =
            generate_asset_range_proof(77, &blinding, &tag, &mut rng).unwrap();
        check_asset_range_proof(&proof, &commitment, &tag, &mut rng).unwrap();
        assert!(check_asset_range_proof(&proof, &commitment, &other, &mut rng).is_err());
    }
}
