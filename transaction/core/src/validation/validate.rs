// Copyright (c) 2018-2025 The Botho Foundation

use crate::{
    coin::{Coin, CoinBase, CoinV1Opening, CoinV2},
    constants::{MAX_INPUTS, MAX_PAYMENT_INFOS, TX_VERSION_2},
    domain_separators::TX_SCHNORR_CONTEXT,
    range_proofs::{check_asset_range_proof, check_range_proof},
    ring_ct::{ring_from_members, OutputPoints, RingIndexes, RingMember},
    tx::{
        decode_signature_list, AnyTx, Proof, RangeProofData, RevealedInput, SignatureScheme,
        TokenType, Tx, TxHash, TxToken, TxType,
    },
    CryptoError, ProtocolError, Result, SerializationError, TokenId, ValidationError,
};
use prv_crypto_keys::{RistrettoPublic, RistrettoSignature};
use prv_crypto_ring_signature::{
    generators, scalar_from_bytes, CompressedCommitment, Identity, Mlsag, MlsagKind, RistrettoPoint,
    Scalar, B_BLINDING, G_VALUE,
};
use rand_core::{CryptoRng, RngCore};
use std::collections::HashSet;

/// Chain lookups needed to rebuild rings from published indexes.
pub trait RingMemberSource {
    /// The coin at `index` in the pool of `token`.
    fn coin(&self, token: &TokenId, index: u64) -> Option<Coin>;
}

/// Verify a decoded transaction of any kind.
pub fn validate<S: RingMemberSource, R: CryptoRng + RngCore>(
    tx: &AnyTx,
    source: &S,
    rng: &mut R,
) -> Result<()> {
    match tx {
        AnyTx::Tx(tx) => validate_tx(tx, &tx.hash()?, source, &TokenId::NATIVE, rng),
        AnyTx::Token(tx) => validate_tx_token(tx, source, rng),
    }
}

/// Verify a version 1 or 2 transaction signed over `message`.
///
/// Plain rings are rebuilt from the pool of `token`; confidential-asset
/// rings always come from the umbrella pool.
pub fn validate_tx<S: RingMemberSource, R: CryptoRng + RngCore>(
    tx: &Tx,
    message: &TxHash,
    source: &S,
    token: &TokenId,
    rng: &mut R,
) -> Result<()> {
    check_tx(tx, message, source, token, false, rng)
}

/// Verify both halves of a token transaction against its parent hash.
pub fn validate_tx_token<S: RingMemberSource, R: CryptoRng + RngCore>(
    tx: &TxToken,
    source: &S,
    rng: &mut R,
) -> Result<()> {
    if tx.fee_tx.version != tx.token_tx.version {
        return Err(ProtocolError::VersionMismatch {
            fee: tx.fee_tx.version,
            token: tx.token_tx.version,
        }
        .into());
    }
    let minting = tx.token_data.token_type == TokenType::Init;
    if minting && tx.version == TX_VERSION_2 {
        return Err(ProtocolError::TokenInitRequiresV1.into());
    }
    if tx.tx_type == TxType::TokenConversion && !matches!(tx.fee_tx.proof, Some(Proof::V2(_))) {
        return Err(ProtocolError::ConversionFeeNotV2.into());
    }
    if tx
        .fee_tx
        .output_coins()
        .iter()
        .any(|coin| coin.asset_tag().is_some())
    {
        return Err(ProtocolError::FeeNotNative.into());
    }

    let message = tx.hash()?;
    check_tx(&tx.fee_tx, &message, source, &TokenId::NATIVE, false, rng)?;
    check_tx(&tx.token_tx, &message, source, tx.token_id(), minting, rng)?;
    validate_token_key_images_are_unique(tx)
}

fn check_tx<S: RingMemberSource, R: CryptoRng + RngCore>(
    tx: &Tx,
    message: &TxHash,
    source: &S,
    token: &TokenId,
    minting: bool,
    rng: &mut R,
) -> Result<()> {
    if let Some(metadata) = &tx.metadata {
        metadata.verify(message)?;
    }
    validate_number_of_outputs(tx)?;
    if let Some(proof) = &tx.proof {
        validate_range_proofs(proof, rng)?;
        validate_revealed_inputs(proof.revealed_inputs(), source, token)?;
    }

    match tx.signature_scheme() {
        SignatureScheme::Schnorr => {
            validate_schnorr_signature(tx, message)?;
            validate_open_balance(tx, token, minting)?;
        }
        SignatureScheme::Mlsag => validate_ring_signature(tx, message, source, token)?,
        SignatureScheme::MlsagPerInput => validate_per_input_signatures(tx, message, source, token)?,
    }
    validate_key_images_are_unique(tx)?;
    validate_outputs_public_keys_are_unique(tx)?;
    tracing::debug!(version = tx.version, tx_type = %tx.tx_type, "transaction verified");
    Ok(())
}

/// The number of inputs must not exceed [`MAX_INPUTS`].
pub fn validate_number_of_inputs(count: usize) -> Result<()> {
    if count > MAX_INPUTS {
        return Err(ValidationError::TooManyInputs(count, MAX_INPUTS).into());
    }
    Ok(())
}

/// The outputs must not exceed [`MAX_PAYMENT_INFOS`] plus one change output.
pub fn validate_number_of_outputs(tx: &Tx) -> Result<()> {
    let count = tx.output_coins().len();
    if count > MAX_PAYMENT_INFOS + 1 {
        return Err(ValidationError::TooManyPaymentInfos(count, MAX_PAYMENT_INFOS + 1).into());
    }
    Ok(())
}

/// All key images within the transaction must be unique.
pub fn validate_key_images_are_unique(tx: &Tx) -> Result<()> {
    check_unique(&tx.key_images()?, ValidationError::DuplicateKeyImage)
}

/// Key images must be unique across both halves of a token transaction.
pub fn validate_token_key_images_are_unique(tx: &TxToken) -> Result<()> {
    check_unique(&tx.key_images()?, ValidationError::DuplicateKeyImage)
}

/// All output public keys within the transaction must be unique.
pub fn validate_outputs_public_keys_are_unique(tx: &Tx) -> Result<()> {
    let keys: Vec<_> = tx
        .output_coins()
        .iter()
        .map(|coin| *coin.public_key())
        .collect();
    check_unique(&keys, ValidationError::DuplicateOutputPublicKey)
}

/// Check the range proofs of a proof's outputs.
///
/// Outputs in the clear need none; their openings are checked instead.
pub fn validate_range_proofs<R: CryptoRng + RngCore>(proof: &Proof, rng: &mut R) -> Result<()> {
    match proof {
        Proof::V1(proof) if proof.pseudo_outputs.is_empty() => {
            if !proof.range_proof.is_empty() {
                return Err(ProtocolError::UnexpectedProof.into());
            }
            for coin in &proof.output_coins {
                let CoinV1Opening::Clear { value, randomness } = &coin.opening else {
                    return Err(ProtocolError::UnexpectedProof.into());
                };
                let randomness = scalar_from_bytes(randomness)?;
                if CompressedCommitment::new(*value, randomness, &generators()) != coin.commitment {
                    return Err(CryptoError::CommitmentMismatch.into());
                }
            }
            Ok(())
        }
        Proof::V1(v1) => check_range_proof(&v1.range_proof, &proof.output_commitments(), rng),
        Proof::V2(proof) => check_v2_range_proofs(&proof.output_coins, &proof.range_proof, rng),
        Proof::Conversion(proof) => {
            check_v2_range_proofs(&proof.output_coins, &proof.range_proof, rng)
        }
    }
}

fn check_v2_range_proofs<R: CryptoRng + RngCore>(
    outputs: &[CoinV2],
    range_proof: &RangeProofData,
    rng: &mut R,
) -> Result<()> {
    for coin in outputs.iter().filter(|coin| coin.is_burn()) {
        check_burn_opening(coin)?;
    }
    match range_proof {
        RangeProofData::Aggregated(bytes) => {
            if outputs.iter().any(|coin| coin.asset_tag.is_some()) {
                return Err(ProtocolError::UnexpectedProof.into());
            }
            let commitments: Vec<_> = outputs.iter().map(|c| c.commitment.point).collect();
            check_range_proof(bytes, &commitments, rng)
        }
        RangeProofData::PerOutput(proofs) => {
            if proofs.len() != outputs.len() {
                return Err(SerializationError::LengthMismatch(proofs.len(), outputs.len()).into());
            }
            for (coin, proof) in outputs.iter().zip(proofs) {
                let tag = coin
                    .asset_tag
                    .as_ref()
                    .ok_or(ProtocolError::UnexpectedProof)?
                    .decompress()?;
                check_asset_range_proof(&proof.proof, &coin.commitment.point, &tag, rng)?;
            }
            Ok(())
        }
    }
}

fn check_burn_opening(coin: &CoinV2) -> Result<()> {
    let gens = match &coin.asset_tag {
        Some(tag) => prv_crypto_ring_signature::asset_generators(&tag.decompress()?),
        None => generators(),
    };
    let randomness = scalar_from_bytes(&coin.randomness)?;
    if CompressedCommitment::new(coin.amount, randomness, &gens) != coin.commitment {
        return Err(CryptoError::CommitmentMismatch.into());
    }
    Ok(())
}

/// Revealed inputs must be the chain's coins at their stated indexes, and
/// open to their stated values.
pub fn validate_revealed_inputs<S: RingMemberSource>(
    inputs: &[RevealedInput],
    source: &S,
    token: &TokenId,
) -> Result<()> {
    validate_number_of_inputs(inputs.len())?;
    let indexes: Vec<u64> = inputs.iter().map(|input| input.index).collect();
    check_unique(&indexes, ValidationError::DuplicateInput)?;
    for input in inputs {
        match source.coin(token, input.index) {
            Some(Coin::V1(coin)) if coin == input.coin => {}
            _ => return Err(ProtocolError::UnknownRingMember(input.index).into()),
        }
        input.check_opening()?;
    }
    Ok(())
}

/// Check the Schnorr signature against `SigPubKey`; revealed inputs must
/// belong to that key.
pub fn validate_schnorr_signature(tx: &Tx, message: &TxHash) -> Result<()> {
    let public_key = RistrettoPublic::try_from(&tx.sig_pub_key[..])?;
    let sig =
        RistrettoSignature::try_from(&tx.sig[..]).map_err(|_| CryptoError::InvalidSignature)?;
    public_key
        .verify_schnorrkel(TX_SCHNORR_CONTEXT, message, &sig)
        .map_err(|_| CryptoError::InvalidSignature)?;

    let owner = public_key.to_bytes();
    let inputs = tx.proof.as_ref().map(Proof::revealed_inputs).unwrap_or(&[]);
    if inputs.iter().any(|input| *input.coin.public_key.as_bytes() != owner) {
        return Err(CryptoError::CoinNotOwned.into());
    }
    Ok(())
}

/// Balance of transactions whose inputs are revealed.
///
/// Plain: the revealed input values equal the clear output values plus the
/// fee; both sides' openings are checked elsewhere. Conversion: `Σ C_out +
/// fee*G_VALUE == (Σ v_in)*base + balance_blinding*B_BLINDING`, `base` being
/// the token's asset generator for confidential-asset outputs. A token init
/// mints, so its outputs are not balanced.
pub fn validate_open_balance(tx: &Tx, token: &TokenId, minting: bool) -> Result<()> {
    let fee = Scalar::from(tx.fee) * *G_VALUE;
    match &tx.proof {
        None => {
            if tx.fee != 0 {
                return Err(CryptoError::BalanceMismatch.into());
            }
            Ok(())
        }
        Some(Proof::V1(proof)) => {
            if minting && proof.revealed_inputs.is_empty() {
                return Ok(());
            }
            let inputs = checked_sum(proof.revealed_inputs.iter().map(|i| i.value))?;
            let outputs = proof
                .output_coins
                .iter()
                .map(|coin| match &coin.opening {
                    CoinV1Opening::Clear { value, .. } => Ok(*value),
                    CoinV1Opening::Encrypted(_) => Err(ProtocolError::UnexpectedProof.into()),
                })
                .collect::<Result<Vec<u64>>>()?;
            let outputs = checked_sum(outputs.into_iter().chain([tx.fee]))?;
            if inputs != outputs {
                return Err(CryptoError::BalanceMismatch.into());
            }
            Ok(())
        }
        Some(Proof::Conversion(proof)) => {
            let total_in = checked_sum(proof.revealed_inputs.iter().map(|i| i.value))?;
            let base = if proof.output_coins.iter().any(|c| c.asset_tag.is_some()) {
                token.asset_generator()
            } else {
                *G_VALUE
            };
            let outputs = sum_commitments(proof.output_coins.iter().map(|c| &c.commitment))?;
            let expected =
                Scalar::from(total_in) * base + proof.balance_blinding()? * *B_BLINDING;
            if outputs + fee != expected {
                return Err(CryptoError::BalanceMismatch.into());
            }
            Ok(())
        }
        Some(Proof::V2(_)) => Err(ProtocolError::UnexpectedProof.into()),
    }
}

fn checked_sum(mut values: impl Iterator<Item = u64>) -> Result<u64> {
    values
        .try_fold(0u64, |acc, value| acc.checked_add(value))
        .ok_or_else(|| ValidationError::AmountOverflow.into())
}

fn sum_commitments<'a>(
    commitments: impl Iterator<Item = &'a CompressedCommitment>,
) -> Result<RistrettoPoint> {
    commitments.fold(Ok(RistrettoPoint::identity()), |acc, commitment| {
        let point = commitment
            .point
            .decompress()
            .ok_or(CryptoError::InvalidPoint)?;
        Ok(acc? + point)
    })
}

fn rebuild_rows<S: RingMemberSource>(
    indexes: &RingIndexes,
    source: &S,
    token: &TokenId,
) -> Result<Vec<Vec<RingMember>>> {
    indexes
        .as_rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|index| {
                    let coin = source
                        .coin(token, *index)
                        .ok_or(ProtocolError::UnknownRingMember(*index))?;
                    RingMember::from_coin(*index, &coin)
                })
                .collect()
        })
        .collect()
}

fn output_points(tx: &Tx) -> Result<Vec<OutputPoints>> {
    tx.output_coins()
        .iter()
        .map(|coin| {
            Ok(OutputPoints {
                commitment: coin
                    .commitment()
                    .point
                    .decompress()
                    .ok_or(CryptoError::InvalidPoint)?,
                asset_tag: coin.asset_tag().map(|tag| tag.decompress()).transpose()?,
            })
        })
        .collect()
}

/// Rebuild the single ring of a version 2 transaction and verify its MLSAG.
pub fn validate_ring_signature<S: RingMemberSource>(
    tx: &Tx,
    message: &TxHash,
    source: &S,
    token: &TokenId,
) -> Result<()> {
    let sig = Mlsag::from_bytes(&tx.sig)?;
    let indexes = RingIndexes::from_bytes(&tx.sig_pub_key)?;
    validate_number_of_inputs(indexes.columns())?;

    let (pool, fee_base) = match sig.kind() {
        MlsagKind::Plain => (*token, *G_VALUE),
        MlsagKind::ConfidentialAsset => {
            if tx.fee != 0 {
                return Err(ValidationError::NonZeroTokenFee(tx.fee).into());
            }
            (TokenId::CONFIDENTIAL_ASSET, RistrettoPoint::identity())
        }
    };
    let rows = rebuild_rows(&indexes, source, &pool)?;
    let ring = ring_from_members(sig.kind(), &rows, &output_points(tx)?, tx.fee, &fee_base)?;
    sig.verify(message, &ring)?;
    Ok(())
}

/// Verify the per-input rings of a private version 1 transaction and the
/// balance of its pseudo-outputs.
pub fn validate_per_input_signatures<S: RingMemberSource>(
    tx: &Tx,
    message: &TxHash,
    source: &S,
    token: &TokenId,
) -> Result<()> {
    let Some(Proof::V1(proof)) = &tx.proof else {
        return Err(ProtocolError::UnexpectedProof.into());
    };
    let signatures = decode_signature_list(&tx.sig)?;
    let indexes = RingIndexes::from_bytes(&tx.sig_pub_key)?;
    let inputs = proof.pseudo_outputs.len();
    validate_number_of_inputs(inputs)?;
    if signatures.len() != inputs || indexes.columns() != inputs {
        return Err(SerializationError::LengthMismatch(signatures.len(), inputs).into());
    }

    let rows = rebuild_rows(&indexes, source, token)?;
    let mut pseudo_sum = RistrettoPoint::identity();
    for (j, (bytes, pseudo)) in signatures.iter().zip(&proof.pseudo_outputs).enumerate() {
        let pseudo = pseudo.point.decompress().ok_or(CryptoError::InvalidPoint)?;
        pseudo_sum += pseudo;
        let column: Vec<Vec<RingMember>> = rows.iter().map(|row| vec![row[j]]).collect();
        let ring = ring_from_members(
            MlsagKind::Plain,
            &column,
            &[OutputPoints {
                commitment: pseudo,
                asset_tag: None,
            }],
            0,
            &G_VALUE,
        )?;
        Mlsag::from_bytes(bytes)?.verify(message, &ring)?;
    }

    let outputs = sum_commitments(proof.output_coins.iter().map(|c| &c.commitment))?;
    if pseudo_sum != outputs + Scalar::from(tx.fee) * *G_VALUE {
        return Err(CryptoError::BalanceMismatch.into());
    }
    Ok(())
}

fn check_unique<T: Eq + core::hash::Hash>(values: &[T], err: ValidationError) -> Result<()> {
    let mut uniques = HashSet::new();
    for x in values {
        if !uniques.insert(x) {
            return Err(err.into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        coin::CoinV1,
        tx::{ProofV1, TxSigner, UnsignedTx},
        Error, PaymentInfo,
    };
    use assert_matches::assert_matches;
    use prv_account_keys::AccountKey;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashMap;

    #[derive(Default)]
    struct Chain(HashMap<(TokenId, u64), Coin>);

    impl RingMemberSource for Chain {
        fn coin(&self, token: &TokenId, index: u64) -> Option<Coin> {
            self.0.get(&(*token, index)).cloned()
        }
    }

    fn clear_transfer(
        value_in: u64,
        value_out: u64,
        fee: u64,
        rng: &mut StdRng,
    ) -> (Tx, Chain, AccountKey) {
        let sender = AccountKey::random(rng);
        let input = CoinV1::new_output(&PaymentInfo::new(sender.public_address(), value_in), false, rng);
        let output = CoinV1::new_output(&PaymentInfo::new(sender.public_address(), value_out), false, rng);

        let mut chain = Chain::default();
        chain.0.insert((TokenId::NATIVE, 3), Coin::V1(input.coin.clone()));

        let mut tx = Tx::new(1, TxType::Normal, 0, fee).unwrap();
        tx.sig_pub_key = sender.public_address().spend_public_key().to_bytes().to_vec();
        tx.proof = Some(Proof::V1(ProofV1 {
            revealed_inputs: vec![RevealedInput {
                index: 3,
                coin: input.coin,
                value: input.value,
                randomness: input.randomness.to_bytes(),
            }],
            output_coins: vec![output.coin],
            ..Default::default()
        }));
        let signer = TxSigner::Schnorr(sender.spend_private_key().clone());
        let tx = UnsignedTx::new(tx, signer).sign(rng).unwrap();
        (tx, chain, sender)
    }

    #[test]
    fn test_clear_transfer_verifies() {
        prv_common::logger::init_test_logging();
        let mut rng: StdRng = SeedableRng::from_seed([71u8; 32]);
        let (tx, chain, _) = clear_transfer(50, 40, 10, &mut rng);
        validate(&AnyTx::Tx(tx), &chain, &mut rng).unwrap();
    }

    #[test]
    fn test_clear_transfer_must_balance() {
        let mut rng: StdRng = SeedableRng::from_seed([72u8; 32]);
        let (tx, chain, _) = clear_transfer(50, 45, 10, &mut rng);
        assert_matches!(
            validate(&AnyTx::Tx(tx), &chain, &mut rng),
            Err(Error::Crypto(CryptoError::BalanceMismatch))
        );
    }

    #[test]
    fn test_revealed_input_spent_twice() {
        let mut rng: StdRng = SeedableRng::from_seed([76u8; 32]);
        let (mut tx, chain, sender) = clear_transfer(50, 90, 10, &mut rng);
        let Some(Proof::V1(proof)) = tx.proof.as_mut() else {
            panic!("clear transfer carries a v1 proof");
        };
        let input = proof.revealed_inputs[0].clone();
        proof.revealed_inputs.push(input);
        let signer = TxSigner::Schnorr(sender.spend_private_key().clone());
        let tx = UnsignedTx::new(tx, signer).sign(&mut rng).unwrap();

        assert_matches!(
            validate(&AnyTx::Tx(tx), &chain, &mut rng),
            Err(Error::Validation(ValidationError::DuplicateInput))
        );
    }

    #[test]
    fn test_tampered_tx_fails_signature() {
        let mut rng: StdRng = SeedableRng::from_seed([73u8; 32]);
        let (mut tx, chain, _) = clear_transfer(50, 40, 10, &mut rng);
        tx.lock_time = 99;
        assert_matches!(
            validate(&AnyTx::Tx(tx), &chain, &mut rng),
            Err(Error::Crypto(CryptoError::InvalidSignature))
        );
    }

    #[test]
    fn test_unknown_revealed_input() {
        let mut rng: StdRng = SeedableRng::from_seed([74u8; 32]);
        let (tx, _, _) = clear_transfer(50, 40, 10, &mut rng);
        assert_matches!(
            validate(&AnyTx::Tx(tx), &Chain::default(), &mut rng),
            Err(Error::Protocol(ProtocolError::UnknownRingMember(3)))
        );
    }

    #[test]
    fn test_check_unique() {
        check_unique(&[1, 2, 3], ValidationError::DuplicateKeyImage).unwrap();
        assert_matches!(
            check_unique(&[1, 2, 1], ValidationError::DuplicateKeyImage),
            Err(Error::Validation(ValidationError::DuplicateKeyImage))
        );
    }

    #[test]
    fn test_too_many_inputs() {
        validate_number_of_inputs(MAX_INPUTS).unwrap();
        assert_matches!(
            validate_number_of_inputs(MAX_INPUTS + 1),
            Err(Error::Validation(ValidationError::TooManyInputs(256, 255)))
        );
    }
}
