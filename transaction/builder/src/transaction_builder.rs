// Copyright (c) 2018-2025 The Botho Foundation

//! Utility for building and signing a payment.
//!
//! Version 1 inputs are either revealed and Schnorr-signed, or each hidden
//! in a ring of its own and balanced against a pseudo-output commitment.
//! Version 2 inputs share one ring. Moving a token other than the native
//! coin with v2 coins uses the confidential-asset ring and one range proof
//! per output.

use crate::{
    decoys::{prepare_decoys, DecoyProvider, RingParams},
    params::{common_version, InputCoin, TxPrivacyInitParams},
};
use prv_common::logger::TraceTime;
use prv_crypto_keys::CompressedRistrettoPublic;
use prv_crypto_ring_signature::{
    generators, CompressedCommitment, KeyImage, MlsagKind, Scalar, G_VALUE,
};
use prv_transaction_core::{
    coin::{new_output_coin, CoinV1, CoinVersion, OutputCoin},
    constants::{TX_VERSION_1, TX_VERSION_2},
    range_proofs::{generate_asset_range_proof, generate_range_proof},
    ring_ct::{build_ring, OutputSecret, RingIndexes},
    tx::{
        check_tx_size, AnyTx, AssetRangeProof, Proof, ProofV1, ProofV2, RangeProofData, Tx,
        TxHash, TxSigner, TxType, UnsignedTx,
    },
    CoinBase, PaymentInfo, PlainCoin, ProtocolConfig, ProtocolError, Result, TokenId,
    ValidationError,
};
use rand_core::{CryptoRng, RngCore};
use std::time::{SystemTime, UNIX_EPOCH};

/// A signed transaction with everything a caller submits or records.
#[derive(Clone, Debug)]
pub struct BuiltTx {
    /// The transaction.
    pub tx: AnyTx,
    /// Its hash, the canonical transaction id.
    pub hash: TxHash,
    /// Wire bytes.
    pub bytes: Vec<u8>,
    /// Key images of the coins it spends.
    pub spent_key_images: Vec<KeyImage>,
}

impl BuiltTx {
    pub(crate) fn new(tx: AnyTx, spent_key_images: Vec<KeyImage>, max_tx_size: usize) -> Result<Self> {
        let hash = tx.hash()?;
        let bytes = tx.to_bytes()?;
        check_tx_size(&bytes, max_tx_size)?;
        tracing::debug!(size = bytes.len(), inputs = spent_key_images.len(), "transaction built");
        Ok(Self {
            tx,
            hash,
            bytes,
            spent_key_images,
        })
    }
}

/// A populated transaction waiting for its signature.
pub(crate) struct PreparedTx {
    pub unsigned: UnsignedTx,
    pub spent_key_images: Vec<KeyImage>,
}

/// Builds transactions against a chain reached through `P`.
pub struct TransactionBuilder<'a, P> {
    config: &'a ProtocolConfig,
    provider: &'a P,
}

impl<'a, P: DecoyProvider> TransactionBuilder<'a, P> {
    /// A builder drawing decoys from `provider`.
    pub fn new(config: &'a ProtocolConfig, provider: &'a P) -> Self {
        Self { config, provider }
    }

    /// The protocol parameters.
    pub fn config(&self) -> &ProtocolConfig {
        self.config
    }

    /// Build, sign and serialize a payment.
    pub fn build_tx<R: CryptoRng + RngCore>(
        &self,
        params: TxPrivacyInitParams,
        rng: &mut R,
    ) -> Result<BuiltTx> {
        let _timer = TraceTime::new("build_tx");
        let prepared = self.prepare(&params, TxType::Normal, rng)?;
        let tx = prepared.unsigned.sign(rng)?;
        BuiltTx::new(AnyTx::Tx(tx), prepared.spent_key_images, self.config.max_tx_size)
    }

    /// Everything up to the signature: outputs with change, range proofs,
    /// rings and the published ring indexes.
    pub(crate) fn prepare<R: CryptoRng + RngCore>(
        &self,
        params: &TxPrivacyInitParams,
        tx_type: TxType,
        rng: &mut R,
    ) -> Result<PreparedTx> {
        params.validate(self.config)?;
        params.sender.require_spend_private_key()?;

        let Some(version) = common_version(&params.inputs)? else {
            return prepare_without_inputs(params, tx_type);
        };
        let outputs = with_change(params, params.change_amount()?);
        let token = params.token_id();
        tracing::debug!(
            %version,
            %token,
            inputs = params.inputs.len(),
            outputs = outputs.len(),
            fee = params.fee,
            "preparing transaction"
        );

        let (tx, signer) = match version {
            CoinVersion::V1 if params.has_privacy => {
                self.prepare_v1_private(params, &outputs, tx_type, rng)?
            }
            CoinVersion::V1 => prepare_v1_clear(params, &outputs, tx_type, rng)?,
            CoinVersion::V2 if token.is_native() => {
                self.prepare_v2(params, &outputs, tx_type, rng)?
            }
            CoinVersion::V2 => {
                self.prepare_v2_confidential_asset(params, &outputs, &token, tx_type, rng)?
            }
        };
        finish(params, tx, signer)
    }

    fn decoys(
        &self,
        params: &TxPrivacyInitParams,
        pool: &TokenId,
        count: usize,
        kind: MlsagKind,
    ) -> Result<RingParams> {
        let shard = params
            .sender
            .payment_address()
            .shard_id(self.config.num_shards);
        let exclude: Vec<u64> = params.inputs.iter().map(|input| input.index).collect();
        prepare_decoys(self.provider, shard, pool, count, &exclude, kind)
    }

    fn prepare_v1_private<R: CryptoRng + RngCore>(
        &self,
        params: &TxPrivacyInitParams,
        outputs: &[PaymentInfo],
        tx_type: TxType,
        rng: &mut R,
    ) -> Result<(Tx, TxSigner)> {
        let new_outputs: Vec<_> = outputs
            .iter()
            .map(|info| CoinV1::new_output(info, true, rng))
            .collect();
        let values: Vec<u64> = new_outputs.iter().map(|o| o.value).collect();
        let blindings: Vec<Scalar> = new_outputs.iter().map(|o| o.randomness).collect();
        let (range_proof, _) = generate_range_proof(&values, &blindings, rng)?;

        let n_in = params.inputs.len();
        let ring_size = self.config.ring_size;
        let decoys = self.decoys(
            params,
            &params.token_id(),
            (ring_size - 1) * n_in,
            MlsagKind::Plain,
        )?;

        // Pseudo-output blindings sum to the output blindings, so the
        // pseudo-outputs balance the outputs plus the fee.
        let output_blinding: Scalar = blindings.iter().sum();
        let mut pseudo_blindings: Vec<Scalar> = (1..n_in).map(|_| Scalar::random(rng)).collect();
        let partial: Scalar = pseudo_blindings.iter().sum();
        pseudo_blindings.push(output_blinding - partial);

        let mut rings = Vec::with_capacity(n_in);
        let mut columns = Vec::with_capacity(n_in);
        let mut pseudo_outputs = Vec::with_capacity(n_in);
        for ((input, run), blinding) in params
            .inputs
            .iter()
            .zip(decoys.split(n_in))
            .zip(pseudo_blindings)
        {
            let real = input.real_input(Scalar::ZERO)?;
            let pseudo = OutputSecret {
                commitment: generators().commit(Scalar::from(real.value), blinding),
                value: real.value,
                randomness: blinding,
                asset_tag: None,
                asset_blinder: Scalar::ZERO,
            };
            pseudo_outputs.push(CompressedCommitment {
                point: pseudo.commitment.compress(),
            });
            let built = build_ring(
                MlsagKind::Plain,
                &[real],
                &run,
                &[pseudo],
                0,
                &G_VALUE,
                ring_size,
                rng,
            )?;
            columns.push(built.indexes.column(0));
            rings.push(built.signable);
        }

        let mut tx = Tx::new(TX_VERSION_1, tx_type, lock_time(params), params.fee)?;
        tx.sig_pub_key = RingIndexes::from_columns(columns)?.to_bytes()?;
        tx.proof = Some(Proof::V1(ProofV1 {
            revealed_inputs: Vec::new(),
            pseudo_outputs,
            output_coins: new_outputs.into_iter().map(|o| o.coin).collect(),
            range_proof,
        }));
        Ok((tx, TxSigner::MlsagPerInput(rings)))
    }

    fn prepare_v2<R: CryptoRng + RngCore>(
        &self,
        params: &TxPrivacyInitParams,
        outputs: &[PaymentInfo],
        tx_type: TxType,
        rng: &mut R,
    ) -> Result<(Tx, TxSigner)> {
        if let Some(input) = params.inputs.iter().find(|i| i.coin.asset_tag().is_some()) {
            tracing::warn!(index = input.index, "confidential-asset coin in a native payment");
            return Err(ProtocolError::TokenMismatch.into());
        }
        let new_outputs = new_v2_outputs(outputs, None, self.config, rng)?;
        let values: Vec<u64> = new_outputs.iter().map(|o| o.value).collect();
        let blindings: Vec<Scalar> = new_outputs.iter().map(|o| o.randomness).collect();
        let (range_proof, _) = generate_range_proof(&values, &blindings, rng)?;

        let inputs = params
            .inputs
            .iter()
            .map(|input| input.real_input(Scalar::ZERO))
            .collect::<Result<Vec<_>>>()?;
        let decoys = self.decoys(
            params,
            &TokenId::NATIVE,
            (self.config.ring_size - 1) * inputs.len(),
            MlsagKind::Plain,
        )?;
        let secrets: Vec<OutputSecret> = new_outputs.iter().map(OutputSecret::from).collect();
        let built = build_ring(
            MlsagKind::Plain,
            &inputs,
            decoys.decoys().members(),
            &secrets,
            params.fee,
            &G_VALUE,
            self.config.ring_size,
            rng,
        )?;

        let mut tx = Tx::new(TX_VERSION_2, tx_type, lock_time(params), params.fee)?;
        tx.sig_pub_key = built.indexes.to_bytes()?;
        tx.proof = Some(Proof::V2(ProofV2 {
            output_coins: new_outputs.into_iter().map(|o| o.coin).collect(),
            range_proof: RangeProofData::Aggregated(range_proof),
        }));
        Ok((tx, TxSigner::Mlsag(built.signable)))
    }

    fn prepare_v2_confidential_asset<R: CryptoRng + RngCore>(
        &self,
        params: &TxPrivacyInitParams,
        outputs: &[PaymentInfo],
        token: &TokenId,
        tx_type: TxType,
        rng: &mut R,
    ) -> Result<(Tx, TxSigner)> {
        if params.fee != 0 {
            return Err(ValidationError::NonZeroTokenFee(params.fee).into());
        }
        let raw_tag = token.asset_generator();

        let inputs = params
            .inputs
            .iter()
            .map(|input| {
                let PlainCoin::V2(coin) = &input.coin else {
                    return Err(ProtocolError::WrongCoinVersion(input.version().as_u8()).into());
                };
                let blinder = coin.asset_blinder_for(&raw_tag)?;
                if blinder == Scalar::ZERO {
                    tracing::warn!(index = input.index, "spending an unblinded confidential-asset coin");
                }
                input.real_input(blinder)
            })
            .collect::<Result<Vec<_>>>()?;

        let new_outputs = new_v2_outputs(outputs, Some(token), self.config, rng)?;
        let range_proofs = asset_range_proofs(&new_outputs, rng)?;

        let decoys = self.decoys(
            params,
            &TokenId::CONFIDENTIAL_ASSET,
            (self.config.ring_size - 1) * inputs.len(),
            MlsagKind::ConfidentialAsset,
        )?;
        let secrets: Vec<OutputSecret> = new_outputs.iter().map(OutputSecret::from).collect();
        let built = build_ring(
            MlsagKind::ConfidentialAsset,
            &inputs,
            decoys.decoys().members(),
            &secrets,
            0,
            &raw_tag,
            self.config.ring_size,
            rng,
        )?;

        let mut tx = Tx::new(TX_VERSION_2, tx_type, lock_time(params), 0)?;
        tx.sig_pub_key = built.indexes.to_bytes()?;
        tx.proof = Some(Proof::V2(ProofV2 {
            output_coins: new_outputs.into_iter().map(|o| o.coin).collect(),
            range_proof: RangeProofData::PerOutput(range_proofs),
        }));
        Ok((tx, TxSigner::Mlsag(built.signable)))
    }
}

/// The payments, plus change to the sender when there is some.
fn with_change(params: &TxPrivacyInitParams, change: u64) -> Vec<PaymentInfo> {
    let mut outputs = params.payment_infos.clone();
    if change > 0 {
        outputs.push(PaymentInfo::new(*params.sender.payment_address(), change));
    }
    outputs
}

pub(crate) fn lock_time(params: &TxPrivacyInitParams) -> i64 {
    params.lock_time.unwrap_or_else(now)
}

pub(crate) fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or_default()
}

pub(crate) fn new_v2_outputs<R: CryptoRng + RngCore>(
    outputs: &[PaymentInfo],
    token: Option<&TokenId>,
    config: &ProtocolConfig,
    rng: &mut R,
) -> Result<Vec<OutputCoin>> {
    outputs
        .iter()
        .enumerate()
        .map(|(index, info)| new_output_coin(info, index as u32, token, config, rng))
        .collect()
}

pub(crate) fn asset_range_proofs<R: CryptoRng + RngCore>(
    outputs: &[OutputCoin],
    rng: &mut R,
) -> Result<Vec<AssetRangeProof>> {
    outputs
        .iter()
        .map(|output| {
            let tag = output.asset_tag.ok_or(ProtocolError::TokenMismatch)?;
            let (proof, _) = generate_asset_range_proof(output.value, &output.randomness, &tag, rng)?;
            Ok(AssetRangeProof { proof })
        })
        .collect()
}

/// A zero-input transaction: nothing to spend, nothing to prove, only the
/// sender's Schnorr signature.
fn prepare_without_inputs(params: &TxPrivacyInitParams, tx_type: TxType) -> Result<PreparedTx> {
    if params.has_privacy {
        return Err(ValidationError::NoInputs.into());
    }
    let required = params.required_amount()?;
    if required > 0 {
        return Err(ValidationError::InsufficientFunds {
            available: 0,
            required,
        }
        .into());
    }
    let spend_key = params.sender.require_spend_private_key()?;
    let mut tx = Tx::new(TX_VERSION_1, tx_type, lock_time(params), 0)?;
    tx.sig_pub_key = params
        .sender
        .payment_address()
        .spend_public_key()
        .to_bytes()
        .to_vec();
    tracing::debug!("no inputs, signing without proof");
    finish(params, tx, TxSigner::Schnorr(spend_key.clone()))
}

fn prepare_v1_clear<R: CryptoRng + RngCore>(
    params: &TxPrivacyInitParams,
    outputs: &[PaymentInfo],
    tx_type: TxType,
    rng: &mut R,
) -> Result<(Tx, TxSigner)> {
    let spend_key = params.sender.require_spend_private_key()?;
    let owner = params.sender.payment_address().spend_public_key();
    let compressed_owner = CompressedRistrettoPublic::from(owner);
    let revealed_inputs = params
        .inputs
        .iter()
        .map(|input| input.reveal(&compressed_owner))
        .collect::<Result<Vec<_>>>()?;
    let output_coins = outputs
        .iter()
        .map(|info| CoinV1::new_output(info, false, rng).coin)
        .collect();

    let mut tx = Tx::new(TX_VERSION_1, tx_type, lock_time(params), params.fee)?;
    tx.sig_pub_key = owner.to_bytes().to_vec();
    tx.proof = Some(Proof::V1(ProofV1 {
        revealed_inputs,
        output_coins,
        ..Default::default()
    }));
    Ok((tx, TxSigner::Schnorr(spend_key.clone())))
}

/// Sender byte, info, metadata and the spent key images.
fn finish(params: &TxPrivacyInitParams, mut tx: Tx, signer: TxSigner) -> Result<PreparedTx> {
    let sender = CompressedRistrettoPublic::from(params.sender.payment_address().spend_public_key());
    tx.pub_key_last_byte_sender = sender.last_byte();
    tx.set_info(&params.info)?;
    tx.metadata = params.metadata.clone();

    let spent_key_images = params
        .inputs
        .iter()
        .map(InputCoin::key_image)
        .collect::<Result<Vec<_>>>()?;
    let mut unsigned = UnsignedTx::new(tx, signer);
    if let Some(key) = &params.metadata_key {
        unsigned = unsigned.with_metadata_key(key.clone());
    }
    Ok(PreparedTx {
        unsigned,
        spent_key_images,
    })
}
