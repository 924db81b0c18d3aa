// Copyright (c) 2018-2025 The Botho Foundation

//! Conversions: version 1 coins revealed and re-issued as version 2 coins of
//! equal value, signed by the owner's key.

use crate::{
    decoys::DecoyProvider,
    params::{
        common_version, total_input, ConversionParams, InputCoin, TokenConversionParams,
        TxPrivacyInitParams,
    },
    transaction_builder::{
        asset_range_proofs, new_v2_outputs, now, BuiltTx, PreparedTx, TransactionBuilder,
    },
};
use prv_account_keys::KeySet;
use prv_crypto_keys::CompressedRistrettoPublic;
use prv_crypto_ring_signature::Scalar;
use prv_transaction_core::{
    coin::{CoinVersion, OutputCoin},
    constants::TX_VERSION_2,
    range_proofs::generate_range_proof,
    total_amount,
    tx::{
        AnyTx, ConversionProof, Proof, RangeProofData, TokenData, TokenType, Tx, TxSigner, TxType,
        UnsignedTx,
    },
    CoinBase, PaymentInfo, ProtocolError, Result, ValidationError,
};
use rand_core::{CryptoRng, RngCore};

impl<'a, P: DecoyProvider> TransactionBuilder<'a, P> {
    /// Convert version 1 native coins into version 2 coins.
    pub fn build_conversion_tx<R: CryptoRng + RngCore>(
        &self,
        params: ConversionParams,
        rng: &mut R,
    ) -> Result<BuiltTx> {
        params.validate(self.config())?;
        check_conversion_inputs(&params.inputs, &params.payment_infos, params.fee)?;
        let lock_time = params.lock_time.unwrap_or_else(now);

        let outputs = new_v2_outputs(&params.payment_infos, None, self.config(), rng)?;
        let values: Vec<u64> = outputs.iter().map(|o| o.value).collect();
        let blindings: Vec<Scalar> = outputs.iter().map(|o| o.randomness).collect();
        let (range_proof, _) = generate_range_proof(&values, &blindings, rng)?;
        let balance_blinding: Scalar = blindings.iter().sum();

        let prepared = prepare_conversion(
            &params.sender,
            &params.inputs,
            outputs,
            RangeProofData::Aggregated(range_proof),
            balance_blinding,
            params.fee,
            lock_time,
            &params.info,
        )?;
        let tx = prepared.unsigned.sign(rng)?;
        BuiltTx::new(AnyTx::Tx(tx), prepared.spent_key_images, self.config().max_tx_size)
    }

    /// Convert version 1 token coins into confidential-asset coins, paying
    /// the fee from version 2 native coins.
    ///
    /// The token transaction publishes the real token id, so its revealed
    /// inputs resolve in the token's own pool.
    pub fn build_token_conversion_tx<R: CryptoRng + RngCore>(
        &self,
        params: TokenConversionParams,
        rng: &mut R,
    ) -> Result<BuiltTx> {
        params.validate(self.config())?;
        if params.token_id.is_native() {
            return Err(ProtocolError::TokenMismatch.into());
        }
        if common_version(&params.fee_inputs)? != Some(CoinVersion::V2) {
            return Err(ProtocolError::ConversionFeeNotV2.into());
        }
        if params.fee_inputs.iter().any(|i| i.coin.asset_tag().is_some()) {
            return Err(ProtocolError::FeeNotNative.into());
        }
        check_conversion_inputs(&params.token_inputs, &params.payment_infos, 0)?;
        let lock_time = params.lock_time.unwrap_or_else(now);

        let outputs = new_v2_outputs(&params.payment_infos, Some(&params.token_id), self.config(), rng)?;
        let range_proofs = asset_range_proofs(&outputs, rng)?;
        // Each output commits to v*raw_tag + (v*asset_blinder + r)*B.
        let balance_blinding: Scalar = outputs
            .iter()
            .map(|o| Scalar::from(o.value) * o.asset_blinder + o.randomness)
            .sum();
        let token_side = prepare_conversion(
            &params.sender,
            &params.token_inputs,
            outputs,
            RangeProofData::PerOutput(range_proofs),
            balance_blinding,
            0,
            lock_time,
            &[],
        )?;

        let fee_params = TxPrivacyInitParams {
            sender: params.sender.clone(),
            payment_infos: params.fee_payment_infos.clone(),
            inputs: params.fee_inputs.clone(),
            fee: params.fee,
            has_privacy: true,
            token_id: None,
            metadata: None,
            metadata_key: None,
            info: params.info.clone(),
            lock_time: Some(lock_time),
        };
        let fee_side = self.prepare(&fee_params, TxType::Normal, rng)?;

        let token_data = TokenData {
            property_id: params.token_id,
            property_name: params.property_name.clone(),
            property_symbol: params.property_symbol.clone(),
            token_type: TokenType::Transfer,
            mintable: false,
            amount: 0,
        };
        tracing::debug!(token = %params.token_id, fee = params.fee, "preparing token conversion");
        self.sign_token_pair(TxType::TokenConversion, fee_side, token_side, token_data, rng)
    }
}

/// Inputs must be version 1 coins whose values equal the outputs plus fee.
fn check_conversion_inputs(inputs: &[InputCoin], outputs: &[PaymentInfo], fee: u64) -> Result<()> {
    if inputs.is_empty() {
        return Err(ValidationError::NoInputs.into());
    }
    if let Some(input) = inputs.iter().find(|i| i.version() != CoinVersion::V1) {
        return Err(ProtocolError::WrongCoinVersion(input.version().as_u8()).into());
    }
    let total_in = total_input(inputs)?;
    let total_out = total_amount(outputs)?
        .checked_add(fee)
        .ok_or(ValidationError::AmountOverflow)?;
    if total_in != total_out {
        return Err(ValidationError::UnbalancedConversion {
            inputs: total_in,
            outputs: total_out,
        }
        .into());
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn prepare_conversion(
    sender: &KeySet,
    inputs: &[InputCoin],
    outputs: Vec<OutputCoin>,
    range_proof: RangeProofData,
    balance_blinding: Scalar,
    fee: u64,
    lock_time: i64,
    info: &[u8],
) -> Result<PreparedTx> {
    let spend_key = sender.require_spend_private_key()?;
    let owner = sender.payment_address().spend_public_key();
    let compressed_owner = CompressedRistrettoPublic::from(owner);
    let revealed_inputs = inputs
        .iter()
        .map(|input| input.reveal(&compressed_owner))
        .collect::<Result<Vec<_>>>()?;

    let mut tx = Tx::new(TX_VERSION_2, TxType::Conversion, lock_time, fee)?;
    tx.sig_pub_key = owner.to_bytes().to_vec();
    tx.pub_key_last_byte_sender = compressed_owner.last_byte();
    tx.set_info(info)?;
    tx.proof = Some(Proof::Conversion(ConversionProof {
        revealed_inputs,
        output_coins: outputs.into_iter().map(|o| o.coin).collect(),
        range_proof,
        balance_blinding: balance_blinding.to_bytes(),
    }));

    let spent_key_images = inputs
        .iter()
        .map(InputCoin::key_image)
        .collect::<Result<Vec<_>>>()?;
    Ok(PreparedTx {
        unsigned: UnsignedTx::new(tx, TxSigner::Schnorr(spend_key.clone())),
        spent_key_images,
    })
}
