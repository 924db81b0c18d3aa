// Copyright (c) 2018-2025 The Botho Foundation

//! Token transactions: a native fee transaction paired with a token
//! transaction, both signed over their parent hash.

use crate::{
    decoys::DecoyProvider,
    params::{common_version, TxPrivacyInitParams, TxTokenParams},
    transaction_builder::{now, BuiltTx, PreparedTx, TransactionBuilder},
};
use prv_crypto_keys::CompressedRistrettoPublic;
use prv_transaction_core::{
    coin::{CoinV1, CoinVersion},
    constants::{TX_VERSION_1, TX_VERSION_2},
    total_amount,
    tx::{
        token_parent_hash, AnyTx, Proof, ProofV1, TokenData, TokenType, Tx, TxSigner, TxToken,
        TxType, UnsignedTx,
    },
    CoinBase, PaymentInfo, ProtocolError, Result, TokenId, ValidationError,
};
use rand_core::{CryptoRng, RngCore};

impl<'a, P: DecoyProvider> TransactionBuilder<'a, P> {
    /// Build a token init or transfer together with its fee transaction.
    ///
    /// An init mints with version 1 coins only. A transfer spends token
    /// coins of the fee inputs' version; v2 token coins move through the
    /// confidential-asset ring and publish the umbrella id.
    pub fn build_token_tx<R: CryptoRng + RngCore>(
        &self,
        params: TxTokenParams,
        rng: &mut R,
    ) -> Result<BuiltTx> {
        params.validate(self.config())?;
        if params.fee_inputs.iter().any(|i| i.coin.asset_tag().is_some()) {
            return Err(ProtocolError::FeeNotNative.into());
        }
        let fee_version = common_version(&params.fee_inputs)?.unwrap_or(CoinVersion::V1);
        let lock_time = params.lock_time.unwrap_or_else(now);
        let token = &params.token;

        let fee_params = TxPrivacyInitParams {
            sender: params.sender.clone(),
            payment_infos: params.fee_payment_infos.clone(),
            inputs: params.fee_inputs.clone(),
            fee: params.fee,
            has_privacy: params.has_privacy,
            token_id: None,
            metadata: params.metadata.clone(),
            metadata_key: params.metadata_key.clone(),
            info: params.info.clone(),
            lock_time: Some(lock_time),
        };
        fee_params.change_amount()?;

        let (token_side, property_id) = match token.token_type {
            TokenType::Init => {
                if fee_version == CoinVersion::V2 {
                    return Err(ProtocolError::TokenInitRequiresV1.into());
                }
                (prepare_token_init(&params, lock_time, rng)?, token.property_id)
            }
            TokenType::Transfer => {
                if token.property_id.is_native() {
                    return Err(ProtocolError::TokenMismatch.into());
                }
                if let Some(version) = common_version(&token.inputs)? {
                    if version != fee_version {
                        return Err(ProtocolError::VersionMismatch {
                            fee: fee_version.as_u8(),
                            token: version.as_u8(),
                        }
                        .into());
                    }
                }
                let token_params = TxPrivacyInitParams {
                    sender: params.sender.clone(),
                    payment_infos: token.receivers.clone(),
                    inputs: token.inputs.clone(),
                    fee: 0,
                    has_privacy: params.has_token_privacy,
                    token_id: Some(token.property_id),
                    metadata: None,
                    metadata_key: None,
                    info: Vec::new(),
                    lock_time: Some(lock_time),
                };
                let prepared = self.prepare(&token_params, TxType::TokenTransfer, rng)?;
                let published = if prepared.unsigned.tx().version == TX_VERSION_2 {
                    TokenId::CONFIDENTIAL_ASSET
                } else {
                    token.property_id
                };
                (prepared, published)
            }
        };

        let fee_side = self.prepare(&fee_params, TxType::Normal, rng)?;

        let token_data = TokenData {
            property_id,
            property_name: token.property_name.clone(),
            property_symbol: token.property_symbol.clone(),
            token_type: token.token_type,
            mintable: token.mintable,
            amount: match token.token_type {
                TokenType::Init => token.amount,
                TokenType::Transfer => 0,
            },
        };
        tracing::debug!(
            token = %token.property_id,
            token_type = ?token.token_type,
            fee = params.fee,
            "preparing token transaction"
        );
        self.sign_token_pair(TxType::TokenTransfer, fee_side, token_side, token_data, rng)
    }

    /// Sign both halves over their parent hash and pair them.
    pub(crate) fn sign_token_pair<R: CryptoRng + RngCore>(
        &self,
        tx_type: TxType,
        fee_side: PreparedTx,
        token_side: PreparedTx,
        token_data: TokenData,
        rng: &mut R,
    ) -> Result<BuiltTx> {
        let parent = token_parent_hash(
            &fee_side.unsigned.hash()?,
            &token_side.unsigned.hash()?,
            &token_data,
        )?;
        let fee_tx = fee_side.unsigned.sign_message(&parent, rng)?;
        let token_tx = token_side.unsigned.sign_message(&parent, rng)?;
        let tx = TxToken::new(tx_type, fee_tx, token_tx, token_data)?;

        let mut spent_key_images = fee_side.spent_key_images;
        spent_key_images.extend(token_side.spent_key_images);
        BuiltTx::new(AnyTx::Token(tx), spent_key_images, self.config().max_tx_size)
    }
}

/// The minting half of a token init: clear v1 coins to the receivers and
/// the unallocated amount to the sender, signed by the sender's key.
fn prepare_token_init<R: CryptoRng + RngCore>(
    params: &TxTokenParams,
    lock_time: i64,
    rng: &mut R,
) -> Result<PreparedTx> {
    let token = &params.token;
    let spend_key = params.sender.require_spend_private_key()?;
    let owner = params.sender.payment_address().spend_public_key();

    let allocated = total_amount(&token.receivers)?;
    if allocated > token.amount {
        return Err(ValidationError::InsufficientFunds {
            available: token.amount,
            required: allocated,
        }
        .into());
    }
    let mut receivers = token.receivers.clone();
    if token.amount > allocated {
        receivers.push(PaymentInfo::new(
            *params.sender.payment_address(),
            token.amount - allocated,
        ));
    }
    let output_coins = receivers
        .iter()
        .map(|info| CoinV1::new_output(info, false, rng).coin)
        .collect();

    let mut tx = Tx::new(TX_VERSION_1, TxType::TokenTransfer, lock_time, 0)?;
    tx.sig_pub_key = owner.to_bytes().to_vec();
    tx.pub_key_last_byte_sender = CompressedRistrettoPublic::from(owner).last_byte();
    tx.proof = Some(Proof::V1(ProofV1 {
        output_coins,
        ..Default::default()
    }));
    Ok(PreparedTx {
        unsigned: UnsignedTx::new(tx, TxSigner::Schnorr(spend_key.clone())),
        spent_key_images: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{params::TokenParam, test_utils::MockChain};
    use assert_matches::assert_matches;
    use prv_account_keys::AccountKey;
    use prv_transaction_core::{
        coin::decrypt, validation::validate, Error, ProtocolConfig, Spendable,
    };
    use rand::{rngs::StdRng, SeedableRng};

    const GOLD: TokenId = TokenId::new([0x60; 32]);

    #[test]
    fn test_token_init_mints_to_receivers_and_sender() {
        let mut rng: StdRng = SeedableRng::from_seed([31u8; 32]);
        let chain = MockChain::new(ProtocolConfig::default(), [31u8; 32]);
        let issuer = AccountKey::random(&mut rng);
        let holder = AccountKey::random(&mut rng);

        let token = TokenParam::init(
            GOLD,
            "Gold",
            "GLD",
            1_000,
            vec![PaymentInfo::new(holder.public_address(), 600)],
        );
        let mut params = TxTokenParams::new(issuer.key_set(), Vec::new(), 0, token);
        params.has_privacy = false;

        let built = TransactionBuilder::new(chain.config(), &chain)
            .build_token_tx(params, &mut rng)
            .unwrap();
        let AnyTx::Token(tx) = &built.tx else {
            panic!("expected a token transaction");
        };
        assert_eq!(tx.version, TX_VERSION_1);
        assert_eq!(*tx.token_id(), GOLD);
        assert_eq!(tx.token_data.amount, 1_000);
        assert!(built.spent_key_images.is_empty());
        validate(&built.tx, &chain, &mut rng).unwrap();

        let minted = tx.token_tx.output_coins();
        assert_eq!(minted.len(), 2);
        let held = decrypt(&minted[0], &holder.key_set()).unwrap();
        assert_eq!(held.value(), 600);
        let kept = decrypt(&minted[1], &issuer.key_set()).unwrap();
        assert_eq!(kept.value(), 400);
    }

    #[test]
    fn test_token_init_over_allocated() {
        let mut rng: StdRng = SeedableRng::from_seed([32u8; 32]);
        let chain = MockChain::new(ProtocolConfig::default(), [32u8; 32]);
        let issuer = AccountKey::random(&mut rng);
        let token = TokenParam::init(
            GOLD,
            "Gold",
            "GLD",
            10,
            vec![PaymentInfo::new(issuer.public_address(), 11)],
        );
        let mut params = TxTokenParams::new(issuer.key_set(), Vec::new(), 0, token);
        params.has_privacy = false;
        assert_matches!(
            TransactionBuilder::new(chain.config(), &chain).build_token_tx(params, &mut rng),
            Err(Error::Validation(ValidationError::InsufficientFunds {
                available: 10,
                required: 11
            }))
        );
    }

    #[test]
    fn test_token_init_requires_v1_fee() {
        let mut rng: StdRng = SeedableRng::from_seed([33u8; 32]);
        let mut chain = MockChain::new(ProtocolConfig::default(), [33u8; 32]);
        let issuer = AccountKey::random(&mut rng);
        let fee_inputs = chain
            .fund(&issuer, &[10], CoinVersion::V2, None, &mut rng)
            .unwrap();
        let token = TokenParam::init(GOLD, "Gold", "GLD", 10, Vec::new());
        let params = TxTokenParams::new(issuer.key_set(), fee_inputs, 10, token);
        assert_matches!(
            TransactionBuilder::new(chain.config(), &chain).build_token_tx(params, &mut rng),
            Err(Error::Protocol(ProtocolError::TokenInitRequiresV1))
        );
    }

    #[test]
    fn test_fee_inputs_must_be_native() {
        let mut rng: StdRng = SeedableRng::from_seed([34u8; 32]);
        let mut chain = MockChain::new(ProtocolConfig::default(), [34u8; 32]);
        let sender = AccountKey::random(&mut rng);
        let asset_coins = chain
            .fund(&sender, &[10], CoinVersion::V2, Some(GOLD), &mut rng)
            .unwrap();
        let token = TokenParam::transfer(GOLD, Vec::new(), asset_coins.clone());
        let params = TxTokenParams::new(sender.key_set(), asset_coins, 10, token);
        assert_matches!(
            TransactionBuilder::new(chain.config(), &chain).build_token_tx(params, &mut rng),
            Err(Error::Protocol(ProtocolError::FeeNotNative))
        );
    }

    #[test]
    fn test_transfer_versions_must_match() {
        let mut rng: StdRng = SeedableRng::from_seed([35u8; 32]);
        let mut chain = MockChain::new(ProtocolConfig::default(), [35u8; 32]);
        let sender = AccountKey::random(&mut rng);
        let fee_inputs = chain
            .fund(&sender, &[10], CoinVersion::V1, None, &mut rng)
            .unwrap();
        let token_inputs = chain
            .fund(&sender, &[10], CoinVersion::V2, Some(GOLD), &mut rng)
            .unwrap();
        let token = TokenParam::transfer(GOLD, Vec::new(), token_inputs);
        let params = TxTokenParams::new(sender.key_set(), fee_inputs, 10, token);
        assert_matches!(
            TransactionBuilder::new(chain.config(), &chain).build_token_tx(params, &mut rng),
            Err(Error::Protocol(ProtocolError::VersionMismatch { fee: 1, token: 2 }))
        );
    }

    #[test]
    fn test_underfunded_fee_fails_before_token_side() {
        let mut rng: StdRng = SeedableRng::from_seed([37u8; 32]);
        let mut chain = MockChain::new(ProtocolConfig::default(), [37u8; 32]);
        let sender = AccountKey::random(&mut rng);
        let recipient = AccountKey::random(&mut rng);
        let fee_inputs = chain
            .fund(&sender, &[3], CoinVersion::V1, None, &mut rng)
            .unwrap();
        let token_inputs = chain
            .fund(&sender, &[70], CoinVersion::V1, Some(GOLD), &mut rng)
            .unwrap();

        // No decoys exist, so reaching the token ring would fail differently.
        let token = TokenParam::transfer(
            GOLD,
            vec![PaymentInfo::new(recipient.public_address(), 50)],
            token_inputs,
        );
        let params = TxTokenParams::new(sender.key_set(), fee_inputs, 5, token);
        assert_matches!(
            TransactionBuilder::new(chain.config(), &chain).build_token_tx(params, &mut rng),
            Err(Error::Validation(ValidationError::InsufficientFunds {
                available: 3,
                required: 5
            }))
        );
    }

    #[test]
    fn test_v1_token_transfer_with_private_fee() {
        let mut rng: StdRng = SeedableRng::from_seed([36u8; 32]);
        let mut chain = MockChain::new(ProtocolConfig::default(), [36u8; 32]);
        let sender = AccountKey::random(&mut rng);
        let recipient = AccountKey::random(&mut rng);
        let shard = sender.public_address().shard_id(chain.config().num_shards);

        let fee_inputs = chain
            .fund(&sender, &[25], CoinVersion::V1, None, &mut rng)
            .unwrap();
        let token_inputs = chain
            .fund(&sender, &[70], CoinVersion::V1, Some(GOLD), &mut rng)
            .unwrap();
        chain
            .populate_decoys(shard, None, CoinVersion::V1, 10, &mut rng)
            .unwrap();
        chain
            .populate_decoys(shard, Some(GOLD), CoinVersion::V1, 10, &mut rng)
            .unwrap();

        let token = TokenParam::transfer(
            GOLD,
            vec![PaymentInfo::new(recipient.public_address(), 50)],
            token_inputs.clone(),
        );
        let params = TxTokenParams::new(sender.key_set(), fee_inputs.clone(), 5, token);
        let built = TransactionBuilder::new(chain.config(), &chain)
            .build_token_tx(params, &mut rng)
            .unwrap();

        let AnyTx::Token(tx) = &built.tx else {
            panic!("expected a token transaction");
        };
        assert_eq!(*tx.token_id(), GOLD);
        assert_eq!(tx.fee(), 5);
        assert_eq!(tx.token_tx.fee, 0);
        assert_eq!(tx.token_tx.output_coins().len(), 2);
        assert_eq!(
            built.spent_key_images,
            vec![
                fee_inputs[0].key_image().unwrap(),
                token_inputs[0].key_image().unwrap()
            ]
        );
        validate(&built.tx, &chain, &mut rng).unwrap();
    }
}
