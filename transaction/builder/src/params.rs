// Copyright (c) 2018-2025 The Botho Foundation

//! Request objects handed to the builders. Each is consumed by one build.

use prv_account_keys::KeySet;
use prv_crypto_keys::{CompressedRistrettoPublic, RistrettoPrivate};
use prv_crypto_ring_signature::{KeyImage, Scalar};
use prv_transaction_core::{
    coin::CoinVersion,
    constants::MAX_INFO_LEN,
    ring_ct::{RealInput, RingMember},
    total_amount,
    tx::{Metadata, RevealedInput, TokenType},
    CoinBase, CryptoError, PaymentInfo, PlainCoin, ProtocolConfig, ProtocolError, Result,
    Spendable, TokenId, ValidationError,
};
use std::collections::HashSet;

/// A decrypted coin the sender owns, with its chain index.
#[derive(Clone, Debug)]
pub struct InputCoin {
    /// The decrypted coin.
    pub coin: PlainCoin,
    /// Index of the coin in its pool.
    pub index: u64,
}

impl InputCoin {
    /// Pair a decrypted coin with its chain index.
    pub fn new(coin: PlainCoin, index: u64) -> Self {
        Self { coin, index }
    }

    /// The coin's value.
    pub fn value(&self) -> u64 {
        self.coin.value()
    }

    /// The coin's format version.
    pub fn version(&self) -> CoinVersion {
        self.coin.version()
    }

    /// The key image spending this coin publishes.
    pub fn key_image(&self) -> Result<KeyImage> {
        self.coin
            .key_image()
            .copied()
            .ok_or_else(|| ValidationError::MissingSpendKey.into())
    }

    /// The coin as the true member of a ring.
    pub fn real_input(&self, asset_blinder: Scalar) -> Result<RealInput> {
        let secret = self
            .coin
            .spend_secret()
            .ok_or(ValidationError::MissingSpendKey)?;
        Ok(RealInput {
            member: RingMember::from_coin(self.index, &self.coin.to_coin())?,
            secret: *secret.as_ref(),
            value: self.coin.value(),
            randomness: *self.coin.randomness(),
            asset_blinder,
        })
    }

    /// The coin spent in the open. Only v1 coins owned by `owner` can be
    /// revealed.
    pub fn reveal(&self, owner: &CompressedRistrettoPublic) -> Result<RevealedInput> {
        let PlainCoin::V1(coin) = &self.coin else {
            return Err(ProtocolError::WrongCoinVersion(self.version().as_u8()).into());
        };
        if coin.coin.public_key != *owner {
            return Err(CryptoError::CoinNotOwned.into());
        }
        Ok(RevealedInput {
            index: self.index,
            coin: coin.coin.clone(),
            value: coin.value,
            randomness: coin.randomness.to_bytes(),
        })
    }
}

/// Sum of the input values, failing on overflow.
pub fn total_input(inputs: &[InputCoin]) -> Result<u64> {
    inputs.iter().try_fold(0u64, |acc, input| {
        acc.checked_add(input.value())
            .ok_or_else(|| ValidationError::AmountOverflow.into())
    })
}

/// The single version shared by `inputs`; `None` when there are none.
pub fn common_version(inputs: &[InputCoin]) -> Result<Option<CoinVersion>> {
    let mut versions = inputs.iter().map(InputCoin::version);
    let Some(first) = versions.next() else {
        return Ok(None);
    };
    if versions.any(|version| version != first) {
        return Err(ValidationError::MixedCoinVersions.into());
    }
    Ok(Some(first))
}

fn check_counts(
    config: &ProtocolConfig,
    inputs: &[InputCoin],
    payment_infos: &[PaymentInfo],
) -> Result<()> {
    if inputs.len() > config.max_inputs {
        return Err(ValidationError::TooManyInputs(inputs.len(), config.max_inputs).into());
    }
    let mut indexes = HashSet::new();
    if !inputs.iter().all(|input| indexes.insert(input.index)) {
        return Err(ValidationError::DuplicateInput.into());
    }
    if payment_infos.len() > config.max_payment_infos {
        return Err(ValidationError::TooManyPaymentInfos(
            payment_infos.len(),
            config.max_payment_infos,
        )
        .into());
    }
    payment_infos.iter().try_for_each(PaymentInfo::validate)
}

fn check_info(info: &[u8]) -> Result<()> {
    if info.len() > MAX_INFO_LEN {
        return Err(ValidationError::InfoTooLong(info.len(), MAX_INFO_LEN).into());
    }
    Ok(())
}

/// A payment: who pays whom, from which coins, at which fee.
#[derive(Clone, Debug)]
pub struct TxPrivacyInitParams {
    /// The sender's keys. Change goes to the sender's address.
    pub sender: KeySet,
    /// The payments.
    pub payment_infos: Vec<PaymentInfo>,
    /// The coins spent, all of one version.
    pub inputs: Vec<InputCoin>,
    /// Fee in the native coin.
    pub fee: u64,
    /// Whether v1 inputs are hidden in rings. Version 2 is always private.
    pub has_privacy: bool,
    /// Token moved; the native coin when `None`.
    pub token_id: Option<TokenId>,
    /// Opaque payload.
    pub metadata: Option<Metadata>,
    /// Key signing the payload, when it asks for a signature.
    pub metadata_key: Option<RistrettoPrivate>,
    /// Free-form bytes stored in the transaction.
    pub info: Vec<u8>,
    /// Unix time the transaction is locked until; now when `None`.
    pub lock_time: Option<i64>,
}

impl TxPrivacyInitParams {
    /// A private native-coin payment.
    pub fn new(sender: KeySet, payment_infos: Vec<PaymentInfo>, inputs: Vec<InputCoin>, fee: u64) -> Self {
        Self {
            sender,
            payment_infos,
            inputs,
            fee,
            has_privacy: true,
            token_id: None,
            metadata: None,
            metadata_key: None,
            info: Vec::new(),
            lock_time: None,
        }
    }

    /// Turn ring privacy for v1 inputs on or off.
    pub fn with_privacy(mut self, has_privacy: bool) -> Self {
        self.has_privacy = has_privacy;
        self
    }

    /// Move `token_id` instead of the native coin.
    pub fn with_token(mut self, token_id: TokenId) -> Self {
        self.token_id = Some(token_id);
        self
    }

    /// Attach an opaque payload, signed by `key` if it asks for it.
    pub fn with_metadata(mut self, metadata: Metadata, key: Option<RistrettoPrivate>) -> Self {
        self.metadata = Some(metadata);
        self.metadata_key = key;
        self
    }

    /// Attach info bytes.
    pub fn with_info(mut self, info: impl Into<Vec<u8>>) -> Self {
        self.info = info.into();
        self
    }

    /// Fix the lock time.
    pub fn with_lock_time(mut self, lock_time: i64) -> Self {
        self.lock_time = Some(lock_time);
        self
    }

    /// The token moved, defaulting to the native coin.
    pub fn token_id(&self) -> TokenId {
        self.token_id.unwrap_or(TokenId::NATIVE)
    }

    /// Sum of the payments plus the fee.
    pub fn required_amount(&self) -> Result<u64> {
        total_amount(&self.payment_infos)?
            .checked_add(self.fee)
            .ok_or_else(|| ValidationError::AmountOverflow.into())
    }

    /// What is left for change once the payments and fee are covered.
    pub fn change_amount(&self) -> Result<u64> {
        let available = total_input(&self.inputs)?;
        let required = self.required_amount()?;
        available.checked_sub(required).ok_or_else(|| {
            ValidationError::InsufficientFunds {
                available,
                required,
            }
            .into()
        })
    }

    /// Check counts, lengths, overflow and version uniformity.
    pub fn validate(&self, config: &ProtocolConfig) -> Result<()> {
        check_counts(config, &self.inputs, &self.payment_infos)?;
        check_info(&self.info)?;
        common_version(&self.inputs)?;
        total_input(&self.inputs)?;
        self.required_amount()?;
        Ok(())
    }
}

/// The token side of a token transaction.
#[derive(Clone, Debug)]
pub struct TokenParam {
    /// The token id. Chosen by the caller on init.
    pub property_id: TokenId,
    /// Display name.
    pub property_name: String,
    /// Ticker.
    pub property_symbol: String,
    /// Init or transfer.
    pub token_type: TokenType,
    /// Amount minted on init.
    pub amount: u64,
    /// Whether more can be minted later.
    pub mintable: bool,
    /// Token payments.
    pub receivers: Vec<PaymentInfo>,
    /// Token coins spent by a transfer.
    pub inputs: Vec<InputCoin>,
}

impl TokenParam {
    /// A transfer of an existing token.
    pub fn transfer(property_id: TokenId, receivers: Vec<PaymentInfo>, inputs: Vec<InputCoin>) -> Self {
        Self {
            property_id,
            property_name: String::new(),
            property_symbol: String::new(),
            token_type: TokenType::Transfer,
            amount: 0,
            mintable: false,
            receivers,
            inputs,
        }
    }

    /// The creation of a token with a caller-chosen id. The whole amount
    /// goes to `receivers`, the rest to the sender.
    pub fn init(
        property_id: TokenId,
        property_name: impl Into<String>,
        property_symbol: impl Into<String>,
        amount: u64,
        receivers: Vec<PaymentInfo>,
    ) -> Self {
        Self {
            property_id,
            property_name: property_name.into(),
            property_symbol: property_symbol.into(),
            token_type: TokenType::Init,
            amount,
            mintable: false,
            receivers,
            inputs: Vec::new(),
        }
    }
}

/// A token transaction: a native fee payment plus a token movement.
#[derive(Clone, Debug)]
pub struct TxTokenParams {
    /// The sender's keys.
    pub sender: KeySet,
    /// Native payments made by the fee transaction.
    pub fee_payment_infos: Vec<PaymentInfo>,
    /// Native coins paying the fee.
    pub fee_inputs: Vec<InputCoin>,
    /// Fee in the native coin.
    pub fee: u64,
    /// Ring privacy for v1 fee inputs.
    pub has_privacy: bool,
    /// The token side.
    pub token: TokenParam,
    /// Ring privacy for v1 token inputs.
    pub has_token_privacy: bool,
    /// Opaque payload, carried by the fee transaction.
    pub metadata: Option<Metadata>,
    /// Key signing the payload.
    pub metadata_key: Option<RistrettoPrivate>,
    /// Info bytes of the fee transaction.
    pub info: Vec<u8>,
    /// Lock time of both halves; now when `None`.
    pub lock_time: Option<i64>,
}

impl TxTokenParams {
    /// A private token transaction without payload.
    pub fn new(sender: KeySet, fee_inputs: Vec<InputCoin>, fee: u64, token: TokenParam) -> Self {
        Self {
            sender,
            fee_payment_infos: Vec::new(),
            fee_inputs,
            fee,
            has_privacy: true,
            token,
            has_token_privacy: true,
            metadata: None,
            metadata_key: None,
            info: Vec::new(),
            lock_time: None,
        }
    }

    /// Check both halves' counts and lengths.
    pub fn validate(&self, config: &ProtocolConfig) -> Result<()> {
        check_counts(config, &self.fee_inputs, &self.fee_payment_infos)?;
        check_counts(config, &self.token.inputs, &self.token.receivers)?;
        check_info(&self.info)?;
        total_input(&self.fee_inputs)?;
        total_input(&self.token.inputs)?;
        total_amount(&self.token.receivers)?;
        Ok(())
    }
}

/// Conversion of v1 coins into v2 coins of the same value.
#[derive(Clone, Debug)]
pub struct ConversionParams {
    /// The sender's keys.
    pub sender: KeySet,
    /// The v1 coins converted.
    pub inputs: Vec<InputCoin>,
    /// The new v2 coins.
    pub payment_infos: Vec<PaymentInfo>,
    /// Fee in the native coin.
    pub fee: u64,
    /// Info bytes.
    pub info: Vec<u8>,
    /// Lock time; now when `None`.
    pub lock_time: Option<i64>,
}

impl ConversionParams {
    /// Convert `inputs` into `payment_infos` at `fee`.
    pub fn new(sender: KeySet, inputs: Vec<InputCoin>, payment_infos: Vec<PaymentInfo>, fee: u64) -> Self {
        Self {
            sender,
            inputs,
            payment_infos,
            fee,
            info: Vec::new(),
            lock_time: None,
        }
    }

    /// Check counts and lengths.
    pub fn validate(&self, config: &ProtocolConfig) -> Result<()> {
        check_counts(config, &self.inputs, &self.payment_infos)?;
        check_info(&self.info)
    }
}

/// Conversion of v1 token coins into confidential-asset coins, with the fee
/// paid from v2 native coins.
#[derive(Clone, Debug)]
pub struct TokenConversionParams {
    /// The sender's keys.
    pub sender: KeySet,
    /// The token converted.
    pub token_id: TokenId,
    /// Display name published with the conversion.
    pub property_name: String,
    /// Ticker published with the conversion.
    pub property_symbol: String,
    /// The v1 token coins converted.
    pub token_inputs: Vec<InputCoin>,
    /// The new confidential-asset coins.
    pub payment_infos: Vec<PaymentInfo>,
    /// v2 native coins paying the fee.
    pub fee_inputs: Vec<InputCoin>,
    /// Native payments made by the fee transaction.
    pub fee_payment_infos: Vec<PaymentInfo>,
    /// Fee in the native coin.
    pub fee: u64,
    /// Info bytes of the fee transaction.
    pub info: Vec<u8>,
    /// Lock time of both halves; now when `None`.
    pub lock_time: Option<i64>,
}

impl TokenConversionParams {
    /// Convert `token_inputs` of `token_id` into `payment_infos`, paying
    /// `fee` from `fee_inputs`.
    pub fn new(
        sender: KeySet,
        token_id: TokenId,
        token_inputs: Vec<InputCoin>,
        payment_infos: Vec<PaymentInfo>,
        fee_inputs: Vec<InputCoin>,
        fee: u64,
    ) -> Self {
        Self {
            sender,
            token_id,
            property_name: String::new(),
            property_symbol: String::new(),
            token_inputs,
            payment_infos,
            fee_inputs,
            fee_payment_infos: Vec::new(),
            fee,
            info: Vec::new(),
            lock_time: None,
        }
    }

    /// Check both halves' counts and lengths.
    pub fn validate(&self, config: &ProtocolConfig) -> Result<()> {
        check_counts(config, &self.token_inputs, &self.payment_infos)?;
        check_counts(config, &self.fee_inputs, &self.fee_payment_infos)?;
        check_info(&self.info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockChain;
    use assert_matches::assert_matches;
    use prv_account_keys::AccountKey;
    use prv_transaction_core::Error;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_mixed_versions_are_rejected() {
        let mut rng: StdRng = SeedableRng::from_seed([1u8; 32]);
        let mut chain = MockChain::new(ProtocolConfig::default(), [1u8; 32]);
        let account = AccountKey::random(&mut rng);
        let mut inputs = chain.fund(&account, &[5], CoinVersion::V1, None, &mut rng).unwrap();
        inputs.extend(chain.fund(&account, &[5], CoinVersion::V2, None, &mut rng).unwrap());

        let params = TxPrivacyInitParams::new(account.key_set(), Vec::new(), inputs, 1);
        assert_matches!(
            params.validate(chain.config()),
            Err(Error::Validation(ValidationError::MixedCoinVersions))
        );
    }

    #[test]
    fn test_counts_follow_config() {
        let mut rng: StdRng = SeedableRng::from_seed([2u8; 32]);
        let config = ProtocolConfig {
            max_inputs: 2,
            max_payment_infos: 1,
            ..Default::default()
        };
        let mut chain = MockChain::new(config.clone(), [2u8; 32]);
        let account = AccountKey::random(&mut rng);
        let inputs = chain.fund(&account, &[1, 2, 3], CoinVersion::V2, None, &mut rng).unwrap();
        let to = PaymentInfo::new(account.public_address(), 1);

        let params = TxPrivacyInitParams::new(account.key_set(), vec![to.clone()], inputs.clone(), 0);
        assert_matches!(
            params.validate(&config),
            Err(Error::Validation(ValidationError::TooManyInputs(3, 2)))
        );

        let params = TxPrivacyInitParams::new(account.key_set(), vec![to.clone(), to], inputs[..1].to_vec(), 0);
        assert_matches!(
            params.validate(&config),
            Err(Error::Validation(ValidationError::TooManyPaymentInfos(2, 1)))
        );
    }

    #[test]
    fn test_same_coin_twice_is_rejected() {
        let mut rng: StdRng = SeedableRng::from_seed([5u8; 32]);
        let mut chain = MockChain::new(ProtocolConfig::default(), [5u8; 32]);
        let account = AccountKey::random(&mut rng);
        let mut inputs = chain.fund(&account, &[50], CoinVersion::V1, None, &mut rng).unwrap();
        inputs.push(inputs[0].clone());
        let to = PaymentInfo::new(account.public_address(), 90);

        let params = TxPrivacyInitParams::new(account.key_set(), vec![to.clone()], inputs.clone(), 10);
        assert_matches!(
            params.validate(chain.config()),
            Err(Error::Validation(ValidationError::DuplicateInput))
        );

        let params = ConversionParams::new(account.key_set(), inputs, vec![to], 10);
        assert_matches!(
            params.validate(chain.config()),
            Err(Error::Validation(ValidationError::DuplicateInput))
        );
    }

    #[test]
    fn test_required_amount_overflow() {
        let mut rng: StdRng = SeedableRng::from_seed([3u8; 32]);
        let account = AccountKey::random(&mut rng);
        let to = PaymentInfo::new(account.public_address(), u64::MAX);
        let params = TxPrivacyInitParams::new(account.key_set(), vec![to], Vec::new(), 1);
        assert_matches!(
            params.required_amount(),
            Err(Error::Validation(ValidationError::AmountOverflow))
        );
        assert_eq!(params.token_id(), TokenId::NATIVE);
    }

    #[test]
    fn test_reveal_checks_version_and_owner() {
        let mut rng: StdRng = SeedableRng::from_seed([4u8; 32]);
        let mut chain = MockChain::new(ProtocolConfig::default(), [4u8; 32]);
        let account = AccountKey::random(&mut rng);
        let other = AccountKey::random(&mut rng);
        let owner = CompressedRistrettoPublic::from(account.public_address().spend_public_key());
        let stranger = CompressedRistrettoPublic::from(other.public_address().spend_public_key());

        let v1 = chain.fund(&account, &[7], CoinVersion::V1, None, &mut rng).unwrap();
        let revealed = v1[0].reveal(&owner).unwrap();
        assert_eq!(revealed.value, 7);
        revealed.check_opening().unwrap();
        assert_matches!(
            v1[0].reveal(&stranger),
            Err(Error::Crypto(CryptoError::CoinNotOwned))
        );

        let v2 = chain.fund(&account, &[7], CoinVersion::V2, None, &mut rng).unwrap();
        assert_matches!(
            v2[0].reveal(&owner),
            Err(Error::Protocol(ProtocolError::WrongCoinVersion(2)))
        );
    }
}
