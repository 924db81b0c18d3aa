// Copyright (c) 2018-2025 The Botho Foundation

//! A requested payment: recipient, amount and an optional message.

use crate::{constants::MAX_INFO_LEN, Result, ValidationError};
use prv_account_keys::PublicAddress;
use prv_crypto_keys::serde_b64;
use serde::{Deserialize, Serialize};

/// One payment of a transaction.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaymentInfo {
    /// Recipient.
    pub address: PublicAddress,
    /// Amount in the token's smallest unit.
    pub amount: u64,
    /// Message stored in the output coin's info field.
    #[serde(with = "serde_b64", default)]
    pub message: Vec<u8>,
}

impl PaymentInfo {
    /// A payment without message.
    pub fn new(address: PublicAddress, amount: u64) -> Self {
        Self {
            address,
            amount,
            message: Vec::new(),
        }
    }

    /// Attach a message.
    pub fn with_message(mut self, message: impl Into<Vec<u8>>) -> Self {
        self.message = message.into();
        self
    }

    /// Reject messages that do not fit a coin's info field.
    pub fn validate(&self) -> Result<()> {
        if self.message.len() > MAX_INFO_LEN {
            return Err(ValidationError::InfoTooLong(self.message.len(), MAX_INFO_LEN).into());
        }
        Ok(())
    }
}

/// Sum of the payment amounts, failing on overflow.
pub fn total_amount(payment_infos: &[PaymentInfo]) -> Result<u64> {
    payment_infos.iter().try_fold(0u64, |acc, info| {
        acc.checked_add(info.amount)
            .ok_or_else(|| ValidationError::AmountOverflow.into())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use assert_matches::assert_matches;
    use prv_account_keys::AccountKey;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_total_amount() {
        let mut rng: StdRng = SeedableRng::from_seed([1u8; 32]);
        let address = AccountKey::random(&mut rng).public_address();
        let infos = vec![PaymentInfo::new(address, 3), PaymentInfo::new(address, 4)];
        assert_eq!(total_amount(&infos).unwrap(), 7);

        let overflow = vec![PaymentInfo::new(address, u64::MAX), PaymentInfo::new(address, 1)];
        assert_matches!(
            total_amount(&overflow),
            Err(Error::Validation(ValidationError::AmountOverflow))
        );
    }

    #[test]
    fn test_long_message_is_rejected() {
        let mut rng: StdRng = SeedableRng::from_seed([2u8; 32]);
        let address = AccountKey::random(&mut rng).public_address();
        let info = PaymentInfo::new(address, 1).with_message(vec![0u8; MAX_INFO_LEN + 1]);
        assert_matches!(
            info.validate(),
            Err(Error::Validation(ValidationError::InfoTooLong(_, _)))
        );
        assert!(PaymentInfo::new(address, 1).with_message("hi").validate().is_ok());
    }
}
