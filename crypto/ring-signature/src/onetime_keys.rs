// Copyright (c) 2018-2025 The Botho Foundation

//! One-time (stealth) keys.
//!
//! **Sender (creating output `i`):**
//! 1. Picks a fresh transaction private key `r`, publishes `R = r * G`
//! 2. Computes the shared secret `D = r * A` with the recipient's view key
//! 3. Computes the one-time key `P = Hs(D ‖ i) * G + B`
//!
//! **Recipient (scanning):**
//! 1. Recomputes `D = a * R`
//! 2. Checks `P - Hs(D ‖ i) * G == B`
//! 3. Spends with `x = Hs(D ‖ i) + b`

use crate::{domain_separators::ONETIME_KEY_DOMAIN_TAG, hash_to_scalar, G};
use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar};
use prv_crypto_keys::{RistrettoPrivate, RistrettoPublic};

/// `Hs(D ‖ index)`, the scalar offset between a one-time key and the
/// recipient's spend key.
pub fn onetime_key_derivation(shared_secret: &RistrettoPublic, output_index: u32) -> Scalar {
    hash_to_scalar(
        ONETIME_KEY_DOMAIN_TAG,
        &[&shared_secret.to_bytes(), &output_index.to_le_bytes()],
    )
}

/// The Diffie-Hellman shared secret `private * public`.
pub fn create_shared_secret(
    public_key: &RistrettoPublic,
    private_key: &RistrettoPrivate,
) -> RistrettoPublic {
    let point: &RistrettoPoint = public_key.as_ref();
    RistrettoPublic::from(private_key.as_ref() * point)
}

/// The transaction public key `R = r * G` published with an output.
pub fn create_tx_out_public_key(tx_private_key: &RistrettoPrivate) -> RistrettoPublic {
    RistrettoPublic::from(tx_private_key)
}

/// The one-time key `P = Hs(r * A ‖ i) * G + B`.
pub fn create_tx_out_target_key(
    tx_private_key: &RistrettoPrivate,
    view_public_key: &RistrettoPublic,
    spend_public_key: &RistrettoPublic,
    output_index: u32,
) -> RistrettoPublic {
    let shared_secret = create_shared_secret(view_public_key, tx_private_key);
    create_target_key_from_shared_secret(&shared_secret, spend_public_key, output_index)
}

/// The one-time key when the shared secret is already known.
pub fn create_target_key_from_shared_secret(
    shared_secret: &RistrettoPublic,
    spend_public_key: &RistrettoPublic,
    output_index: u32,
) -> RistrettoPublic {
    let hs = onetime_key_derivation(shared_secret, output_index);
    let b: &RistrettoPoint = spend_public_key.as_ref();
    RistrettoPublic::from(hs * G + b)
}

/// Recovers `B' = P - Hs(a * R ‖ i) * G`. Equals the recipient's spend key
/// exactly when the output was sent to them.
pub fn recover_public_spend_key(
    view_private_key: &RistrettoPrivate,
    target_key: &RistrettoPublic,
    tx_public_key: &RistrettoPublic,
    output_index: u32,
) -> RistrettoPublic {
    let shared_secret = create_shared_secret(tx_public_key, view_private_key);
    let hs = onetime_key_derivation(&shared_secret, output_index);
    let p: &RistrettoPoint = target_key.as_ref();
    RistrettoPublic::from(p - hs * G)
}

/// True if the output was sent to the owner of `(a, B)`.
pub fn view_key_matches_output(
    view_private_key: &RistrettoPrivate,
    spend_public_key: &RistrettoPublic,
    target_key: &RistrettoPublic,
    tx_public_key: &RistrettoPublic,
    output_index: u32,
) -> bool {
    &recover_public_spend_key(view_private_key, target_key, tx_public_key, output_index)
        == spend_public_key
}

/// Recovers the one-time private key `x = Hs(a * R ‖ i) + b`.
pub fn recover_onetime_private_key(
    tx_public_key: &RistrettoPublic,
    view_private_key: &RistrettoPrivate,
    spend_private_key: &RistrettoPrivate,
    output_index: u32,
) -> RistrettoPrivate {
    let shared_secret = create_shared_secret(tx_public_key, view_private_key);
    let hs = onetime_key_derivation(&shared_secret, output_index);
    RistrettoPrivate::from(hs + spend_private_key.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use prv_crypto_keys::FromRandom;
    use rand::{rngs::StdRng, SeedableRng};

    struct Recipient {
        view_private: RistrettoPrivate,
        spend_private: RistrettoPrivate,
        view_public: RistrettoPublic,
        spend_public: RistrettoPublic,
    }

    impl Recipient {
        fn random(rng: &mut StdRng) -> Self {
            let view_private = RistrettoPrivate::from_random(rng);
            let spend_private = RistrettoPrivate::from_random(rng);
            Self {
                view_public: RistrettoPublic::from(&view_private),
                spend_public: RistrettoPublic::from(&spend_private),
                view_private,
                spend_private,
            }
        }
    }

    #[test]
    fn test_stealth_roundtrip() {
        let mut rng: StdRng = SeedableRng::from_seed([1u8; 32]);
        let recipient = Recipient::random(&mut rng);
        let r = RistrettoPrivate::from_random(&mut rng);

        let target = create_tx_out_target_key(&r, &recipient.view_public, &recipient.spend_public, 3);
        let tx_public = create_tx_out_public_key(&r);

        assert!(view_key_matches_output(
            &recipient.view_private,
            &recipient.spend_public,
            &target,
            &tx_public,
            3
        ));
        let onetime_private =
            recover_onetime_private_key(&tx_public, &recipient.view_private, &recipient.spend_private, 3);
        assert_eq!(RistrettoPublic::from(&onetime_private), target);
    }

    #[test]
    fn test_wrong_recipient_or_index_does_not_match() {
        let mut rng: StdRng = SeedableRng::from_seed([2u8; 32]);
        let recipient = Recipient::random(&mut rng);
        let other = Recipient::random(&mut rng);
        let r = RistrettoPrivate::from_random(&mut rng);

        let target = create_tx_out_target_key(&r, &recipient.view_public, &recipient.spend_public, 0);
        let tx_public = create_tx_out_public_key(&r);

        assert!(!view_key_matches_output(
            &other.view_private,
            &other.spend_public,
            &target,
            &tx_public,
            0
        ));
        assert!(!view_key_matches_output(
            &recipient.view_private,
            &recipient.spend_public,
            &target,
            &tx_public,
            1
        ));
    }

    #[test]
    fn test_shared_secret_is_symmetric() {
        let mut rng: StdRng = SeedableRng::from_seed([3u8; 32]);
        let a = RistrettoPrivate::from_random(&mut rng);
        let r = RistrettoPrivate::from_random(&mut rng);
        assert_eq!(
            create_shared_secret(&RistrettoPublic::from(&a), &r),
            create_shared_secret(&RistrettoPublic::from(&r), &a)
        );
    }
}
