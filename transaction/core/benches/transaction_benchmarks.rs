// Copyright (c) 2018-2025 The Botho Foundation

//! Performance benchmarks for transaction operations.
//!
//! Run with: cargo bench -p prv-transaction-core
//!
//! These benchmarks measure performance of:
//! - Aggregated range proof generation and verification
//! - Confidential-asset range proofs
//! - Ring assembly and MLSAG signing of a v2 payment

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use prv_account_keys::AccountKey;
use prv_crypto_ring_signature::{MlsagKind, Scalar, G_VALUE};
use prv_transaction_core::{
    coin::{decrypt, new_output_coin},
    range_proofs::{
        check_asset_range_proof, check_range_proof, generate_asset_range_proof,
        generate_range_proof,
    },
    ring_ct::{build_ring, OutputSecret, RealInput, RingMember},
    Coin, PaymentInfo, ProtocolConfig, Spendable, TokenId,
};
use rand::{rngs::StdRng, RngCore, SeedableRng};

/// A balanced v2 payment: real inputs, decoys and one output.
struct PaymentParams {
    inputs: Vec<RealInput>,
    decoys: Vec<RingMember>,
    outputs: Vec<OutputSecret>,
    fee: u64,
    ring_size: usize,
    message: [u8; 32],
}

impl PaymentParams {
    fn random(num_inputs: usize, ring_size: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let config = ProtocolConfig::default();
        let sender = AccountKey::random(&mut rng);
        let key_set = sender.key_set();
        let fee = 10;

        let mut inputs = Vec::with_capacity(num_inputs);
        for index in 0..num_inputs {
            let value = 1_000 + rng.next_u64() % 1_000;
            let info = PaymentInfo::new(sender.public_address(), value);
            let coin = Coin::V2(new_output_coin(&info, 0, None, &config, &mut rng).unwrap().coin);
            let plain = decrypt(&coin, &key_set).unwrap();
            inputs.push(RealInput {
                member: RingMember::from_coin(index as u64, &coin).unwrap(),
                secret: *plain.spend_secret().unwrap().as_ref(),
                value,
                randomness: *plain.randomness(),
                asset_blinder: Scalar::ZERO,
            });
        }

        let decoys = (0..(ring_size - 1) * num_inputs)
            .map(|k| {
                let stranger = AccountKey::random(&mut rng).public_address();
                let info = PaymentInfo::new(stranger, rng.next_u64() % 1_000);
                let coin =
                    Coin::V2(new_output_coin(&info, 0, None, &config, &mut rng).unwrap().coin);
                RingMember::from_coin((num_inputs + k) as u64, &coin).unwrap()
            })
            .collect();

        let total: u64 = inputs.iter().map(|i| i.value).sum();
        let recipient = AccountKey::random(&mut rng).public_address();
        let output = new_output_coin(
            &PaymentInfo::new(recipient, total - fee),
            0,
            None,
            &config,
            &mut rng,
        )
        .unwrap();

        let mut message = [0u8; 32];
        rng.fill_bytes(&mut message);

        Self {
            inputs,
            decoys,
            outputs: vec![OutputSecret::from(&output)],
            fee,
            ring_size,
            message,
        }
    }

    fn build(&self, rng: &mut StdRng) -> prv_transaction_core::ring_ct::BuiltRing {
        build_ring(
            MlsagKind::Plain,
            &self.inputs,
            &self.decoys,
            &self.outputs,
            self.fee,
            &G_VALUE,
            self.ring_size,
            rng,
        )
        .unwrap()
    }
}

/// Benchmark range proof generation with different numbers of outputs
fn bench_range_proof_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("Range proof generate");

    for num_outputs in [1, 2, 4, 8, 16] {
        let mut rng = StdRng::seed_from_u64(42);
        let values: Vec<u64> = (0..num_outputs).map(|_| rng.next_u64()).collect();
        let blindings: Vec<Scalar> = (0..num_outputs).map(|_| Scalar::random(&mut rng)).collect();

        group.bench_with_input(
            BenchmarkId::new("num_outputs", num_outputs),
            &num_outputs,
            |b, _| {
                let mut bench_rng = StdRng::seed_from_u64(12345);
                b.iter(|| {
                    black_box(generate_range_proof(&values, &blindings, &mut bench_rng).unwrap())
                })
            },
        );
    }
    group.finish();
}

/// Benchmark range proof verification with different numbers of outputs
fn bench_range_proof_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("Range proof verify");

    for num_outputs in [1, 2, 4, 8, 16] {
        let mut rng = StdRng::seed_from_u64(42);
        let values: Vec<u64> = (0..num_outputs).map(|_| rng.next_u64()).collect();
        let blindings: Vec<Scalar> = (0..num_outputs).map(|_| Scalar::random(&mut rng)).collect();
        let (proof, commitments) = generate_range_proof(&values, &blindings, &mut rng).unwrap();

        group.bench_with_input(
            BenchmarkId::new("num_outputs", num_outputs),
            &num_outputs,
            |b, _| {
                let mut bench_rng = StdRng::seed_from_u64(12345);
                b.iter(|| black_box(check_range_proof(&proof, &commitments, &mut bench_rng)))
            },
        );
    }
    group.finish();
}

/// Benchmark a confidential-asset output's range proof
fn bench_asset_range_proof(c: &mut Criterion) {
    let mut group = c.benchmark_group("Asset range proof");
    let mut rng = StdRng::seed_from_u64(42);
    let asset_tag = TokenId::new([7u8; 32]).asset_generator();
    let blinding = Scalar::random(&mut rng);
    let value = rng.next_u64();

    group.bench_function("generate", |b| {
        let mut bench_rng = StdRng::seed_from_u64(12345);
        b.iter(|| {
            black_box(
                generate_asset_range_proof(value, &blinding, &asset_tag, &mut bench_rng).unwrap(),
            )
        })
    });

    let (proof, commitment) =
        generate_asset_range_proof(value, &blinding, &asset_tag, &mut rng).unwrap();
    group.bench_function("verify", |b| {
        let mut bench_rng = StdRng::seed_from_u64(67890);
        b.iter(|| {
            black_box(check_asset_range_proof(
                &proof,
                &commitment,
                &asset_tag,
                &mut bench_rng,
            ))
        })
    });
    group.finish();
}

/// Benchmark ring assembly plus MLSAG signing with different input counts
fn bench_ring_sign(c: &mut Criterion) {
    let mut group = c.benchmark_group("Ring build and sign");
    let ring_size = 8;

    for num_inputs in [1, 2, 4] {
        let params = PaymentParams::random(num_inputs, ring_size, 42);

        group.bench_with_input(
            BenchmarkId::new("num_inputs", num_inputs),
            &num_inputs,
            |b, _| {
                let mut rng = StdRng::seed_from_u64(12345);
                b.iter(|| {
                    let built = params.build(&mut rng);
                    black_box(built.signable.sign(&params.message, &mut rng).unwrap())
                })
            },
        );
    }
    group.finish();
}

/// Benchmark MLSAG verification of a payment ring
fn bench_ring_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("Ring verify");
    let ring_size = 8;

    for num_inputs in [1, 2, 4] {
        let params = PaymentParams::random(num_inputs, ring_size, 42);
        let mut rng = StdRng::seed_from_u64(12345);
        let built = params.build(&mut rng);
        let ring = built.signable.ring().clone();
        let signature = built.signable.sign(&params.message, &mut rng).unwrap();

        group.bench_with_input(
            BenchmarkId::new("num_inputs", num_inputs),
            &num_inputs,
            |b, _| b.iter(|| black_box(signature.verify(&params.message, &ring))),
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_range_proof_generate,
    bench_range_proof_verify,
    bench_asset_range_proof,
    bench_ring_sign,
    bench_ring_verify,
);

criterion_main!(benches);
