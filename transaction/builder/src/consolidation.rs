// Copyright (c) 2018-2025 The Botho Foundation

//! Coin consolidation: many small coins folded into a few, one transaction
//! per batch of inputs, built and broadcast by a bounded pool of workers.

use crate::{
    decoys::DecoyProvider,
    error::ConsolidationError,
    params::{total_input, InputCoin, TxPrivacyInitParams},
    transaction_builder::{BuiltTx, TransactionBuilder},
    utxo_selection::divide_coins,
};
use crossbeam_channel::RecvTimeoutError;
use prv_account_keys::KeySet;
use prv_transaction_core::{
    tx::TxHash, PaymentInfo, ProtocolConfig, Result, ValidationError,
};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::{Duration, Instant},
};

/// Where built transactions go, and where their confirmation is read.
pub trait TxBroadcaster: Send + Sync {
    /// Hand a transaction to the network.
    fn submit(&self, tx: &BuiltTx) -> core::result::Result<(), ConsolidationError>;

    /// Whether the transaction with `hash` is in a block.
    fn is_confirmed(&self, hash: &TxHash) -> core::result::Result<bool, ConsolidationError>;
}

/// Consolidation settings.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationConfig {
    /// Worker threads.
    pub workers: usize,
    /// Pause between confirmation queries.
    pub poll_interval: Duration,
    /// How long one transaction may stay unconfirmed.
    pub tx_timeout: Duration,
    /// Wall-clock ceiling of a whole batch.
    pub batch_timeout: Duration,
    /// Inputs spent by one consolidation transaction.
    pub max_inputs_per_tx: usize,
    /// Fee of each consolidation transaction.
    pub fee_per_tx: u64,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            poll_interval: Duration::from_secs(1),
            tx_timeout: Duration::from_secs(120),
            batch_timeout: Duration::from_secs(600),
            max_inputs_per_tx: 30,
            fee_per_tx: 100,
        }
    }
}

/// Outcome of a batch, by job position.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BatchReport {
    /// Confirmed jobs and their transaction hashes.
    pub confirmed: Vec<(usize, TxHash)>,
    /// Failed jobs.
    pub failed: Vec<(usize, ConsolidationError)>,
    /// True when the batch hit its deadline.
    pub aborted: bool,
}

/// Chunks of at most `per_batch` coins, in order.
pub fn split_into_batches(coins: Vec<InputCoin>, per_batch: usize) -> Vec<Vec<InputCoin>> {
    coins
        .chunks(per_batch.max(1))
        .map(<[InputCoin]>::to_vec)
        .collect()
}

/// A payment of `inputs`, less `fee`, back to the sender.
pub fn consolidation_params(
    sender: KeySet,
    inputs: Vec<InputCoin>,
    fee: u64,
) -> Result<TxPrivacyInitParams> {
    let total = total_input(&inputs)?;
    if total < fee {
        return Err(ValidationError::InsufficientFunds {
            available: total,
            required: fee,
        }
        .into());
    }
    let payments = if total > fee {
        vec![PaymentInfo::new(*sender.payment_address(), total - fee)]
    } else {
        Vec::new()
    };
    Ok(TxPrivacyInitParams::new(sender, payments, inputs, fee))
}

/// One consolidation job per batch of same-version coins, largest coins
/// first. Batches of a single coin are left alone.
pub fn plan_consolidation(
    sender: &KeySet,
    coins: Vec<InputCoin>,
    settings: &ConsolidationConfig,
) -> Result<Vec<TxPrivacyInitParams>> {
    let (v1, v2) = divide_coins(coins);
    [v1, v2]
        .into_iter()
        .flat_map(|side| split_into_batches(side, settings.max_inputs_per_tx))
        .filter(|batch| batch.len() > 1)
        .map(|batch| consolidation_params(sender.clone(), batch, settings.fee_per_tx))
        .collect()
}

/// Runs consolidation jobs on a pool of worker threads.
pub struct BatchRunner<'a, P, B> {
    config: &'a ProtocolConfig,
    settings: ConsolidationConfig,
    provider: &'a P,
    broadcaster: &'a B,
}

impl<'a, P, B> BatchRunner<'a, P, B>
where
    P: DecoyProvider + Sync,
    B: TxBroadcaster,
{
    /// A runner building with `provider`'s decoys and broadcasting through
    /// `broadcaster`.
    pub fn new(
        config: &'a ProtocolConfig,
        settings: ConsolidationConfig,
        provider: &'a P,
        broadcaster: &'a B,
    ) -> Self {
        Self {
            config,
            settings,
            provider,
            broadcaster,
        }
    }

    /// Build, submit and await every job. Jobs still running or queued when
    /// the batch deadline passes fail with
    /// [`ConsolidationError::BatchTimeout`].
    pub fn run(&self, jobs: Vec<TxPrivacyInitParams>) -> BatchReport {
        let total = jobs.len();
        let deadline = Instant::now() + self.settings.batch_timeout;
        let abort = AtomicBool::new(false);
        let (job_tx, job_rx) = crossbeam_channel::unbounded();
        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        for job in jobs.into_iter().enumerate() {
            // The receiver is alive until the scope below ends.
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        let mut report = BatchReport::default();
        let workers = self.settings.workers.clamp(1, total.max(1));
        tracing::info!(jobs = total, workers, "consolidation batch started");

        thread::scope(|scope| {
            for worker in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let abort = &abort;
                scope.spawn(move || {
                    let mut rng = StdRng::from_entropy();
                    for (index, params) in job_rx.iter() {
                        if abort.load(Ordering::Relaxed) {
                            break;
                        }
                        let outcome = self.run_job(params, deadline, abort, &mut rng);
                        if result_tx.send((index, outcome)).is_err() {
                            break;
                        }
                    }
                    tracing::trace!(worker, "consolidation worker finished");
                });
            }
            drop(result_tx);

            let mut pending = total;
            while pending > 0 {
                match result_rx.recv_deadline(deadline) {
                    Ok((index, outcome)) => {
                        pending -= 1;
                        record(&mut report, index, outcome);
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        tracing::warn!(pending, "consolidation batch deadline passed");
                        abort.store(true, Ordering::Relaxed);
                        report.aborted = true;
                        break;
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        // Workers have joined; collect what they reported while stopping.
        for (index, outcome) in result_rx.try_iter() {
            record(&mut report, index, outcome);
        }
        let reported: HashSet<usize> = report
            .confirmed
            .iter()
            .map(|(i, _)| *i)
            .chain(report.failed.iter().map(|(i, _)| *i))
            .collect();
        for index in (0..total).filter(|i| !reported.contains(i)) {
            let err = if report.aborted {
                ConsolidationError::BatchTimeout
            } else {
                ConsolidationError::WorkerDisconnected
            };
            report.failed.push((index, err));
        }
        report.aborted |= report
            .failed
            .iter()
            .any(|(_, err)| *err == ConsolidationError::BatchTimeout);
        report.confirmed.sort_by_key(|(i, _)| *i);
        report.failed.sort_by_key(|(i, _)| *i);

        tracing::info!(
            confirmed = report.confirmed.len(),
            failed = report.failed.len(),
            aborted = report.aborted,
            "consolidation batch finished"
        );
        report
    }

    fn run_job(
        &self,
        params: TxPrivacyInitParams,
        deadline: Instant,
        abort: &AtomicBool,
        rng: &mut StdRng,
    ) -> core::result::Result<TxHash, ConsolidationError> {
        let built = TransactionBuilder::new(self.config, self.provider).build_tx(params, rng)?;
        self.broadcaster.submit(&built)?;
        let hash = hex::encode(built.hash);
        tracing::debug!(%hash, "consolidation transaction submitted");

        let tx_deadline = deadline.min(Instant::now() + self.settings.tx_timeout);
        loop {
            if self.broadcaster.is_confirmed(&built.hash)? {
                tracing::debug!(%hash, "consolidation transaction confirmed");
                return Ok(built.hash);
            }
            if abort.load(Ordering::Relaxed) {
                return Err(ConsolidationError::BatchTimeout);
            }
            let now = Instant::now();
            if now >= tx_deadline {
                return Err(if now >= deadline {
                    ConsolidationError::BatchTimeout
                } else {
                    ConsolidationError::ConfirmationTimeout(hash)
                });
            }
            thread::sleep(self.settings.poll_interval.min(tx_deadline - now));
        }
    }
}

fn record(
    report: &mut BatchReport,
    index: usize,
    outcome: core::result::Result<TxHash, ConsolidationError>,
) {
    match outcome {
        Ok(hash) => report.confirmed.push((index, hash)),
        Err(err) => {
            tracing::warn!(index, %err, "consolidation job failed");
            report.failed.push((index, err));
        }
    }
}
