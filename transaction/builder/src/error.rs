// Copyright (c) 2018-2025 The Botho Foundation

use displaydoc::Display;
use prv_transaction_core::Error as TxError;

/// An error that can occur while running a consolidation batch
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum ConsolidationError {
    /// Building the transaction failed: {0}
    Build(TxError),

    /// Submission rejected: {0}
    Submit(String),

    /// Confirmation query failed: {0}
    Query(String),

    /// Transaction {0} was not confirmed in time
    ConfirmationTimeout(String),

    /// Batch deadline passed before the job finished
    BatchTimeout,

    /// A worker stopped before reporting
    WorkerDisconnected,
}

impl From<TxError> for ConsolidationError {
    fn from(x: TxError) -> Self {
        ConsolidationError::Build(x)
    }
}
