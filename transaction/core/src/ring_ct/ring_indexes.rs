// Copyright (c) 2018-2025 The Botho Foundation

//! Chain indexes of every ring member, published so verifiers can rebuild
//! the ring.

use crate::{Result, SerializationError};
use prv_crypto_ring_signature::MAX_DIMENSION;

/// An `n x m` matrix of chain indexes: row `i`, column `j` is the coin used
/// for input `j` in ring row `i`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RingIndexes {
    rows: Vec<Vec<u64>>,
}

impl RingIndexes {
    /// Build from rows; rows must be non-empty and of equal length.
    pub fn new(rows: Vec<Vec<u64>>) -> Result<Self> {
        let columns = rows.first().map(Vec::len).unwrap_or(0);
        if columns == 0 {
            return Err(SerializationError::InvalidDimension(0).into());
        }
        if let Some(row) = rows.iter().find(|row| row.len() != columns) {
            return Err(SerializationError::LengthMismatch(row.len(), columns).into());
        }
        Ok(Self { rows })
    }

    /// Build from columns of equal length.
    pub fn from_columns(columns: Vec<Vec<u64>>) -> Result<Self> {
        let n = columns.first().map(Vec::len).unwrap_or(0);
        if let Some(column) = columns.iter().find(|column| column.len() != n) {
            return Err(SerializationError::LengthMismatch(column.len(), n).into());
        }
        Self::new(
            (0..n)
                .map(|i| columns.iter().map(|column| column[i]).collect())
                .collect(),
        )
    }

    /// Number of ring rows.
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of inputs.
    pub fn columns(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// The rows.
    pub fn as_rows(&self) -> &[Vec<u64>] {
        &self.rows
    }

    /// The chain indexes used for input `j`.
    pub fn column(&self, j: usize) -> Vec<u64> {
        self.rows.iter().filter_map(|row| row.get(j).copied()).collect()
    }

    /// `[rows][columns]` followed by little-endian `u64`s, row major.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let (n, m) = (self.rows(), self.columns());
        if n > MAX_DIMENSION {
            return Err(SerializationError::InvalidDimension(n).into());
        }
        if m > MAX_DIMENSION {
            return Err(SerializationError::InvalidDimension(m).into());
        }
        let mut bytes = Vec::with_capacity(2 + n * m * 8);
        bytes.push(n as u8);
        bytes.push(m as u8);
        for index in self.rows.iter().flatten() {
            bytes.extend_from_slice(&index.to_le_bytes());
        }
        Ok(bytes)
    }

    /// Inverse of [`RingIndexes::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 2 {
            return Err(SerializationError::LengthMismatch(bytes.len(), 2).into());
        }
        let (n, m) = (bytes[0] as usize, bytes[1] as usize);
        let expected = 2 + n * m * 8;
        if bytes.len() != expected {
            return Err(SerializationError::LengthMismatch(bytes.len(), expected).into());
        }
        let mut values = bytes[2..].chunks_exact(8).map(|chunk| {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            u64::from_le_bytes(word)
        });
        let rows = (0..n)
            .map(|_| values.by_ref().take(m).collect())
            .collect();
        Self::new(rows)
    }
}
