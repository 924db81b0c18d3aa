// Copyright (c) 2018-2025 The Botho Foundation

//! Decoys: fetching them from the chain and checking their shape once,
//! before any ring is built.

use prv_account_keys::ShardId;
use prv_crypto_ring_signature::MlsagKind;
use prv_transaction_core::{ring_ct::RingMember, Coin, ProtocolError, Result, TokenId};
use std::collections::HashSet;

/// Fetch rounds before giving up on collecting enough distinct decoys.
const MAX_DECOY_ROUNDS: usize = 3;

/// A chain coin offered as a decoy.
#[derive(Clone, Debug)]
pub struct DecoyEntry {
    /// The coin's index in its pool.
    pub index: u64,
    /// The coin.
    pub coin: Coin,
}

/// Source of random chain coins.
pub trait DecoyProvider {
    /// Up to `count` distinct random coins of `shard` from the pool of
    /// `token`.
    fn random_decoys(&self, shard: ShardId, token: &TokenId, count: usize) -> Result<Vec<DecoyEntry>>;
}

impl<P: DecoyProvider + ?Sized> DecoyProvider for &P {
    fn random_decoys(&self, shard: ShardId, token: &TokenId, count: usize) -> Result<Vec<DecoyEntry>> {
        (**self).random_decoys(shard, token, count)
    }
}

/// Distinct decoys, ready to fill ring rows.
#[derive(Clone, Debug, Default)]
pub struct DecoySet {
    members: Vec<RingMember>,
}

impl DecoySet {
    /// The members, in fetch order.
    pub fn members(&self) -> &[RingMember] {
        &self.members
    }

    /// Number of decoys.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True without decoys.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Chain indexes of the decoys.
    pub fn indexes(&self) -> Vec<u64> {
        self.members.iter().map(|m| m.index).collect()
    }
}

/// Decoys typed by the ring they are meant for.
#[derive(Clone, Debug)]
pub enum RingParams {
    /// Decoys of a plain ring.
    Plain(DecoySet),
    /// Decoys of a confidential-asset ring; each carries an asset tag.
    ConfidentialAsset(DecoySet),
}

impl RingParams {
    /// Check `members` suit a ring of `kind`: distinct, and tagged for
    /// confidential-asset rings.
    pub fn new(kind: MlsagKind, members: Vec<RingMember>) -> Result<Self> {
        let mut seen = HashSet::new();
        if let Some(dup) = members.iter().find(|m| !seen.insert(m.index)) {
            return Err(ProtocolError::UnknownRingMember(dup.index).into());
        }
        let set = DecoySet { members };
        match kind {
            MlsagKind::Plain => Ok(Self::Plain(set)),
            MlsagKind::ConfidentialAsset => {
                if let Some(untagged) = set.members.iter().find(|m| m.asset_tag.is_none()) {
                    return Err(ProtocolError::MissingAssetTag(untagged.index).into());
                }
                Ok(Self::ConfidentialAsset(set))
            }
        }
    }

    /// The ring kind these decoys are for.
    pub fn kind(&self) -> MlsagKind {
        match self {
            Self::Plain(_) => MlsagKind::Plain,
            Self::ConfidentialAsset(_) => MlsagKind::ConfidentialAsset,
        }
    }

    /// The decoys.
    pub fn decoys(&self) -> &DecoySet {
        match self {
            Self::Plain(set) | Self::ConfidentialAsset(set) => set,
        }
    }

    /// The decoys split into `parts` runs of equal length, one per
    /// single-input ring.
    pub fn split(&self, parts: usize) -> Vec<Vec<RingMember>> {
        let members = self.decoys().members();
        if parts == 0 {
            return Vec::new();
        }
        let per_part = members.len() / parts;
        (0..parts)
            .map(|i| members[i * per_part..(i + 1) * per_part].to_vec())
            .collect()
    }
}

/// Collect `count` distinct decoys of `shard` from the pool of `token`,
/// skipping the coins at `exclude`.
///
/// Fails with [`ProtocolError::MissingDecoys`] when the provider cannot
/// supply enough of them.
pub fn prepare_decoys<P: DecoyProvider>(
    provider: &P,
    shard: ShardId,
    token: &TokenId,
    count: usize,
    exclude: &[u64],
    kind: MlsagKind,
) -> Result<RingParams> {
    let mut seen: HashSet<u64> = exclude.iter().copied().collect();
    let mut members = Vec::with_capacity(count);

    for round in 0..MAX_DECOY_ROUNDS {
        if members.len() >= count {
            break;
        }
        let wanted = count - members.len() + exclude.len();
        let entries = provider.random_decoys(shard, token, wanted)?;
        if entries.is_empty() {
            break;
        }
        for entry in entries {
            if members.len() == count {
                break;
            }
            if seen.insert(entry.index) {
                members.push(RingMember::from_coin(entry.index, &entry.coin)?);
            }
        }
        tracing::trace!(round, collected = members.len(), count, "decoys fetched");
    }

    if members.len() < count {
        tracing::warn!(shard, %token, required = count, available = members.len(), "not enough decoys");
        return Err(ProtocolError::MissingDecoys {
            required: count,
            available: members.len(),
        }
        .into());
    }
    RingParams::new(kind, members)
}
