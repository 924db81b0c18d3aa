// Copyright (c) 2018-2025 The Botho Foundation

//! An in-memory chain for tests: coin pools per token, decoy sampling and
//! ring member lookup.

use crate::{
    decoys::{DecoyEntry, DecoyProvider},
    params::InputCoin,
};
use prv_account_keys::{shard_id_from_last_byte, AccountKey, PublicAddress, ShardId};
use prv_crypto_keys::CompressedRistrettoPublic;
use prv_transaction_core::{
    coin::{decrypt, new_output_coin, CoinV1, CoinVersion},
    tx::AnyTx,
    validation::RingMemberSource,
    Coin, CoinBase, PaymentInfo, ProtocolConfig, Result, TokenId,
};
use rand::{rngs::StdRng, seq::SliceRandom, CryptoRng, RngCore, SeedableRng};
use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

/// The pool a coin is published in: the umbrella pool for
/// confidential-asset coins, the token's own pool otherwise.
pub fn pool_of(coin: &Coin, token: Option<&TokenId>) -> TokenId {
    match (coin.asset_tag(), token) {
        (Some(_), _) => TokenId::CONFIDENTIAL_ASSET,
        (None, Some(token)) => *token,
        (None, None) => TokenId::NATIVE,
    }
}

/// A chain held in memory.
pub struct MockChain {
    config: ProtocolConfig,
    pools: HashMap<TokenId, Vec<Coin>>,
    rng: Mutex<StdRng>,
}

impl MockChain {
    /// An empty chain sampling decoys with a generator seeded by `seed`.
    pub fn new(config: ProtocolConfig, seed: [u8; 32]) -> Self {
        Self {
            config,
            pools: HashMap::new(),
            rng: Mutex::new(StdRng::from_seed(seed)),
        }
    }

    /// The protocol parameters.
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Append `coin` to the pool of `token`, returning its index.
    pub fn add_coin(&mut self, token: TokenId, coin: Coin) -> u64 {
        let pool = self.pools.entry(token).or_default();
        pool.push(coin);
        (pool.len() - 1) as u64
    }

    /// Number of coins in the pool of `token`.
    pub fn pool_len(&self, token: &TokenId) -> usize {
        self.pools.get(token).map_or(0, Vec::len)
    }

    /// Publish every output of `tx` in its pool. Token outputs go to the
    /// token's pool, or the umbrella pool when confidential.
    pub fn add_tx_outputs(&mut self, tx: &AnyTx) {
        match tx {
            AnyTx::Tx(tx) => {
                for coin in tx.output_coins() {
                    let pool = pool_of(&coin, None);
                    self.add_coin(pool, coin);
                }
            }
            AnyTx::Token(tx) => {
                for coin in tx.fee_tx.output_coins() {
                    self.add_coin(TokenId::NATIVE, coin);
                }
                for coin in tx.token_tx.output_coins() {
                    let pool = pool_of(&coin, Some(tx.token_id()));
                    self.add_coin(pool, coin);
                }
            }
        }
    }

    /// Create a coin of `value` paying `address`.
    pub fn mint_coin<R: CryptoRng + RngCore>(
        &self,
        address: &PublicAddress,
        value: u64,
        version: CoinVersion,
        token: Option<&TokenId>,
        rng: &mut R,
    ) -> Result<Coin> {
        let info = PaymentInfo::new(*address, value);
        Ok(match version {
            CoinVersion::V1 => Coin::V1(CoinV1::new_output(&info, true, rng).coin),
            CoinVersion::V2 => {
                let token = token.filter(|token| !token.is_native());
                Coin::V2(new_output_coin(&info, 0, token, &self.config, rng)?.coin)
            }
        })
    }

    /// Give `account` one coin per value and return them decrypted.
    ///
    /// v2 coins of a non-native `token` are confidential-asset coins; v1
    /// coins of a token go to that token's pool.
    pub fn fund<R: CryptoRng + RngCore>(
        &mut self,
        account: &AccountKey,
        values: &[u64],
        version: CoinVersion,
        token: Option<TokenId>,
        rng: &mut R,
    ) -> Result<Vec<InputCoin>> {
        let key_set = account.key_set();
        values
            .iter()
            .map(|value| {
                let coin =
                    self.mint_coin(&account.public_address(), *value, version, token.as_ref(), rng)?;
                let plain = decrypt(&coin, &key_set)?;
                let pool = pool_of(&coin, token.as_ref());
                let index = self.add_coin(pool, coin);
                Ok(InputCoin::new(plain, index))
            })
            .collect()
    }

    /// Add `count` coins of strangers routed to `shard`.
    pub fn populate_decoys<R: CryptoRng + RngCore>(
        &mut self,
        shard: ShardId,
        token: Option<TokenId>,
        version: CoinVersion,
        count: usize,
        rng: &mut R,
    ) -> Result<()> {
        let mut added = 0;
        while added < count {
            let stranger = AccountKey::random(rng).public_address();
            if stranger.shard_id(self.config.num_shards) != shard {
                continue;
            }
            let value = rng.next_u64() % 1_000_000;
            let coin = self.mint_coin(&stranger, value, version, token.as_ref(), rng)?;
            let pool = pool_of(&coin, token.as_ref());
            self.add_coin(pool, coin);
            added += 1;
        }
        Ok(())
    }

    fn shard_of(&self, coin: &Coin) -> ShardId {
        let key: &CompressedRistrettoPublic = coin.public_key();
        shard_id_from_last_byte(key.last_byte(), self.config.num_shards)
    }
}

impl DecoyProvider for MockChain {
    fn random_decoys(&self, shard: ShardId, token: &TokenId, count: usize) -> Result<Vec<DecoyEntry>> {
        let candidates: Vec<DecoyEntry> = self
            .pools
            .get(token)
            .map(|pool| {
                pool.iter()
                    .enumerate()
                    .filter(|(_, coin)| self.shard_of(coin) == shard)
                    .map(|(index, coin)| DecoyEntry {
                        index: index as u64,
                        coin: coin.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(candidates
            .choose_multiple(&mut *rng, count)
            .cloned()
            .collect())
    }
}

impl RingMemberSource for MockChain {
    fn coin(&self, token: &TokenId, index: u64) -> Option<Coin> {
        self.pools.get(token)?.get(index as usize).cloned()
    }
}
