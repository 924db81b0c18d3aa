// Copyright (c) 2018-2025 The Botho Foundation

//! Coin selection.
//!
//! Coins of the two versions never mix in one transaction, so candidates are
//! first split by version, each side sorted by value, largest first. The
//! selection itself is a greedy walk over the sorted coins.

use crate::params::InputCoin;
use prv_transaction_core::{coin::CoinVersion, Result, ValidationError};

/// Split `coins` into v1 and v2 coins, each sorted by value, largest first.
pub fn divide_coins(coins: Vec<InputCoin>) -> (Vec<InputCoin>, Vec<InputCoin>) {
    let (mut v1, mut v2): (Vec<_>, Vec<_>) = coins
        .into_iter()
        .partition(|coin| coin.version() == CoinVersion::V1);
    v1.sort_by(|a, b| b.value().cmp(&a.value()));
    v2.sort_by(|a, b| b.value().cmp(&a.value()));
    (v1, v2)
}

/// Pick positions in `values`, sorted largest first, whose sum reaches
/// `target`.
///
/// All of them when they sum to exactly `target`. Otherwise walk the coins
/// from the largest: a coin not above the remaining amount is taken; a
/// larger coin is skipped while the next coin still covers the remainder,
/// and taken to finish otherwise. Still short after the walk, the smallest
/// coin is added.
pub fn choose_best_indexes(values: &[u64], target: u64) -> Result<Vec<usize>> {
    let total = values
        .iter()
        .try_fold(0u64, |acc, v| acc.checked_add(*v))
        .ok_or(ValidationError::AmountOverflow)?;
    if total < target {
        return Err(ValidationError::InsufficientFunds {
            available: total,
            required: target,
        }
        .into());
    }
    if total == target {
        return Ok((0..values.len()).collect());
    }

    let mut chosen = Vec::new();
    let mut chosen_total = 0u64;
    let mut remain = target;
    for i in 0..values.len().saturating_sub(1) {
        if values[i] > remain {
            if values[i + 1] >= remain {
                continue;
            }
            chosen.push(i);
            chosen_total += values[i];
            break;
        }
        chosen.push(i);
        chosen_total += values[i];
        remain -= values[i];
    }

    if chosen_total < target {
        let last = values.len() - 1;
        chosen.push(last);
        chosen_total += values[last];
    }
    if chosen_total < target {
        return Err(ValidationError::InsufficientFunds {
            available: chosen_total,
            required: target,
        }
        .into());
    }
    Ok(chosen)
}

/// The coins of `sorted` chosen by [`choose_best_indexes`], with their
/// positions.
pub fn choose_best_coins_by_amount(
    sorted: &[InputCoin],
    target: u64,
) -> Result<(Vec<InputCoin>, Vec<usize>)> {
    let values: Vec<u64> = sorted.iter().map(InputCoin::value).collect();
    let indexes = choose_best_indexes(&values, target)?;
    let coins = indexes.iter().map(|i| sorted[*i].clone()).collect();
    Ok((coins, indexes))
}

/// Coins of `version` from `candidates` covering `target`.
pub fn select_coins(
    candidates: Vec<InputCoin>,
    version: CoinVersion,
    target: u64,
) -> Result<Vec<InputCoin>> {
    let (v1, v2) = divide_coins(candidates);
    let sorted = match version {
        CoinVersion::V1 => v1,
        CoinVersion::V2 => v2,
    };
    let (coins, indexes) = choose_best_coins_by_amount(&sorted, target)?;
    tracing::debug!(?version, target, ?indexes, "coins selected");
    Ok(coins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockChain;
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use prv_account_keys::AccountKey;
    use prv_transaction_core::{Error, ProtocolConfig};
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_exact_total_returns_everything() {
        assert_eq!(choose_best_indexes(&[5, 3, 2], 10).unwrap(), vec![0, 1, 2]);
        assert_eq!(choose_best_indexes(&[], 0).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn test_insufficient_funds() {
        assert_matches!(
            choose_best_indexes(&[5, 3], 9),
            Err(Error::Validation(ValidationError::InsufficientFunds {
                available: 8,
                required: 9
            }))
        );
    }

    #[test]
    fn test_greedy_walk() {
        // 10 is skipped because 9 still covers the target.
        assert_eq!(choose_best_indexes(&[10, 9, 1], 9).unwrap(), vec![1]);
        // Small coins are taken in turn, the last one finishing the walk.
        assert_eq!(choose_best_indexes(&[5, 5, 5, 1], 12).unwrap(), vec![0, 1, 2]);
        // Short after the walk, the smallest coin is appended.
        assert_eq!(choose_best_indexes(&[10, 10, 1], 11).unwrap(), vec![0, 2]);
        // A lone coin above the target.
        assert_eq!(choose_best_indexes(&[7], 3).unwrap(), vec![0]);
    }

    #[test]
    fn test_divide_coins_sorts_each_side() {
        let mut rng: StdRng = SeedableRng::from_seed([9u8; 32]);
        let mut chain = MockChain::new(ProtocolConfig::default(), [9u8; 32]);
        let account = AccountKey::random(&mut rng);
        let mut coins = chain.fund(&account, &[3, 9], CoinVersion::V1, None, &mut rng).unwrap();
        coins.extend(chain.fund(&account, &[4, 1, 8], CoinVersion::V2, None, &mut rng).unwrap());

        let (v1, v2) = divide_coins(coins.clone());
        assert_eq!(v1.iter().map(InputCoin::value).collect::<Vec<_>>(), vec![9, 3]);
        assert_eq!(v2.iter().map(InputCoin::value).collect::<Vec<_>>(), vec![8, 4, 1]);

        let selected = select_coins(coins, CoinVersion::V2, 9).unwrap();
        assert!(selected.iter().all(|c| c.version() == CoinVersion::V2));
        assert!(selected.iter().map(InputCoin::value).sum::<u64>() >= 9);
    }

    fn sorted_values() -> impl Strategy<Value = Vec<u64>> {
        prop::collection::vec(0u64..1_000_000, 0..20).prop_map(|mut values| {
            values.sort_unstable_by(|a, b| b.cmp(a));
            values
        })
    }

    proptest! {
        #[test]
        fn selection_covers_target(values in sorted_values(), fraction in 0u64..=100) {
            let total: u64 = values.iter().sum();
            let target = total * fraction / 100;
            let chosen = choose_best_indexes(&values, target).unwrap();

            let sum: u64 = chosen.iter().map(|i| values[*i]).sum();
            prop_assert!(sum >= target);

            let mut unique = chosen.clone();
            unique.sort_unstable();
            unique.dedup();
            prop_assert_eq!(unique.len(), chosen.len());
            prop_assert!(chosen.iter().all(|i| *i < values.len()));
        }

        #[test]
        fn selection_fails_above_total(values in sorted_values(), extra in 1u64..1000) {
            let total: u64 = values.iter().sum();
            let is_insufficient = matches!(
                choose_best_indexes(&values, total + extra),
                Err(Error::Validation(ValidationError::InsufficientFunds { .. }))
            );
            prop_assert!(is_insufficient);
        }
    }
}
