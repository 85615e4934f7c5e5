//! Random asset selection

use rand::seq::SliceRandom;
use rand::Rng;
use relay_core::{AssetSelection, RelayError, Result};
use tracing::info;

/// Choose `k` distinct assets uniformly at random without replacement
///
/// Duplicate values in the pool count once, so the selection is always made
/// of `k` different references.
///
/// # Errors
/// `RelayError::InsufficientPool` when the pool holds fewer than `k` distinct values.
pub fn pick<R>(pool: &[String], k: usize, rng: &mut R) -> Result<AssetSelection>
where
    R: Rng + ?Sized,
{
    let mut distinct: Vec<&String> = Vec::with_capacity(pool.len());
    for asset in pool {
        if !distinct.contains(&asset) {
            distinct.push(asset);
        }
    }

    if distinct.len() < k {
        return Err(RelayError::InsufficientPool {
            needed: k,
            available: distinct.len(),
        });
    }

    let chosen: Vec<String> = distinct
        .choose_multiple(rng, k)
        .map(|asset| (*asset).clone())
        .collect();

    info!("Selected assets: {:?}", chosen);
    Ok(AssetSelection::new(chosen))
}

/// [`pick`] with the thread-local RNG
pub fn pick_assets(pool: &[String], k: usize) -> Result<AssetSelection> {
    pick(pool, k, &mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://img.example/{}.png", i)).collect()
    }

    #[test]
    fn test_pool_too_small() {
        let mut rng = StdRng::seed_from_u64(7);
        let result = pick(&pool(1), 2, &mut rng);
        assert!(matches!(
            result,
            Err(RelayError::InsufficientPool { needed: 2, available: 1 })
        ));

        assert!(pick(&[], 2, &mut rng).is_err());
    }

    #[test]
    fn test_duplicates_do_not_satisfy_pool_size() {
        let mut rng = StdRng::seed_from_u64(7);
        let dupes = vec!["a".to_string(), "a".to_string()];
        assert!(pick(&dupes, 2, &mut rng).is_err());
    }

    #[test]
    fn test_exact_pool_returns_both() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool = pool(2);
        let selection = pick(&pool, 2, &mut rng).unwrap();

        let mut chosen: Vec<String> = selection.as_slice().to_vec();
        chosen.sort();
        assert_eq!(chosen, pool);
    }

    #[test]
    fn test_larger_pool_returns_distinct_members() {
        let mut rng = StdRng::seed_from_u64(42);
        let pool = pool(6);

        for _ in 0..50 {
            let selection = pick(&pool, 2, &mut rng).unwrap();
            assert_eq!(selection.len(), 2);
            assert_ne!(selection.as_slice()[0], selection.as_slice()[1]);
            assert!(selection.iter().all(|asset| pool.iter().any(|p| p == asset)));
        }
    }

    #[test]
    fn test_pick_assets_uses_thread_rng() {
        let selection = pick_assets(&pool(3), 2).unwrap();
        assert_eq!(selection.len(), 2);
    }
}
