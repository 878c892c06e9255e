//! Shop Generator
//!
//! Fills each requested rarity tier with catalog items, choosing the item
//! type for every slot from the configured type weights.
//!
//! Within a tier an item is only repeated once every eligible item has
//! already been placed. Tiers are fetched independently: a tier whose catalog
//! query fails contributes nothing and the rest of the shop is still built.
//! A tier never yields more than `MAX_ITEMS_PER_RARITY` items.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

use super::config::{MAX_ITEMS_PER_RARITY, ShopConfig, TypeWeights};
use super::normalize::normalize_percentages;
use crate::catalog::{CatalogError, CatalogItem, ItemCatalog};

/// Items produced by one generation, in tier order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedShop {
    pub items: Vec<CatalogItem>,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Every tier query failed, so the catalog itself is considered down
    #[error("item catalog unavailable ({tiers} rarity queries failed): {source}")]
    CatalogUnavailable {
        tiers: usize,
        #[source]
        source: CatalogError,
    },
}

/// Weighted type draw over percentages.
///
/// Walks the map in order and returns the first type whose cumulative weight
/// reaches a uniform roll in `[0, 100)`. Falls back to the first type when the
/// roll lands past the end; `None` only for an empty map.
pub fn pick_type<'a, R: Rng + ?Sized>(weights: &'a TypeWeights, rng: &mut R) -> Option<&'a str> {
    let roll: f64 = rng.gen_range(0.0..100.0);
    let mut cumulative = 0.0;

    for (label, weight) in weights {
        cumulative += *weight as f64;
        if cumulative >= roll {
            return Some(label.as_str());
        }
    }

    weights.keys().next().map(String::as_str)
}

/// Fill `count` slots from a single tier's pool
pub fn draw_tier<R: Rng + ?Sized>(
    pool: &[CatalogItem],
    count: usize,
    weights: &TypeWeights,
    rng: &mut R,
) -> Vec<CatalogItem> {
    let mut selected = Vec::with_capacity(count.min(pool.len()));
    if pool.is_empty() {
        return selected;
    }

    let mut used: HashSet<i64> = HashSet::new();

    for _ in 0..count {
        let mut eligible: Vec<&CatalogItem> = match pick_type(weights, rng) {
            Some(item_type) => pool.iter().filter(|i| i.item_type == item_type).collect(),
            None => Vec::new(),
        };
        if eligible.is_empty() {
            eligible = pool.iter().collect();
        }

        let fresh: Vec<&CatalogItem> = eligible
            .iter()
            .copied()
            .filter(|i| !used.contains(&i.id))
            .collect();

        let chosen = match fresh.choose(rng) {
            Some(item) => {
                used.insert(item.id);
                Some(*item)
            }
            // Every eligible item is already in this tier: allow a repeat
            None => eligible.choose(rng).copied(),
        };

        if let Some(item) = chosen {
            selected.push(item.clone());
        }
    }

    selected
}

/// Build a shop from the catalog.
///
/// Tiers are processed in the order of `items_per_rarity`; tiers with a
/// non-positive count are skipped and larger counts are clamped to
/// `MAX_ITEMS_PER_RARITY`. Type weights are normalized to 100 first.
pub async fn generate_shop<C, R>(
    catalog: &C,
    config: &ShopConfig,
    rng: &mut R,
) -> Result<GeneratedShop, GenerateError>
where
    C: ItemCatalog + ?Sized,
    R: Rng + ?Sized,
{
    let weights = normalize_percentages(&config.type_chances);
    let mut items = Vec::new();
    let mut queried = 0;
    let mut failures = 0;
    let mut last_error = None;

    for (rarity, count) in &config.items_per_rarity {
        if *count <= 0 {
            continue;
        }

        queried += 1;
        let pool = match catalog.find_by_rarity(rarity).await {
            Ok(pool) => pool,
            Err(e) => {
                warn!("Skipping rarity '{}': {}", rarity, e);
                failures += 1;
                last_error = Some(e);
                continue;
            }
        };

        if pool.is_empty() {
            debug!("No catalog items with rarity '{}', skipping", rarity);
            continue;
        }

        if *count > MAX_ITEMS_PER_RARITY {
            warn!(
                "Rarity '{}' asks for {} items, clamping to {}",
                rarity, count, MAX_ITEMS_PER_RARITY
            );
        }
        let Ok(slots) = usize::try_from((*count).min(MAX_ITEMS_PER_RARITY)) else {
            continue;
        };

        let drawn = draw_tier(&pool, slots, &weights, rng);
        debug!(
            "Rarity '{}': {} of {} requested items from a pool of {}",
            rarity,
            drawn.len(),
            count,
            pool.len()
        );
        items.extend(drawn);
    }

    if let Some(source) = last_error {
        if failures == queried {
            return Err(GenerateError::CatalogUnavailable {
                tiers: failures,
                source,
            });
        }
    }

    Ok(GeneratedShop { items })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shop::config::RarityCounts;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn item(id: i64, item_type: &str, rarity: &str) -> CatalogItem {
        CatalogItem {
            id,
            name: format!("{} #{}", item_type, id),
            item_type: item_type.to_string(),
            subtype: None,
            rarity: rarity.to_string(),
            value: Some(10.0),
            weight: None,
            characteristics: None,
            additional_info: None,
            source: "test".to_string(),
        }
    }

    fn config(rarity: &[(&str, i64)], types: &[(&str, i64)]) -> ShopConfig {
        ShopConfig::new(
            rarity.iter().map(|(k, v)| (k.to_string(), *v)).collect::<RarityCounts>(),
            types.iter().map(|(k, v)| (k.to_string(), *v)).collect::<TypeWeights>(),
        )
    }

    /// Catalog that fails for selected rarities
    struct FlakyCatalog {
        items: Vec<CatalogItem>,
        broken: Vec<&'static str>,
    }

    impl ItemCatalog for FlakyCatalog {
        async fn find_by_rarity(&self, rarity: &str) -> Result<Vec<CatalogItem>, CatalogError> {
            if self.broken.iter().any(|b| *b == rarity) {
                return Err(CatalogError::Unavailable(format!("{} offline", rarity)));
            }
            self.items.find_by_rarity(rarity).await
        }
    }

    #[tokio::test]
    async fn test_exact_count_without_duplicates() {
        let catalog: Vec<CatalogItem> = (1..=8).map(|id| item(id, "Arme", "R1")).collect();
        let mut rng = StdRng::seed_from_u64(1);

        let shop = generate_shop(&catalog, &config(&[("R1", 5)], &[("Arme", 100)]), &mut rng)
            .await
            .unwrap();

        assert_eq!(shop.items.len(), 5);
        assert!(shop.items.iter().all(|i| i.rarity == "R1"));
        let ids: HashSet<i64> = shop.items.iter().map(|i| i.id).collect();
        assert_eq!(ids.len(), 5);
    }

    #[tokio::test]
    async fn test_duplicates_only_when_pool_exhausted() {
        let catalog = vec![item(1, "Arme", "R1"), item(2, "Arme", "R1"), item(3, "Arme", "R2")];
        let mut rng = StdRng::seed_from_u64(2);

        let shop = generate_shop(&catalog, &config(&[("R1", 5)], &[("Arme", 100)]), &mut rng)
            .await
            .unwrap();

        assert_eq!(shop.items.len(), 5);
        assert!(shop.items.iter().all(|i| i.id == 1 || i.id == 2));
        // The first two picks exhaust the pool before any repeat
        assert_ne!(shop.items[0].id, shop.items[1].id);
    }

    #[tokio::test]
    async fn test_empty_tier_skipped() {
        let catalog = vec![item(1, "Arme", "R1")];
        let mut rng = StdRng::seed_from_u64(3);

        let shop = generate_shop(&catalog, &config(&[("R2", 3)], &[("Arme", 100)]), &mut rng)
            .await
            .unwrap();
        assert!(shop.items.is_empty());
    }

    #[tokio::test]
    async fn test_tier_order_and_zero_counts() {
        let catalog = vec![
            item(1, "Arme", "1 - Commun"),
            item(2, "Arme", "1 - Commun"),
            item(3, "Potion", "3 - Rare"),
            item(4, "Potion", "2 - Peu commun"),
        ];
        let mut rng = StdRng::seed_from_u64(4);

        let shop = generate_shop(
            &catalog,
            &config(
                &[("3 - Rare", 1), ("2 - Peu commun", 0), ("1 - Commun", 2)],
                &[("Arme", 50), ("Potion", 50)],
            ),
            &mut rng,
        )
        .await
        .unwrap();

        let rarities: Vec<&str> = shop.items.iter().map(|i| i.rarity.as_str()).collect();
        assert_eq!(rarities, ["3 - Rare", "1 - Commun", "1 - Commun"]);
    }

    #[tokio::test]
    async fn test_missing_type_falls_back_to_whole_tier() {
        let catalog = vec![item(1, "Armure", "R1"), item(2, "Armure", "R1")];
        let mut rng = StdRng::seed_from_u64(5);

        // Only "Potion" is requested but the tier has none
        let shop = generate_shop(&catalog, &config(&[("R1", 2)], &[("Potion", 100)]), &mut rng)
            .await
            .unwrap();
        assert_eq!(shop.items.len(), 2);
        assert!(shop.items.iter().all(|i| i.item_type == "Armure"));
    }

    #[tokio::test]
    async fn test_empty_type_chances_use_whole_tier() {
        let catalog = vec![item(1, "Armure", "R1"), item(2, "Potion", "R1")];
        let mut rng = StdRng::seed_from_u64(6);

        let shop = generate_shop(&catalog, &config(&[("R1", 2)], &[]), &mut rng)
            .await
            .unwrap();
        let ids: HashSet<i64> = shop.items.iter().map(|i| i.id).collect();
        assert_eq!(ids, HashSet::from([1, 2]));
    }

    #[tokio::test]
    async fn test_failed_tier_is_skipped() {
        let catalog = FlakyCatalog {
            items: vec![item(1, "Arme", "R1"), item(2, "Arme", "R2")],
            broken: vec!["R2"],
        };
        let mut rng = StdRng::seed_from_u64(7);

        let shop = generate_shop(&catalog, &config(&[("R1", 1), ("R2", 1)], &[("Arme", 100)]), &mut rng)
            .await
            .unwrap();
        assert_eq!(shop.items.len(), 1);
        assert_eq!(shop.items[0].id, 1);
    }

    #[tokio::test]
    async fn test_all_tiers_failing_is_an_error() {
        let catalog = FlakyCatalog {
            items: Vec::new(),
            broken: vec!["R1", "R2"],
        };
        let mut rng = StdRng::seed_from_u64(8);

        let result = generate_shop(&catalog, &config(&[("R1", 1), ("R2", 2), ("R3", 0)], &[("Arme", 100)]), &mut rng).await;
        match result {
            Err(GenerateError::CatalogUnavailable { tiers, .. }) => assert_eq!(tiers, 2),
            Ok(shop) => panic!("expected failure, got {} items", shop.items.len()),
        }
    }

    #[tokio::test]
    async fn test_no_tiers_requested() {
        let catalog: Vec<CatalogItem> = Vec::new();
        let mut rng = StdRng::seed_from_u64(9);
        let shop = generate_shop(&catalog, &ShopConfig::default(), &mut rng).await.unwrap();
        assert!(shop.items.is_empty());
    }

    #[tokio::test]
    async fn test_type_ratio_converges() {
        let mut catalog: Vec<CatalogItem> = (1..=5).map(|id| item(id, "Arme", "1 - Commun")).collect();
        catalog.extend((6..=10).map(|id| item(id, "Armure", "1 - Commun")));
        let shop_config = config(&[("1 - Commun", 4)], &[("Arme", 50), ("Armure", 50)]);
        let mut rng = StdRng::seed_from_u64(10);

        let mut weapons = 0;
        let mut total = 0;
        for _ in 0..1000 {
            let shop = generate_shop(&catalog, &shop_config, &mut rng).await.unwrap();
            assert_eq!(shop.items.len(), 4);
            let ids: HashSet<i64> = shop.items.iter().map(|i| i.id).collect();
            assert_eq!(ids.len(), 4);

            weapons += shop.items.iter().filter(|i| i.item_type == "Arme").count();
            total += shop.items.len();
        }

        let ratio = weapons as f64 / total as f64;
        assert!((0.45..0.55).contains(&ratio), "weapon ratio = {}", ratio);
    }

    #[tokio::test]
    async fn test_huge_tier_count_is_clamped() {
        let catalog = vec![item(1, "Arme", "R1"), item(2, "Potion", "R2")];
        let mut rng = StdRng::seed_from_u64(12);

        let shop = generate_shop(
            &catalog,
            &config(&[("R1", 1_000_000_000_000_000), ("R2", i64::MAX)], &[("Arme", 100)]),
            &mut rng,
        )
        .await
        .unwrap();

        let cap = MAX_ITEMS_PER_RARITY as usize;
        assert_eq!(shop.items.len(), 2 * cap);
        assert!(shop.items[..cap].iter().all(|i| i.id == 1));
        assert!(shop.items[cap..].iter().all(|i| i.id == 2));
    }

    #[tokio::test]
    async fn test_extreme_type_weights_still_generate() {
        let catalog = vec![item(1, "Arme", "R1"), item(2, "Potion", "R1")];
        let mut rng = StdRng::seed_from_u64(13);

        for types in [
            &[("Arme", 5), ("Potion", 5), ("Parchemin", -10)][..],
            &[("Arme", i64::MAX), ("Potion", 1)][..],
        ] {
            let shop = generate_shop(&catalog, &config(&[("R1", 2)], types), &mut rng)
                .await
                .unwrap();
            assert_eq!(shop.items.len(), 2);
        }
    }

    #[test]
    fn test_pick_type_respects_zero_weight_tail() {
        let mut weights = TypeWeights::new();
        weights.insert("Arme".to_string(), 100);
        weights.insert("Potion".to_string(), 0);
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..200 {
            assert_eq!(pick_type(&weights, &mut rng), Some("Arme"));
        }
        assert_eq!(pick_type(&TypeWeights::new(), &mut rng), None);
    }
}
