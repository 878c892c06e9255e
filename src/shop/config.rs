//! Shop configuration
//!
//! Both maps keep insertion order: rarity tiers are generated in the order the
//! caller listed them and type weights are walked in order during selection.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Rarity label -> number of items to place
pub type RarityCounts = IndexMap<String, i64>;

/// Type label -> relative weight, meant to total 100
pub type TypeWeights = IndexMap<String, i64>;

/// Largest item count a single rarity tier can produce
pub const MAX_ITEMS_PER_RARITY: i64 = 500;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopConfig {
    #[serde(default)]
    pub items_per_rarity: RarityCounts,
    #[serde(default)]
    pub type_chances: TypeWeights,
}

impl ShopConfig {
    pub fn new(items_per_rarity: RarityCounts, type_chances: TypeWeights) -> Self {
        Self {
            items_per_rarity,
            type_chances,
        }
    }

    /// Number of items a generation would produce with an unlimited catalog
    pub fn requested_items(&self) -> i64 {
        self.items_per_rarity
            .values()
            .map(|c| (*c).clamp(0, MAX_ITEMS_PER_RARITY))
            .sum()
    }
}
