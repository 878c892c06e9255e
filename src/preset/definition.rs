//! Preset Definition Structures
//!
//! A preset is a named shop configuration with a few descriptive fields.

use serde::{Deserialize, Serialize};

use crate::shop::{RarityCounts, ShopConfig, TypeWeights};

/// A stored preset
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub wealth_level: Option<String>,
    pub shop_type: Option<String>,
    pub items_per_rarity: RarityCounts,
    pub type_chances: TypeWeights,
    pub is_default: bool,
    pub created_at: String,
}

impl Preset {
    pub fn config(&self) -> ShopConfig {
        ShopConfig::new(self.items_per_rarity.clone(), self.type_chances.clone())
    }
}

/// Preset fields supplied on create/update and in seed files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPreset {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "wealth_level")]
    pub wealth_level: Option<String>,
    #[serde(default, alias = "shop_type")]
    pub shop_type: Option<String>,
    #[serde(default, alias = "items_per_rarity")]
    pub items_per_rarity: RarityCounts,
    #[serde(default, alias = "type_chances")]
    pub type_chances: TypeWeights,
}

impl NewPreset {
    pub fn check(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Preset name is required".to_string());
        }
        if self.items_per_rarity.is_empty() || self.type_chances.is_empty() {
            return Err("Preset must define items per rarity and type chances".to_string());
        }
        Ok(())
    }
}
