//! Saved Shop Structures
//!
//! A saved shop keeps its own copy of every item record. Later catalog edits
//! don't reach it, and edits made to the shop don't reach the catalog.

use serde::{Deserialize, Serialize};

use super::generator::GeneratedShop;
use crate::catalog::CatalogItem;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedShop {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Snapshot, serialized inline as `items`
    #[serde(flatten)]
    pub shop: GeneratedShop,
    pub created_at: String,
    pub updated_at: String,
}

/// Listing row, without the item snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedShopSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub item_count: usize,
    pub created_at: String,
    pub updated_at: String,
}

/// Payload for saving or editing a shop
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveShopRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub items: Vec<CatalogItem>,
}

impl SaveShopRequest {
    pub fn check(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Shop name is required".to_string());
        }
        Ok(())
    }
}

/// Serialize an item list for storage
pub fn encode_snapshot(items: &[CatalogItem]) -> Result<String, serde_json::Error> {
    serde_json::to_string(items)
}

/// Rebuild an item list from storage
pub fn decode_snapshot(json: &str) -> Result<Vec<CatalogItem>, serde_json::Error> {
    serde_json::from_str(json)
}
