use serde::{Deserialize, Serialize};

// ============================================================================
// Catalog Item
// ============================================================================

/// A tradeable item as stored in the catalog.
///
/// Saved shops embed full copies of these records, so the JSON shape is
/// also the snapshot format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub subtype: Option<String>,
    pub rarity: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub characteristics: Option<String>,
    #[serde(default)]
    pub additional_info: Option<String>,
    #[serde(default)]
    pub source: String,
}

// ============================================================================
// New Item (create/update payload, seed files)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub subtype: Option<String>,
    pub rarity: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub characteristics: Option<String>,
    #[serde(default, alias = "additional_info")]
    pub additional_info: Option<String>,
    #[serde(default)]
    pub source: String,
}

impl NewItem {
    /// Check required fields, returning a message for the first missing one
    pub fn check(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Item name is required".to_string());
        }
        if self.item_type.trim().is_empty() {
            return Err("Item type is required".to_string());
        }
        if self.rarity.trim().is_empty() {
            return Err("Item rarity is required".to_string());
        }
        Ok(())
    }

    pub fn with_id(self, id: i64) -> CatalogItem {
        CatalogItem {
            id,
            name: self.name,
            item_type: self.item_type,
            subtype: self.subtype,
            rarity: self.rarity,
            value: self.value,
            weight: self.weight,
            characteristics: self.characteristics,
            additional_info: self.additional_info,
            source: self.source,
        }
    }
}
