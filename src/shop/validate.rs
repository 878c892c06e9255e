//! Structural checks on a shop configuration.
//!
//! Validation is advisory: generation never calls it, callers decide whether
//! to act on an invalid report.

use serde::Serialize;

use super::config::{MAX_ITEMS_PER_RARITY, ShopConfig};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Run every check and collect all failures
pub fn validate_config(config: &ShopConfig) -> ValidationReport {
    let mut errors = Vec::new();

    if config.type_chances.is_empty() {
        errors.push("Type chances must be a non-empty map".to_string());
    } else {
        let total: i128 = config.type_chances.values().map(|v| i128::from(*v)).sum();
        if total != 100 {
            errors.push(format!(
                "Type chances must total 100% (currently {}%)",
                total
            ));
        }

        let negative: Vec<&str> = config
            .type_chances
            .iter()
            .filter(|(_, v)| **v < 0)
            .map(|(k, _)| k.as_str())
            .collect();
        if !negative.is_empty() {
            errors.push(format!(
                "Type chances cannot contain negative values ({})",
                negative.join(", ")
            ));
        }
    }

    if config.items_per_rarity.is_empty() {
        errors.push("Items per rarity must be a non-empty map".to_string());
    } else {
        let negative: Vec<&str> = config
            .items_per_rarity
            .iter()
            .filter(|(_, v)| **v < 0)
            .map(|(k, _)| k.as_str())
            .collect();
        if !negative.is_empty() {
            errors.push(format!(
                "Items per rarity cannot contain negative values ({})",
                negative.join(", ")
            ));
        }

        let oversized: Vec<&str> = config
            .items_per_rarity
            .iter()
            .filter(|(_, v)| **v > MAX_ITEMS_PER_RARITY)
            .map(|(k, _)| k.as_str())
            .collect();
        if !oversized.is_empty() {
            errors.push(format!(
                "Items per rarity cannot exceed {} ({})",
                MAX_ITEMS_PER_RARITY,
                oversized.join(", ")
            ));
        }
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
    }
}
