//! Catalog Seed
//!
//! Loads starter catalog items from TOML files so a fresh database has
//! something to generate shops from.

use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

use super::item::NewItem;

#[derive(Debug, Deserialize)]
struct RawItemFile {
    #[serde(default)]
    items: Vec<NewItem>,
}

/// Items read from `<data_dir>/items/*.toml`
pub struct ItemSeed {
    items: Vec<NewItem>,
}

impl ItemSeed {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Load all item files from a data directory
    pub fn load_from_directory(&mut self, data_dir: &Path) -> Result<(), String> {
        let items_dir = data_dir.join("items");

        if !items_dir.exists() {
            warn!("Items directory does not exist: {:?}", items_dir);
            return Ok(());
        }

        let entries = std::fs::read_dir(&items_dir)
            .map_err(|e| format!("Failed to read items directory: {}", e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| format!("Failed to read entry: {}", e))?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "toml") {
                paths.push(path);
            }
        }
        // Stable insertion order across platforms
        paths.sort();

        for path in paths {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read {:?}: {}", path, e))?;

            let file: RawItemFile = toml::from_str(&content)
                .map_err(|e| format!("Failed to parse {:?}: {}", path, e))?;

            for item in file.items {
                if let Err(e) = item.check() {
                    warn!("Skipping item '{}' in {:?}: {}", item.name, path, e);
                    continue;
                }
                self.items.push(item);
            }
        }

        info!("Loaded {} seed items", self.items.len());
        Ok(())
    }

    pub fn items(&self) -> &[NewItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for ItemSeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_items_from_directory() {
        let temp_dir = TempDir::new().unwrap();
        let items_dir = temp_dir.path().join("items");
        std::fs::create_dir_all(&items_dir).unwrap();

        std::fs::write(
            items_dir.join("armes.toml"),
            r#"
[[items]]
name = "Épée longue"
type = "Arme"
subtype = "Martiale"
rarity = "1 - Commun"
value = 15
weight = 1.5
source = "Manuel des joueurs"

[[items]]
name = ""
type = "Arme"
rarity = "1 - Commun"
"#,
        )
        .unwrap();
        std::fs::write(items_dir.join("notes.txt"), "ignored").unwrap();

        let mut seed = ItemSeed::new();
        seed.load_from_directory(temp_dir.path()).unwrap();

        // Blank name is skipped
        assert_eq!(seed.len(), 1);
        let item = &seed.items()[0];
        assert_eq!(item.item_type, "Arme");
        assert_eq!(item.subtype.as_deref(), Some("Martiale"));
        assert_eq!(item.value, Some(15.0));
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let mut seed = ItemSeed::new();
        seed.load_from_directory(temp_dir.path()).unwrap();
        assert!(seed.is_empty());
    }

    #[test]
    fn test_parse_error_names_file() {
        let temp_dir = TempDir::new().unwrap();
        let items_dir = temp_dir.path().join("items");
        std::fs::create_dir_all(&items_dir).unwrap();
        std::fs::write(items_dir.join("broken.toml"), "[[items]\nname = ").unwrap();

        let mut seed = ItemSeed::new();
        let err = seed.load_from_directory(temp_dir.path()).unwrap_err();
        assert!(err.contains("broken.toml"));
    }

    #[test]
    fn test_shipped_items_use_known_rarities() {
        let mut seed = ItemSeed::new();
        seed.load_from_directory(Path::new("data")).unwrap();

        assert!(!seed.is_empty());
        for item in seed.items() {
            assert!(
                crate::catalog::RarityTier::from_label(&item.rarity).is_some(),
                "unknown rarity '{}' on {}",
                item.rarity,
                item.name
            );
        }
    }
}
