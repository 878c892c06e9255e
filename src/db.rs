use sqlx::sqlite::{Sqlite, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Executor, Row};

use crate::catalog::{CatalogError, CatalogItem, ItemCatalog, NewItem};
use crate::preset::{NewPreset, Preset};
use crate::shop::saved::{decode_snapshot, encode_snapshot};
use crate::shop::{GeneratedShop, SaveShopRequest, SavedShop, SavedShopSummary};

/// Marker written once the shipped default presets have been inserted
const DEFAULT_PRESETS_SEED: &str = "default_presets";

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("stored JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct Database {
    pool: SqlitePool,
}

fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Insert one catalog item through a pool or a transaction, returning its id
async fn insert_item<'e, E>(executor: E, item: &NewItem) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"INSERT INTO items
            (name, item_type, subtype, rarity, value, weight, characteristics, additional_info, source)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&item.name)
    .bind(&item.item_type)
    .bind(&item.subtype)
    .bind(&item.rarity)
    .bind(item.value)
    .bind(item.weight)
    .bind(&item.characteristics)
    .bind(&item.additional_info)
    .bind(&item.source)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

async fn insert_preset<'e, E>(
    executor: E,
    preset: &NewPreset,
    is_default: bool,
    created_at: &str,
) -> Result<i64, DbError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rarity_json = serde_json::to_string(&preset.items_per_rarity)?;
    let types_json = serde_json::to_string(&preset.type_chances)?;

    let result = sqlx::query(
        r#"INSERT INTO presets
            (name, description, wealth_level, shop_type, items_per_rarity_json, type_chances_json, is_default, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&preset.name)
    .bind(&preset.description)
    .bind(&preset.wealth_level)
    .bind(&preset.shop_type)
    .bind(rarity_json)
    .bind(types_json)
    .bind(is_default)
    .bind(created_at)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

fn item_from_row(r: &SqliteRow) -> CatalogItem {
    CatalogItem {
        id: r.get("id"),
        name: r.get("name"),
        item_type: r.get("item_type"),
        subtype: r.get("subtype"),
        rarity: r.get("rarity"),
        value: r.get("value"),
        weight: r.get("weight"),
        characteristics: r.get("characteristics"),
        additional_info: r.get("additional_info"),
        source: r.get("source"),
    }
}

fn preset_from_row(r: &SqliteRow) -> Result<Preset, DbError> {
    let rarity_json: String = r.get("items_per_rarity_json");
    let types_json: String = r.get("type_chances_json");
    Ok(Preset {
        id: r.get("id"),
        name: r.get("name"),
        description: r.get("description"),
        wealth_level: r.get("wealth_level"),
        shop_type: r.get("shop_type"),
        items_per_rarity: serde_json::from_str(&rarity_json)?,
        type_chances: serde_json::from_str(&types_json)?,
        is_default: r.get("is_default"),
        created_at: r.get("created_at"),
    })
}

fn shop_from_row(r: &SqliteRow) -> Result<SavedShop, DbError> {
    let items_json: String = r.get("items_json");
    Ok(SavedShop {
        id: r.get("id"),
        name: r.get("name"),
        description: r.get("description"),
        shop: GeneratedShop {
            items: decode_snapshot(&items_json)?,
        },
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}

const ITEM_COLUMNS: &str =
    "id, name, item_type, subtype, rarity, value, weight, characteristics, additional_info, source";

const PRESET_COLUMNS: &str = "id, name, description, wealth_level, shop_type, \
     items_per_rarity_json, type_chances_json, is_default, created_at";

impl Database {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        // Run migrations
        Self::migrate(&pool).await?;

        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                item_type TEXT NOT NULL,
                subtype TEXT,
                rarity TEXT NOT NULL,
                value REAL,
                weight REAL,
                characteristics TEXT,
                additional_info TEXT,
                source TEXT NOT NULL DEFAULT ''
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_rarity ON items(rarity)")
            .execute(pool)
            .await?;

        // Saved shops keep a full JSON copy of their items
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS shops (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT,
                items_json TEXT NOT NULL DEFAULT '[]',
                item_count INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS presets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT,
                wealth_level TEXT,
                shop_type TEXT,
                items_per_rarity_json TEXT NOT NULL DEFAULT '{}',
                type_chances_json TEXT NOT NULL DEFAULT '{}',
                is_default BOOLEAN NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS seed_state (
                name TEXT PRIMARY KEY,
                seeded_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        tracing::info!("Database migrations complete");
        Ok(())
    }

    // ========================================================================
    // Catalog items
    // ========================================================================

    pub async fn create_item(&self, item: &NewItem) -> Result<CatalogItem, sqlx::Error> {
        let id = insert_item(&self.pool, item).await?;
        Ok(item.clone().with_id(id))
    }

    pub async fn get_item(&self, id: i64) -> Result<Option<CatalogItem>, sqlx::Error> {
        let row = sqlx::query(&format!("SELECT {} FROM items WHERE id = ?", ITEM_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(item_from_row))
    }

    /// List items, optionally filtered by exact rarity and/or type
    pub async fn list_items(
        &self,
        rarity: Option<&str>,
        item_type: Option<&str>,
    ) -> Result<Vec<CatalogItem>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM items
             WHERE (?1 IS NULL OR rarity = ?1) AND (?2 IS NULL OR item_type = ?2)
             ORDER BY rarity, name, id",
            ITEM_COLUMNS
        ))
        .bind(rarity)
        .bind(item_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(item_from_row).collect())
    }

    /// Returns the updated item, or `None` if no item has this id
    pub async fn update_item(&self, id: i64, item: &NewItem) -> Result<Option<CatalogItem>, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE items SET
                name = ?, item_type = ?, subtype = ?, rarity = ?, value = ?,
                weight = ?, characteristics = ?, additional_info = ?, source = ?
            WHERE id = ?"#,
        )
        .bind(&item.name)
        .bind(&item.item_type)
        .bind(&item.subtype)
        .bind(&item.rarity)
        .bind(item.value)
        .bind(item.weight)
        .bind(&item.characteristics)
        .bind(&item.additional_info)
        .bind(&item.source)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(item.clone().with_id(id)))
    }

    pub async fn delete_item(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Distinct item types in the catalog, sorted
    pub async fn list_item_types(&self) -> Result<Vec<String>, sqlx::Error> {
        let rows = sqlx::query("SELECT DISTINCT item_type FROM items ORDER BY item_type")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(|r| r.get("item_type")).collect())
    }

    pub async fn count_items(&self) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM items")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    /// Insert seed items, but only into an empty catalog
    pub async fn seed_items_if_empty(&self, items: &[NewItem]) -> Result<usize, sqlx::Error> {
        if items.is_empty() || self.count_items().await? > 0 {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        for item in items {
            insert_item(&mut *tx, item).await?;
        }
        tx.commit().await?;

        tracing::info!("Seeded catalog with {} items", items.len());
        Ok(items.len())
    }

    // ========================================================================
    // Saved shops
    // ========================================================================

    pub async fn save_shop(&self, req: &SaveShopRequest) -> Result<SavedShop, DbError> {
        let items_json = encode_snapshot(&req.items)?;
        let now = now_timestamp();

        let result = sqlx::query(
            r#"INSERT INTO shops (name, description, items_json, item_count, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&req.name)
        .bind(&req.description)
        .bind(&items_json)
        .bind(req.items.len() as i64)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        tracing::info!(
            "Saved shop '{}' (id: {}) with {} items",
            req.name,
            result.last_insert_rowid(),
            req.items.len()
        );

        Ok(SavedShop {
            id: result.last_insert_rowid(),
            name: req.name.clone(),
            description: req.description.clone(),
            shop: GeneratedShop {
                items: req.items.clone(),
            },
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Most recent first
    pub async fn list_shops(&self) -> Result<Vec<SavedShopSummary>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT id, name, description, item_count, created_at, updated_at
             FROM shops ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| SavedShopSummary {
                id: r.get("id"),
                name: r.get("name"),
                description: r.get("description"),
                item_count: r.get::<i64, _>("item_count") as usize,
                created_at: r.get("created_at"),
                updated_at: r.get("updated_at"),
            })
            .collect())
    }

    pub async fn get_shop(&self, id: i64) -> Result<Option<SavedShop>, DbError> {
        let row = sqlx::query(
            "SELECT id, name, description, items_json, created_at, updated_at FROM shops WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(shop_from_row).transpose()
    }

    /// Replace a shop's name, description and item snapshot.
    /// The catalog is not touched.
    pub async fn update_shop(&self, id: i64, req: &SaveShopRequest) -> Result<Option<SavedShop>, DbError> {
        let items_json = encode_snapshot(&req.items)?;

        let result = sqlx::query(
            r#"UPDATE shops SET
                name = ?, description = ?, items_json = ?, item_count = ?, updated_at = ?
            WHERE id = ?"#,
        )
        .bind(&req.name)
        .bind(&req.description)
        .bind(&items_json)
        .bind(req.items.len() as i64)
        .bind(now_timestamp())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_shop(id).await
    }

    pub async fn delete_shop(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM shops WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ========================================================================
    // Presets
    // ========================================================================

    pub async fn create_preset(&self, preset: &NewPreset, is_default: bool) -> Result<Preset, DbError> {
        let now = now_timestamp();
        let id = insert_preset(&self.pool, preset, is_default, &now).await?;

        Ok(Preset {
            id,
            name: preset.name.clone(),
            description: preset.description.clone(),
            wealth_level: preset.wealth_level.clone(),
            shop_type: preset.shop_type.clone(),
            items_per_rarity: preset.items_per_rarity.clone(),
            type_chances: preset.type_chances.clone(),
            is_default,
            created_at: now,
        })
    }

    /// Defaults first, then by name
    pub async fn list_presets(&self) -> Result<Vec<Preset>, DbError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM presets ORDER BY is_default DESC, name, id",
            PRESET_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(preset_from_row).collect()
    }

    pub async fn get_preset(&self, id: i64) -> Result<Option<Preset>, DbError> {
        let row = sqlx::query(&format!("SELECT {} FROM presets WHERE id = ?", PRESET_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(preset_from_row).transpose()
    }

    /// Default presets can be edited like any other
    pub async fn update_preset(&self, id: i64, preset: &NewPreset) -> Result<Option<Preset>, DbError> {
        let rarity_json = serde_json::to_string(&preset.items_per_rarity)?;
        let types_json = serde_json::to_string(&preset.type_chances)?;

        let result = sqlx::query(
            r#"UPDATE presets SET
                name = ?, description = ?, wealth_level = ?, shop_type = ?,
                items_per_rarity_json = ?, type_chances_json = ?
            WHERE id = ?"#,
        )
        .bind(&preset.name)
        .bind(&preset.description)
        .bind(&preset.wealth_level)
        .bind(&preset.shop_type)
        .bind(&rarity_json)
        .bind(&types_json)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_preset(id).await
    }

    pub async fn delete_preset(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM presets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert the shipped default presets the first time only.
    /// Deleting defaults later does not bring them back.
    pub async fn seed_default_presets(&self, presets: &[NewPreset]) -> Result<usize, DbError> {
        if presets.is_empty() {
            return Ok(0);
        }

        let seeded = sqlx::query("SELECT name FROM seed_state WHERE name = ?")
            .bind(DEFAULT_PRESETS_SEED)
            .fetch_optional(&self.pool)
            .await?;
        if seeded.is_some() {
            return Ok(0);
        }

        let now = now_timestamp();
        let mut tx = self.pool.begin().await?;
        for preset in presets {
            insert_preset(&mut *tx, preset, true, &now).await?;
        }
        sqlx::query("INSERT INTO seed_state (name, seeded_at) VALUES (?, ?)")
            .bind(DEFAULT_PRESETS_SEED)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!("Seeded {} default presets", presets.len());
        Ok(presets.len())
    }
}

impl ItemCatalog for Database {
    async fn find_by_rarity(&self, rarity: &str) -> Result<Vec<CatalogItem>, CatalogError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM items WHERE rarity = ? ORDER BY id",
            ITEM_COLUMNS
        ))
        .bind(rarity)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                CatalogError::Unavailable(e.to_string())
            }
            other => CatalogError::Query(other),
        })?;

        Ok(rows.iter().map(item_from_row).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shop::{RarityCounts, TypeWeights};
    use tempfile::TempDir;

    async fn test_db(dir: &TempDir) -> Database {
        let url = format!("sqlite:{}?mode=rwc", dir.path().join("test.db").display());
        Database::new(&url, 1).await.unwrap()
    }

    fn new_item(name: &str, item_type: &str, rarity: &str) -> NewItem {
        NewItem {
            name: name.to_string(),
            item_type: item_type.to_string(),
            subtype: None,
            rarity: rarity.to_string(),
            value: Some(50.0),
            weight: Some(1.0),
            characteristics: None,
            additional_info: None,
            source: "Test".to_string(),
        }
    }

    fn new_preset(name: &str) -> NewPreset {
        let mut items_per_rarity = RarityCounts::new();
        items_per_rarity.insert("3 - Rare".to_string(), 1);
        items_per_rarity.insert("1 - Commun".to_string(), 5);
        let mut type_chances = TypeWeights::new();
        type_chances.insert("Potion".to_string(), 70);
        type_chances.insert("Arme".to_string(), 30);

        NewPreset {
            name: name.to_string(),
            description: Some("Test".to_string()),
            wealth_level: Some("Aisé".to_string()),
            shop_type: Some("Alchimiste".to_string()),
            items_per_rarity,
            type_chances,
        }
    }

    #[tokio::test]
    async fn test_item_crud() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;

        let sword = db.create_item(&new_item("Épée", "Arme", "1 - Commun")).await.unwrap();
        db.create_item(&new_item("Cotte de mailles", "Armure", "1 - Commun")).await.unwrap();
        db.create_item(&new_item("Bâton de feu", "Arme", "3 - Rare")).await.unwrap();

        assert_eq!(db.get_item(sword.id).await.unwrap(), Some(sword.clone()));
        assert_eq!(db.list_items(None, None).await.unwrap().len(), 3);
        assert_eq!(db.list_items(Some("1 - Commun"), None).await.unwrap().len(), 2);
        assert_eq!(db.list_items(Some("1 - Commun"), Some("Arme")).await.unwrap().len(), 1);
        assert_eq!(db.list_item_types().await.unwrap(), ["Arme", "Armure"]);

        let mut edit = new_item("Épée longue", "Arme", "1 - Commun");
        edit.value = Some(15.0);
        let updated = db.update_item(sword.id, &edit).await.unwrap().unwrap();
        assert_eq!(updated.name, "Épée longue");
        assert_eq!(db.get_item(sword.id).await.unwrap().unwrap().value, Some(15.0));
        assert!(db.update_item(9999, &edit).await.unwrap().is_none());

        assert!(db.delete_item(sword.id).await.unwrap());
        assert!(!db.delete_item(sword.id).await.unwrap());
        assert_eq!(db.count_items().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_find_by_rarity_is_exact() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;

        db.create_item(&new_item("A", "Arme", "1 - Commun")).await.unwrap();
        db.create_item(&new_item("B", "Arme", "2 - Peu commun")).await.unwrap();

        let common = db.find_by_rarity("1 - Commun").await.unwrap();
        assert_eq!(common.len(), 1);
        assert_eq!(common[0].name, "A");
        assert!(db.find_by_rarity("commun").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_seed_items_only_when_empty() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;

        let seed = vec![new_item("A", "Arme", "1 - Commun"), new_item("B", "Potion", "1 - Commun")];
        assert_eq!(db.seed_items_if_empty(&seed).await.unwrap(), 2);
        assert_eq!(db.seed_items_if_empty(&seed).await.unwrap(), 0);
        assert_eq!(db.count_items().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_saved_shop_is_a_snapshot() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;

        let potion = db.create_item(&new_item("Potion de soins", "Potion", "1 - Commun")).await.unwrap();
        let shop = db
            .save_shop(&SaveShopRequest {
                name: "Marché de Padhiver".to_string(),
                description: None,
                items: vec![potion.clone(), potion.clone()],
            })
            .await
            .unwrap();

        // Editing the catalog afterwards leaves the shop alone
        let mut pricier = new_item("Potion de soins", "Potion", "1 - Commun");
        pricier.value = Some(500.0);
        db.update_item(potion.id, &pricier).await.unwrap();

        let loaded = db.get_shop(shop.id).await.unwrap().unwrap();
        assert_eq!(loaded.shop.items.len(), 2);
        assert_eq!(loaded.shop.items[0].value, Some(50.0));

        // And editing the shop leaves the catalog alone
        let mut discounted = loaded.shop.items.clone();
        discounted[0].value = Some(10.0);
        let updated = db
            .update_shop(
                shop.id,
                &SaveShopRequest {
                    name: "Marché de Padhiver".to_string(),
                    description: Some("Jour de foire".to_string()),
                    items: discounted,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.shop.items[0].value, Some(10.0));
        assert_eq!(db.get_item(potion.id).await.unwrap().unwrap().value, Some(500.0));

        let summaries = db.list_shops().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].item_count, 2);

        assert!(db.delete_shop(shop.id).await.unwrap());
        assert!(db.get_shop(shop.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_preset_crud_keeps_map_order() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;

        let created = db.create_preset(&new_preset("Alchimiste"), false).await.unwrap();
        let loaded = db.get_preset(created.id).await.unwrap().unwrap();
        assert_eq!(loaded, created);

        let tiers: Vec<&str> = loaded.items_per_rarity.keys().map(String::as_str).collect();
        assert_eq!(tiers, ["3 - Rare", "1 - Commun"]);

        let mut edit = new_preset("Grand alchimiste");
        edit.items_per_rarity.insert("4 - Très rare".to_string(), 1);
        let updated = db.update_preset(created.id, &edit).await.unwrap().unwrap();
        assert_eq!(updated.name, "Grand alchimiste");
        assert_eq!(updated.items_per_rarity.len(), 3);

        assert!(db.delete_preset(created.id).await.unwrap());
        assert!(db.get_preset(created.id).await.unwrap().is_none());
        assert!(db.update_preset(created.id, &edit).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_default_presets_seeded_once() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir).await;

        let defaults = vec![new_preset("Forge"), new_preset("Bazar")];
        assert_eq!(db.seed_default_presets(&defaults).await.unwrap(), 2);

        let presets = db.list_presets().await.unwrap();
        assert_eq!(presets.len(), 2);
        assert!(presets.iter().all(|p| p.is_default));

        // Defaults are not protected
        assert!(db.delete_preset(presets[0].id).await.unwrap());

        // A restart does not re-insert them
        assert_eq!(db.seed_default_presets(&defaults).await.unwrap(), 0);
        assert_eq!(db.list_presets().await.unwrap().len(), 1);
    }
}
