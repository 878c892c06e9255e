pub mod item;
pub mod rarity;
pub mod seed;

use std::future::Future;

pub use item::{CatalogItem, NewItem};
pub use rarity::RarityTier;
pub use seed::ItemSeed;

/// Failure to read from the item catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog query failed: {0}")]
    Query(#[from] sqlx::Error),
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Read access to the item catalog, as needed by shop generation
pub trait ItemCatalog {
    /// All items whose rarity label equals `rarity` exactly
    fn find_by_rarity(
        &self,
        rarity: &str,
    ) -> impl Future<Output = Result<Vec<CatalogItem>, CatalogError>> + Send;
}

/// In-memory catalog over a fixed item list
impl ItemCatalog for Vec<CatalogItem> {
    async fn find_by_rarity(&self, rarity: &str) -> Result<Vec<CatalogItem>, CatalogError> {
        Ok(self.iter().filter(|item| item.rarity == rarity).cloned().collect())
    }
}
