pub mod config;
pub mod generator;
pub mod normalize;
pub mod randomize;
pub mod saved;
pub mod validate;

pub use config::{RarityCounts, ShopConfig, TypeWeights};
pub use generator::{GenerateError, GeneratedShop, generate_shop};
pub use normalize::normalize_percentages;
pub use randomize::{randomize_rarities, randomize_type_chances};
pub use saved::{SaveShopRequest, SavedShop, SavedShopSummary};
pub use validate::{ValidationReport, validate_config};
