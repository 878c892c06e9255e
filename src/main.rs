use axum::{
    Json, Router,
    extract::{ConnectInfo, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info, warn};

mod catalog;
mod config;
mod db;
mod error;
mod guard;
mod preset;
mod shop;

use catalog::{CatalogItem, ItemSeed, NewItem, RarityTier};
use config::ServerConfig;
use db::Database;
use error::{ApiJson, AppError};
use guard::OperationGuard;
use preset::{NewPreset, Preset, PresetRegistry};
use shop::{
    GeneratedShop, RarityCounts, SaveShopRequest, SavedShop, SavedShopSummary, ShopConfig,
    TypeWeights, ValidationReport,
};

// ============================================================================
// App State
// ============================================================================

#[derive(Clone)]
struct AppState {
    db: Arc<Database>,
    // Client IP -> preset creation in progress
    preset_guard: OperationGuard,
}

impl AppState {
    async fn new(config: &ServerConfig) -> Result<Self, String> {
        let db = Database::new(&config.database_url, config.max_connections)
            .await
            .map_err(|e| format!("Failed to initialize database: {}", e))?;

        // Seed catalog items from TOML files
        let mut item_seed = ItemSeed::new();
        if let Err(e) = item_seed.load_from_directory(&config.data_dir) {
            error!("Failed to load seed items: {}", e);
        }
        if item_seed.is_empty() {
            warn!("No seed items under {:?}, catalog starts empty", config.data_dir);
        } else {
            match db.seed_items_if_empty(item_seed.items()).await {
                Ok(0) => debug!("Catalog already populated, ignoring {} seed items", item_seed.len()),
                Ok(n) => info!("Catalog was empty, inserted {} seed items", n),
                Err(e) => error!("Failed to seed catalog: {}", e),
            }
        }

        // Default presets are written once per database
        let mut preset_registry = PresetRegistry::new();
        if let Err(e) = preset_registry.load_from_directory(&config.data_dir) {
            error!("Failed to load default presets: {}", e);
        }
        if preset_registry.is_empty() {
            warn!("No default presets under {:?}", config.data_dir);
        } else {
            match db.seed_default_presets(preset_registry.all()).await {
                Ok(0) => debug!("Default presets already seeded, ignoring {}", preset_registry.len()),
                Ok(_) => {}
                Err(e) => error!("Failed to seed default presets: {}", e),
            }
        }

        Ok(Self::from_parts(
            db,
            OperationGuard::new(config.preset_guard_timeout()),
        ))
    }

    fn from_parts(db: Database, preset_guard: OperationGuard) -> Self {
        Self {
            db: Arc::new(db),
            preset_guard,
        }
    }
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================================
// HTTP Handlers - Catalog
// ============================================================================

#[derive(Deserialize)]
struct ItemFilter {
    rarity: Option<String>,
    #[serde(rename = "type")]
    item_type: Option<String>,
}

/// GET /api/rarities - Canonical rarity labels, lowest first
async fn list_rarities() -> impl IntoResponse {
    let labels: Vec<&str> = RarityTier::ALL.iter().map(|t| t.label()).collect();
    Json(labels)
}

/// GET /api/items - List catalog items
async fn list_items(
    State(state): State<AppState>,
    Query(filter): Query<ItemFilter>,
) -> Result<Json<Vec<CatalogItem>>, AppError> {
    let items = state
        .db
        .list_items(filter.rarity.as_deref(), filter.item_type.as_deref())
        .await?;
    Ok(Json(items))
}

/// GET /api/items/types - Distinct item types
async fn list_item_types(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.db.list_item_types().await?))
}

/// POST /api/items - Add an item to the catalog
async fn create_item(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewItem>,
) -> Result<impl IntoResponse, AppError> {
    req.check().map_err(AppError::BadRequest)?;

    let item = state.db.create_item(&req).await?;
    info!("Created item '{}' (id: {})", item.name, item.id);
    Ok((StatusCode::CREATED, Json(item)))
}

async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> Result<Json<CatalogItem>, AppError> {
    state
        .db
        .get_item(item_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))
}

async fn update_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
    ApiJson(req): ApiJson<NewItem>,
) -> Result<Json<CatalogItem>, AppError> {
    req.check().map_err(AppError::BadRequest)?;

    state
        .db
        .update_item(item_id, &req)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))
}

async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !state.db.delete_item(item_id).await? {
        return Err(AppError::NotFound("Item not found".to_string()));
    }
    info!("Deleted item {}", item_id);
    Ok(Json(serde_json::json!({ "success": true })))
}

// ============================================================================
// HTTP Handlers - Shop generation
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NormalizeRequest {
    #[serde(default)]
    type_chances: TypeWeights,
}

#[derive(Deserialize)]
struct RandomizeTypesRequest {
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Deserialize)]
struct RandomizeRaritiesRequest {
    #[serde(default)]
    rarities: Vec<String>,
    #[serde(default)]
    existing: RarityCounts,
}

/// POST /api/shops/generate - Draw a shop from the catalog.
/// Does not validate the config; see /api/shops/validate.
async fn generate_shop(
    State(state): State<AppState>,
    ApiJson(config): ApiJson<ShopConfig>,
) -> Result<Json<GeneratedShop>, AppError> {
    let mut rng = StdRng::from_entropy();
    let shop = shop::generate_shop(state.db.as_ref(), &config, &mut rng).await?;

    debug!(
        "Generated shop with {} of {} requested items",
        shop.items.len(),
        config.requested_items()
    );
    Ok(Json(shop))
}

/// POST /api/shops/normalize - Rescale type chances to total 100
async fn normalize_type_chances(ApiJson(req): ApiJson<NormalizeRequest>) -> Json<TypeWeights> {
    Json(shop::normalize_percentages(&req.type_chances))
}

/// POST /api/shops/validate
async fn validate_shop_config(ApiJson(config): ApiJson<ShopConfig>) -> Json<ValidationReport> {
    Json(shop::validate_config(&config))
}

/// POST /api/shops/randomize/types
async fn randomize_types(ApiJson(req): ApiJson<RandomizeTypesRequest>) -> Json<TypeWeights> {
    let mut rng = rand::thread_rng();
    Json(shop::randomize_type_chances(&req.types, &mut rng))
}

/// POST /api/shops/randomize/rarities
async fn randomize_rarities(ApiJson(req): ApiJson<RandomizeRaritiesRequest>) -> Json<RarityCounts> {
    let mut rng = rand::thread_rng();
    Json(shop::randomize_rarities(&req.rarities, &req.existing, &mut rng))
}

// ============================================================================
// HTTP Handlers - Saved shops
// ============================================================================

async fn list_shops(State(state): State<AppState>) -> Result<Json<Vec<SavedShopSummary>>, AppError> {
    Ok(Json(state.db.list_shops().await?))
}

/// POST /api/shops - Save a generated shop as a snapshot
async fn save_shop(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SaveShopRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.check().map_err(AppError::BadRequest)?;
    let shop = state.db.save_shop(&req).await?;
    Ok((StatusCode::CREATED, Json(shop)))
}

async fn get_shop(
    State(state): State<AppState>,
    Path(shop_id): Path<i64>,
) -> Result<Json<SavedShop>, AppError> {
    state
        .db
        .get_shop(shop_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Shop not found".to_string()))
}

/// PUT /api/shops/:id - Edit a saved shop without touching the catalog
async fn update_shop(
    State(state): State<AppState>,
    Path(shop_id): Path<i64>,
    ApiJson(req): ApiJson<SaveShopRequest>,
) -> Result<Json<SavedShop>, AppError> {
    req.check().map_err(AppError::BadRequest)?;

    state
        .db
        .update_shop(shop_id, &req)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Shop not found".to_string()))
}

async fn delete_shop(
    State(state): State<AppState>,
    Path(shop_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !state.db.delete_shop(shop_id).await? {
        return Err(AppError::NotFound("Shop not found".to_string()));
    }
    info!("Deleted shop {}", shop_id);
    Ok(Json(serde_json::json!({ "success": true })))
}

// ============================================================================
// HTTP Handlers - Presets
// ============================================================================

#[derive(Serialize)]
struct PresetListResponse {
    presets: Vec<Preset>,
}

async fn list_presets(State(state): State<AppState>) -> Result<Json<PresetListResponse>, AppError> {
    Ok(Json(PresetListResponse {
        presets: state.db.list_presets().await?,
    }))
}

/// POST /api/presets - Create a preset, one at a time per client
async fn create_preset(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    ApiJson(req): ApiJson<NewPreset>,
) -> Result<impl IntoResponse, AppError> {
    let client_ip = addr.ip().to_string();

    let _ticket = match state.preset_guard.try_begin(&client_ip) {
        Some(ticket) => ticket,
        None => {
            warn!("Preset creation already in progress for {}", client_ip);
            return Err(AppError::Busy(
                "A preset is already being created. Please wait.".to_string(),
            ));
        }
    };

    req.check().map_err(AppError::BadRequest)?;

    let preset = state.db.create_preset(&req, false).await?;
    info!("Created preset '{}' (id: {}) from {}", preset.name, preset.id, client_ip);
    warn_if_invalid(&preset);
    Ok((StatusCode::CREATED, Json(preset)))
}

async fn get_preset(
    State(state): State<AppState>,
    Path(preset_id): Path<i64>,
) -> Result<Json<Preset>, AppError> {
    state
        .db
        .get_preset(preset_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Preset not found".to_string()))
}

async fn update_preset(
    State(state): State<AppState>,
    Path(preset_id): Path<i64>,
    ApiJson(req): ApiJson<NewPreset>,
) -> Result<Json<Preset>, AppError> {
    req.check().map_err(AppError::BadRequest)?;

    let preset = state
        .db
        .update_preset(preset_id, &req)
        .await?
        .ok_or_else(|| AppError::NotFound("Preset not found".to_string()))?;
    warn_if_invalid(&preset);
    Ok(Json(preset))
}

/// Presets are stored even when their config would not validate
fn warn_if_invalid(preset: &Preset) {
    let report = shop::validate_config(&preset.config());
    if !report.is_valid {
        warn!(
            "Preset '{}' (id: {}) has an invalid config: {}",
            preset.name,
            preset.id,
            report.errors.join("; ")
        );
    }
}

async fn delete_preset(
    State(state): State<AppState>,
    Path(preset_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !state.db.delete_preset(preset_id).await? {
        return Err(AppError::NotFound("Preset not found".to_string()));
    }
    info!("Deleted preset {}", preset_id);
    Ok(Json(serde_json::json!({ "success": true })))
}

// ============================================================================
// Router
// ============================================================================

fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Catalog
        .route("/api/rarities", get(list_rarities))
        .route("/api/items", get(list_items).post(create_item))
        .route("/api/items/types", get(list_item_types))
        .route(
            "/api/items/:id",
            get(get_item).put(update_item).delete(delete_item),
        )
        // Generation
        .route("/api/shops/generate", post(generate_shop))
        .route("/api/shops/normalize", post(normalize_type_chances))
        .route("/api/shops/validate", post(validate_shop_config))
        .route("/api/shops/randomize/types", post(randomize_types))
        .route("/api/shops/randomize/rarities", post(randomize_rarities))
        // Saved shops
        .route("/api/shops", get(list_shops).post(save_shop))
        .route(
            "/api/shops/:id",
            get(get_shop).put(update_shop).delete(delete_shop),
        )
        // Presets
        .route("/api/presets", get(list_presets).post(create_preset))
        .route(
            "/api/presets/:id",
            get(get_preset).put(update_preset).delete(delete_preset),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::DELETE,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([axum::http::header::CONTENT_TYPE]),
        )
        .with_state(state)
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ttrpg_shop_server=info".parse().expect("static directive")),
        )
        .init();

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let state = match AppState::new(&config).await {
        Ok(state) => state,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    // Spawn sweep loop for abandoned preset-creation entries
    let guard = state.preset_guard.clone();
    let sweep_interval = config.guard_sweep_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        loop {
            interval.tick().await;
            if guard.is_empty() {
                continue;
            }
            let removed = guard.sweep();
            if removed > 0 {
                debug!(
                    "Swept {} stale in-progress entries, {} still running",
                    removed,
                    guard.len()
                );
            }
        }
    });

    let app = build_router(state);

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", config.bind_addr, e);
            std::process::exit(1);
        }
    };
    info!("Shop server listening on http://{}", config.bind_addr);

    if let Err(e) = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await {
        error!("Server error: {}", e);
    }
}
