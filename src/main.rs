//! Storefront - a lightweight server-rendered catalog storefront

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront::{
    config::Config,
    db::{
        self,
        repositories::{SqlxCategoryRepository, SqlxItemRepository, SqlxUserRepository},
    },
    services::{CatalogService, CategoryService, SessionManager, UserService},
    storage::HttpAssetStore,
    templates::TemplateEngine,
    web::{self, AppState},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting storefront...");

    // Load configuration (PORT and friends override the file)
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database ready: {}", config.database.url);

    // Load templates
    let templates = TemplateEngine::new(&config.templates.path)?;
    tracing::info!("Templates loaded from {:?}", config.templates.path);

    // Create repositories and services
    let item_repo = SqlxItemRepository::shared(pool.clone());
    let category_repo = SqlxCategoryRepository::shared(pool.clone());
    let user_repo = SqlxUserRepository::shared(pool.clone());

    let state = AppState {
        catalog_service: Arc::new(CatalogService::new(item_repo)),
        category_service: Arc::new(CategoryService::new(category_repo)),
        user_service: Arc::new(UserService::new(user_repo)),
        session_manager: Arc::new(SessionManager::new(&config.session)),
        asset_store: HttpAssetStore::shared(config.assets.ingest_url.clone()),
        templates: Arc::new(templates),
    };

    // Build router
    let app = web::build_router(state, &config.assets.public_dir);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
