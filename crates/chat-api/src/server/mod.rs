//! Server setup and initialization
//!
//! Provides the main application builder and server runner.

use std::sync::Arc;

use axum::Router;
use chat_common::{AppConfig, AppError, StoreBackend};
use chat_core::SnowflakeGenerator;
use chat_db::{
    create_pool, run_migrations, MemoryStore, PgContainerRepository, PgMessageRepository,
    PgProfileRepository, PoolConfig,
};
use chat_gateway::{ConnectionRegistry, FanoutDispatcher, GatewayState};
use chat_service::{ServiceContext, ServiceContextBuilder};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::middleware::apply_middleware;
use crate::routes::create_router;
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let config = state.config();
    let router = apply_middleware(create_router(config), config);
    router.with_state(state)
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let registry = ConnectionRegistry::new_shared();
    let publisher = Arc::new(FanoutDispatcher::new(registry.clone()));
    let snowflake_generator = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));

    let builder = match config.database.backend {
        StoreBackend::Memory => {
            warn!("Using the in-memory store; data is lost on restart");
            ServiceContext::with_store(MemoryStore::new())
        }
        StoreBackend::Postgres => postgres_repositories(&config).await?,
    };

    let service_context = builder
        .publisher(publisher)
        .snowflake_generator(snowflake_generator)
        .message_config(config.messages.clone())
        .storage_config(config.storage.clone())
        .build()
        .map_err(AppError::internal)?;
    let service_context = Arc::new(service_context);

    let gateway = GatewayState::new(service_context.clone(), registry, config.gateway.clone());

    Ok(AppState::new(service_context, gateway, config))
}

async fn postgres_repositories(config: &AppConfig) -> Result<ServiceContextBuilder, AppError> {
    let url = config
        .database
        .url
        .clone()
        .ok_or_else(|| AppError::database("DATABASE_URL is not set"))?;

    info!("Connecting to PostgreSQL...");
    let pool_config = PoolConfig::new(url)
        .with_connections(config.database.min_connections, config.database.max_connections);
    let pool = create_pool(&pool_config).await.map_err(AppError::database)?;
    info!("PostgreSQL connection established");

    if config.database.run_migrations {
        run_migrations(&pool).await.map_err(AppError::database)?;
        info!("Migrations applied");
    }

    Ok(ServiceContextBuilder::new()
        .profile_repo(Arc::new(PgProfileRepository::new(pool.clone())))
        .container_repo(Arc::new(PgContainerRepository::new(pool.clone())))
        .message_repo(Arc::new(PgMessageRepository::new(pool))))
}

/// Serve the application on an already bound listener
pub async fn run_server(app: Router, listener: TcpListener) -> Result<(), AppError> {
    let addr = listener.local_addr()?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.server.address();

    let state = create_app_state(config).await?;
    let app = create_app(state);

    info!("Starting HTTP server on {}", addr);
    let listener = TcpListener::bind(&addr).await?;

    run_server(app, listener).await
}
