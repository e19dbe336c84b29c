use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use rust_assets::config::Config;
use rust_assets::db::{create_pool, run_migrations, PgAssetItemStore};
use rust_assets::maintenance::PgMaintenanceDesk;
use rust_assets::proto::health::health_server::HealthServer;
use rust_assets::proto::items::asset_items_server::AssetItemsServer;
use rust_assets::services::{AssetItemsService, AssetItemsServiceImpl, HealthServiceImpl};

use tonic::transport::Server;
use tonic_reflection::server::Builder as ReflectionBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Include file descriptor for gRPC reflection
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("assets_descriptor");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_assets=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().context("DATABASE_URL must be set")?;

    tracing::info!("Starting rust-assets gRPC server...");
    tracing::info!("Connecting to database...");

    let pool = create_pool(&config.database_url)
        .await
        .context("failed to connect to database")?;
    tracing::info!("Database connection established");

    if config.run_migrations {
        run_migrations(&pool)
            .await
            .context("failed to apply migrations")?;
        tracing::info!("Migrations applied");
    }

    let mut service = AssetItemsService::new(Arc::new(PgAssetItemStore::new(pool.clone())))
        .with_settings(config.workflow_settings());

    if config.maintenance_enabled {
        match PgMaintenanceDesk::probe(pool.clone()).await {
            Ok(desk) => service = service.with_maintenance_desk(Arc::new(desk)),
            Err(e) => tracing::error!("Failed to probe maintenance desk: {}", e),
        }
    } else {
        tracing::info!("Maintenance requests disabled by configuration");
    }

    let items_service = AssetItemsServiceImpl::new(service);
    let health_service = HealthServiceImpl::new(Some(pool.clone()));

    // CORS layer for gRPC-Web
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any)
        .expose_headers(Any);

    // Build reflection service
    let reflection_service = ReflectionBuilder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid listen address {}", config.server_addr()))?;
    tracing::info!("Listening on {}", addr);

    // gRPC-Web needs HTTP/1 accepted alongside HTTP/2
    Server::builder()
        .accept_http1(true)
        .layer(cors)
        .layer(tonic_web::GrpcWebLayer::new())
        .add_service(reflection_service)
        .add_service(AssetItemsServer::new(items_service))
        .add_service(HealthServer::new(health_service))
        .serve(addr)
        .await?;

    Ok(())
}
