use std::net::SocketAddr;

use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use hydrobill::config::AppConfig;
use hydrobill::{routes, AppState};
use mimalloc::MiMalloc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hydrobill=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = AppConfig::from_env().expect("Failed to load configuration");

    let pool =
        hydrobill::db::create_pool(&config.database_url, config.database_max_connections).await?;

    let addr = SocketAddr::new(config.host.parse()?, config.port);
    tracing::info!(host = %addr, "Starting Hydrobill API server");

    let state = AppState {
        db: pool,
        config: config.clone(),
    };

    let cors = match config.frontend_url.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let usage_routes = Router::new()
        .route("/", get(routes::usage::list))
        .route("/summary", get(routes::usage::summary))
        .route("/top-customers", get(routes::usage::top_customers));

    let app = Router::new()
        .route("/health/live", get(routes::health::live))
        .route("/health/ready", get(routes::health::ready))
        .nest("/api/usage", usage_routes)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
