//! Emporium API - JSON REST backend binary.
//!
//! Serves the catalog, cart, order, image, and auth routes over a
//! `PostgreSQL` store. Configuration comes from the environment (see
//! [`emporium_api::config`]).

#![cfg_attr(not(test), forbid(unsafe_code))]

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use emporium_api::{ApiConfig, AppState, Stores, router, store::postgres};

#[tokio::main]
async fn main() {
    // Initialize tracing with EnvFilter; default to info for our crates
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "emporium_api=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env().expect("failed to load configuration");

    let pool = postgres::create_pool(&config.database_url)
        .await
        .expect("failed to connect to database");
    tracing::info!("connected to database");

    let addr = config.bind_addr();
    let state = AppState::new(config.clone(), Stores::postgres(&pool, &config));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");
    tracing::info!(%addr, "emporium api listening");

    axum::serve(listener, app).await.expect("server error");
}
