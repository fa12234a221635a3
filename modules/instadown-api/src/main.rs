use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use instadown_archive::{
    Archive, MediaProvider, MemoryRecordStore, PgRecordStore, RecordStore, ZonedClock,
};
use instagram_client::InstagramClient;

mod config;
mod rest;

use config::Config;
use rest::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("instadown=info".parse()?)
                .add_directive("instagram_client=info".parse()?)
                .add_directive("api=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn RecordStore> = match &config.database_url {
        Some(url) => {
            let pool = sqlx::PgPool::connect(url)
                .await
                .context("Failed to connect to Postgres")?;
            let store = PgRecordStore::new(pool).with_ttl(config.record_ttl);
            store.migrate().await?;
            let purged = store.purge_expired().await?;
            info!(purged, "Record store ready");
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL not set, crawl records are kept in memory only");
            Arc::new(MemoryRecordStore::new())
        }
    };

    let mut client = InstagramClient::new().with_page_size(config.instagram_page_size);
    if let Some(base_url) = &config.instagram_base_url {
        client = client.with_base_url(base_url.as_str());
    }
    if let Some(user_agent) = &config.instagram_user_agent {
        client = client.with_user_agent(user_agent.as_str());
    }
    let provider: Arc<dyn MediaProvider> = Arc::new(client);

    let clock = Arc::new(ZonedClock::from_name(&config.record_timezone)?);
    let state = Arc::new(AppState {
        archive: Archive::new(provider, store, clock),
    });

    let app = rest::router(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Logging layer: method + path + status + latency
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        );

    let addr = format!("{}:{}", config.api_host, config.api_port);
    info!("instadown API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
