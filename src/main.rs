//! EcoShop - storefront server

use std::sync::Arc;
use anyhow::Result;
use ecoshop::api::{self, AppState};
use ecoshop::config::Config;
use ecoshop::{Catalog, Persistence, SqliteStore, Storefront};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let config = Config::from_env()?;
    let catalog = Arc::new(Catalog::ecoshop()?);
    tracing::info!(products = catalog.len(), "catalog loaded");

    let persistence = match SqliteStore::connect(&config.database_url).await {
        Ok(store) => Persistence::new(store),
        Err(e) => {
            tracing::warn!(error = %e, url = %config.database_url, "session store unavailable, state will not survive a restart");
            Persistence::in_memory()
        }
    };

    let shop = Storefront::open(catalog, persistence).await;
    let mut events = shop.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => tracing::debug!(?event, "storefront changed"),
                Err(RecvError::Lagged(skipped)) => tracing::debug!(skipped, "render listener lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let app = api::router(AppState::new(shop, config.search_debounce));
    let addr = config.socket_addr();
    tracing::info!("🌱 EcoShop listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
