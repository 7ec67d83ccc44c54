mod configuration;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use configuration::Settings;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::new()?;
    let addr = settings.server.socket_addr()?;

    if !settings.engine.transcript.exists() {
        tracing::warn!(
            "Transcript {} does not exist yet, /infer will fail until it does",
            settings.engine.transcript.display()
        );
    }

    let engine = settings.engine.into_engine();
    let state = state::AppState::new(Arc::new(engine));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
