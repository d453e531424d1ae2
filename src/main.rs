use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use cord_chat::core::config::AppPaths;
use cord_chat::core::logging;
use cord_chat::server;
use cord_chat::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = Arc::new(AppPaths::new());
    logging::init(&paths, "server");

    let state = AppState::initialize(paths).await?;

    let bind_addr = state.server.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!(
        "Listening on {} (text model {}, embedding model {})",
        addr,
        state.models.text_model.id,
        state.models.embedding_model.id
    );

    let app: Router = server::router::router(state);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
