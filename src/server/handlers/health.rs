use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::rag::ingest::EMBEDDING_MODEL_META_KEY;
use crate::state::AppState;

/// Reports whether the chunk store can be read. A missing or unreadable store
/// is reported as `degraded` rather than failing the probe.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let count = state.store.count().await;
    let model = state
        .store
        .get_meta(EMBEDDING_MODEL_META_KEY)
        .await
        .ok()
        .flatten();

    match count {
        Ok(chunks) => Json(json!({
            "status": "ok",
            "chunks": chunks,
            "embedding_model": model,
        })),
        Err(err) => {
            tracing::warn!("Chunk store unavailable: {}", err);
            Json(json!({
                "status": "degraded",
                "chunks": null,
                "embedding_model": null,
                "error": err.to_string(),
            }))
        }
    }
}
