use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::chat::LOGO_PATH;
use crate::server::handlers::{chat, health};
use crate::state::AppState;

/// Routes:
/// - `GET /` and `POST /`: the server-rendered chat page
/// - `POST /api/chat`: the same turn over JSON
/// - `GET /health`
/// - the assistant logo
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = build_cors_layer(&state.server.cors_allowed_origins);
    Router::new()
        .route("/", get(chat::index).post(chat::submit))
        .route("/api/chat", post(chat::api_chat))
        .route("/health", get(health::health))
        .route(LOGO_PATH, get(chat::logo))
        .with_state(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer(configured: &[String]) -> CorsLayer {
    let origins = if configured.is_empty() {
        default_local_origins()
    } else {
        configured.to_vec()
    };

    let allow_origin = AllowOrigin::list(
        origins
            .iter()
            .filter_map(|origin| HeaderValue::from_str(origin).ok())
            .collect::<Vec<_>>(),
    );

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
}

fn default_local_origins() -> Vec<String> {
    vec![
        "http://localhost".to_string(),
        "http://localhost:8888".to_string(),
        "http://127.0.0.1".to_string(),
        "http://127.0.0.1:8888".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use tokio::net::TcpListener;

    use super::*;
    use crate::chat::testing::CountingGenerator;
    use crate::server::testing::state_with;

    async fn serve(state: Arc<AppState>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn form_post_round_trips_through_the_router() {
        let tmp = tempfile::tempdir().unwrap();
        let generator = Arc::new(CountingGenerator::new(&["Stay home when sick."]));
        let base = serve(state_with(tmp.path(), generator.clone()).await).await;

        let client = reqwest::Client::new();
        let page = client
            .post(format!("{}/", base))
            .form(&[("user_input", "Advice?"), ("chat_history", "[]")])
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();

        assert!(page.contains("Stay home when sick."));
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn logo_is_served_as_svg() {
        let tmp = tempfile::tempdir().unwrap();
        let base = serve(state_with(tmp.path(), Arc::new(CountingGenerator::new(&[]))).await).await;

        let response = reqwest::get(format!("{}{}", base, LOGO_PATH)).await.unwrap();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE.as_str()],
            "image/svg+xml"
        );
    }
}
