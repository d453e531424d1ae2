use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use crate::chat::{render_page, run_chatbot, LOGO_SVG};
use crate::core::errors::ApiError;
use crate::state::AppState;

const EMPTY_TRANSCRIPT: &str = "[]";

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    pub user_input: Option<String>,
    pub chat_history: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatPayload {
    #[serde(default)]
    pub chat_history: Option<String>,
    #[serde(default)]
    pub user_input: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub chat_history: String,
}

pub async fn index() -> Result<Html<String>, ApiError> {
    Ok(Html(render_page(EMPTY_TRANSCRIPT)?))
}

pub async fn submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ChatForm>,
) -> Result<Html<String>, ApiError> {
    let history = form.chat_history.as_deref().unwrap_or(EMPTY_TRANSCRIPT);
    let updated = run_chatbot(state.chat.as_ref(), history, form.user_input.as_deref()).await?;
    Ok(Html(render_page(&updated)?))
}

pub async fn api_chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatPayload>,
) -> Result<Json<ChatReply>, ApiError> {
    let history = payload.chat_history.as_deref().unwrap_or(EMPTY_TRANSCRIPT);
    let chat_history =
        run_chatbot(state.chat.as_ref(), history, payload.user_input.as_deref()).await?;
    Ok(Json(ChatReply { chat_history }))
}

pub async fn logo() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/svg+xml")], LOGO_SVG)
}
