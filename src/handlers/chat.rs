use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Caller;
use crate::services::conversation;
use crate::services::language::detect_language;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub lang: String,
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let message = req.message.trim().to_string();
    if message.is_empty() {
        return Err(AppError::BadRequest("message must not be empty".to_string()));
    }

    let caller = resolve_caller(&state, &headers);
    let lang = detect_language(&message);
    let reply = conversation::respond(&state, &message, &caller).await;

    Ok(Json(ChatResponse { reply, lang }))
}

/// Maps the bearer session token to a user. An absent or unknown token is an
/// anonymous caller, not an error: anonymous users may still ask questions.
fn resolve_caller(state: &Arc<AppState>, headers: &HeaderMap) -> Caller {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");

    if token.is_empty() {
        return Caller::Anonymous;
    }

    let db = state.db.lock().unwrap();
    match queries::get_user_by_token(&db, token) {
        Ok(Some(user)) => Caller::Authenticated {
            id: user.id,
            display_name: user.display_name,
        },
        Ok(None) => Caller::Anonymous,
        Err(e) => {
            tracing::error!(error = %e, "failed to resolve session token");
            Caller::Anonymous
        }
    }
}
