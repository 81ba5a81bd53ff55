//! Chat API Endpoints
//! Mission: Answer chat messages with canned replies and serve the conversation log

use crate::auth::models::Account;
use crate::chat::{
    history::ChatStore,
    responder::{respond, SourceRef, MAX_CONTEXT_DOCUMENTS},
};
use crate::documents::DocumentStore;
use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

#[derive(Clone)]
pub struct ChatState {
    pub chat_store: Arc<ChatStore>,
    pub document_store: Arc<DocumentStore>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
    pub sources: Vec<SourceRef>,
    pub message_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub message: String,
    pub is_user: bool,
    pub created_at: String,
    pub sources: Vec<SourceRef>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub chats: Vec<HistoryEntry>,
}

/// Chat endpoint - POST /api/chat
pub async fn post_chat(
    State(state): State<ChatState>,
    Extension(account): Extension<Account>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ChatApiError> {
    let message = request.message.trim().to_string();
    if message.is_empty() {
        return Err(ChatApiError::EmptyMessage);
    }
    let session_id = request
        .session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    debug!("💬 {} [{}]: {}", account.username, session_id, message);

    let session = session_id.clone();
    let outcome = tokio::task::spawn_blocking(move || -> Result<_> {
        let documents = state
            .document_store
            .recent_for_user(account.id, MAX_CONTEXT_DOCUMENTS)?;
        let reply = respond(&message, &documents);
        let message_id = state
            .chat_store
            .record_exchange(account.id, &session, &message, &reply)?;
        Ok((reply, message_id))
    })
    .await
    .map_err(|e| {
        error!("Chat task failed: {}", e);
        ChatApiError::InternalError
    })?;

    let (reply, message_id) = outcome.map_err(|e| {
        error!("Chat error: {:#}", e);
        ChatApiError::InternalError
    })?;

    Ok(Json(ChatResponse {
        response: reply.response,
        session_id,
        sources: reply.sources,
        message_id,
    }))
}

/// History endpoint - GET /api/chat/history?session_id=...
pub async fn get_chat_history(
    State(state): State<ChatState>,
    Extension(account): Extension<Account>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ChatApiError> {
    let messages = tokio::task::spawn_blocking(move || {
        state
            .chat_store
            .history(account.id, query.session_id.as_deref())
    })
    .await
    .map_err(|e| {
        error!("History task failed: {}", e);
        ChatApiError::InternalError
    })?
    .map_err(|e| {
        error!("Failed to load chat history: {:#}", e);
        ChatApiError::InternalError
    })?;

    let chats = messages
        .into_iter()
        .map(|m| HistoryEntry {
            id: m.id,
            message: m.message,
            is_user: m.is_user,
            created_at: m.created_at,
            sources: m.sources,
        })
        .collect();

    Ok(Json(HistoryResponse { chats }))
}

/// Chat API errors
#[derive(Debug)]
pub enum ChatApiError {
    EmptyMessage,
    InternalError,
}

impl IntoResponse for ChatApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ChatApiError::EmptyMessage => (StatusCode::BAD_REQUEST, "Message empty"),
            ChatApiError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "detail": message }))).into_response()
    }
}
