//! Document API Endpoints
//! Mission: Upload and list the caller's documents

use crate::auth::models::Account;
use crate::documents::{
    allowed_extension, extract_text, sanitize_filename,
    store::{DocumentStore, NewDocument},
    MAX_UPLOAD_BYTES,
};
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct DocumentState {
    pub store: Arc<DocumentStore>,
    pub upload_dir: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct UploadedDocument {
    pub id: i64,
    pub filename: String,
    pub chunks: i64,
    pub uploaded_at: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub document: UploadedDocument,
}

#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub id: i64,
    pub filename: String,
    pub file_type: String,
    pub file_size: i64,
    pub chunks: i64,
    pub processed: bool,
    pub uploaded_at: String,
}

#[derive(Debug, Serialize)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentSummary>,
}

/// Upload endpoint - POST /api/documents/upload (multipart field `file`)
pub async fn upload_document(
    State(state): State<DocumentState>,
    Extension(account): Extension<Account>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, DocumentApiError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let raw_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        upload = Some((raw_name, bytes));
        break;
    }

    let (raw_name, bytes) = upload.ok_or(DocumentApiError::NoFile)?;
    let original_filename = sanitize_filename(&raw_name).ok_or(DocumentApiError::NoFile)?;
    let file_type =
        allowed_extension(&original_filename).ok_or(DocumentApiError::FileTypeNotAllowed)?;
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(DocumentApiError::TooLarge);
    }

    let stored_name = format!("{}_{}_{}", account.id, Uuid::new_v4(), original_filename);
    let path = state.upload_dir.join(&stored_name);

    tokio::fs::create_dir_all(&state.upload_dir)
        .await
        .map_err(|e| {
            error!("Cannot create upload dir {}: {}", state.upload_dir.display(), e);
            DocumentApiError::InternalError
        })?;
    tokio::fs::write(&path, &bytes).await.map_err(|e| {
        error!("Cannot write upload {}: {}", path.display(), e);
        DocumentApiError::InternalError
    })?;

    let new_doc = NewDocument {
        user_id: account.id,
        content: extract_text(&bytes, &file_type, &stored_name),
        filename: stored_name,
        original_filename,
        file_type,
        file_size: bytes.len() as i64,
    };

    let store = state.store.clone();
    let inserted = tokio::task::spawn_blocking(move || store.insert(new_doc))
        .await
        .map_err(|e| {
            error!("Document insert task failed: {}", e);
            DocumentApiError::InternalError
        })?;

    let document = match inserted {
        Ok(document) => document,
        Err(e) => {
            error!("Failed to record upload: {:#}", e);
            // The row is the source of truth; don't leave an orphaned file behind.
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!("Could not remove orphaned upload {}: {}", path.display(), e);
            }
            return Err(DocumentApiError::InternalError);
        }
    };

    info!(
        "📤 {} uploaded {} ({} bytes)",
        account.username, document.original_filename, document.file_size
    );

    Ok(Json(UploadResponse {
        message: "Document uploaded",
        document: UploadedDocument {
            id: document.id,
            filename: document.original_filename,
            chunks: document.chunk_count,
            uploaded_at: document.uploaded_at,
        },
    }))
}

/// List endpoint - GET /api/documents
pub async fn list_documents(
    State(state): State<DocumentState>,
    Extension(account): Extension<Account>,
) -> Result<Json<DocumentListResponse>, DocumentApiError> {
    let store = state.store.clone();
    let documents = tokio::task::spawn_blocking(move || store.list_for_user(account.id))
        .await
        .map_err(|e| {
            error!("Document listing task failed: {}", e);
            DocumentApiError::InternalError
        })?
        .map_err(|e| {
            error!("Failed to list documents: {:#}", e);
            DocumentApiError::InternalError
        })?;

    let documents = documents
        .into_iter()
        .map(|doc| DocumentSummary {
            id: doc.id,
            filename: doc.original_filename,
            file_type: doc.file_type,
            file_size: doc.file_size,
            chunks: doc.chunk_count,
            processed: doc.is_processed,
            uploaded_at: doc.uploaded_at,
        })
        .collect();

    Ok(Json(DocumentListResponse { documents }))
}

fn multipart_error(err: MultipartError) -> DocumentApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        DocumentApiError::TooLarge
    } else {
        warn!("Rejected multipart upload: {}", err);
        DocumentApiError::BadUpload
    }
}

/// Document API errors
#[derive(Debug)]
pub enum DocumentApiError {
    NoFile,
    FileTypeNotAllowed,
    TooLarge,
    BadUpload,
    InternalError,
}

impl IntoResponse for DocumentApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            DocumentApiError::NoFile => (StatusCode::BAD_REQUEST, "No file"),
            DocumentApiError::FileTypeNotAllowed => {
                (StatusCode::BAD_REQUEST, "File type not allowed")
            }
            DocumentApiError::TooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "File exceeds the 16 MB upload limit",
            ),
            DocumentApiError::BadUpload => (StatusCode::BAD_REQUEST, "Malformed upload"),
            DocumentApiError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "detail": message }))).into_response()
    }
}
