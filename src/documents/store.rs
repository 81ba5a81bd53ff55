//! Document Storage
//! Mission: Persist uploaded document metadata and text per account

use crate::db;
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Row};
use serde::Serialize;
use tracing::info;

const DOCUMENT_COLUMNS: &str = "id, user_id, filename, original_filename, file_type, file_size, \
     content, chunk_count, uploaded_at, is_processed";

#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub id: i64,
    pub user_id: i64,
    pub filename: String,
    pub original_filename: String,
    pub file_type: String,
    pub file_size: i64,
    #[serde(skip_serializing)]
    pub content: String,
    pub chunk_count: i64,
    pub uploaded_at: String,
    pub is_processed: bool,
}

/// Insert payload
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub user_id: i64,
    pub filename: String,
    pub original_filename: String,
    pub file_type: String,
    pub file_size: i64,
    pub content: String,
}

pub struct DocumentStore {
    db_path: String,
}

impl DocumentStore {
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = db::open(&self.db_path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS documents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                filename TEXT NOT NULL,
                original_filename TEXT NOT NULL,
                file_type TEXT NOT NULL,
                file_size INTEGER NOT NULL,
                content TEXT NOT NULL,
                chunk_count INTEGER NOT NULL DEFAULT 0,
                uploaded_at TEXT NOT NULL,
                is_processed INTEGER NOT NULL DEFAULT 0
            );
            CREATE INDEX IF NOT EXISTS idx_documents_user ON documents(user_id);",
        )
        .context("Failed to create documents table")?;
        Ok(())
    }

    pub fn insert(&self, doc: NewDocument) -> Result<Document> {
        let conn = db::open(&self.db_path)?;
        let uploaded_at = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO documents (user_id, filename, original_filename, file_type, file_size,
                                    content, chunk_count, uploaded_at, is_processed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, 1)",
            params![
                doc.user_id,
                doc.filename,
                doc.original_filename,
                doc.file_type,
                doc.file_size,
                doc.content,
                uploaded_at,
            ],
        )
        .context("Failed to insert document")?;

        let id = conn.last_insert_rowid();
        info!(
            "📄 Stored document {} ({} bytes) for user {}",
            doc.original_filename, doc.file_size, doc.user_id
        );

        Ok(Document {
            id,
            user_id: doc.user_id,
            filename: doc.filename,
            original_filename: doc.original_filename,
            file_type: doc.file_type,
            file_size: doc.file_size,
            content: doc.content,
            chunk_count: 0,
            uploaded_at,
            is_processed: true,
        })
    }

    /// Newest first
    pub fn list_for_user(&self, user_id: i64) -> Result<Vec<Document>> {
        self.query_for_user(user_id, None)
    }

    pub fn recent_for_user(&self, user_id: i64, limit: usize) -> Result<Vec<Document>> {
        self.query_for_user(user_id, Some(limit))
    }

    fn query_for_user(&self, user_id: i64, limit: Option<usize>) -> Result<Vec<Document>> {
        let conn = db::open(&self.db_path)?;
        // A negative LIMIT means no limit to SQLite.
        let limit = limit.map(|l| l as i64).unwrap_or(-1);

        let mut stmt = conn.prepare(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents
             WHERE user_id = ?1
             ORDER BY id DESC
             LIMIT ?2"
        ))?;

        let documents = stmt
            .query_map(params![user_id, limit], document_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list documents")?;

        Ok(documents)
    }
}

fn document_from_row(row: &Row<'_>) -> rusqlite::Result<Document> {
    Ok(Document {
        id: row.get(0)?,
        user_id: row.get(1)?,
        filename: row.get(2)?,
        original_filename: row.get(3)?,
        file_type: row.get(4)?,
        file_size: row.get(5)?,
        content: row.get(6)?,
        chunk_count: row.get(7)?,
        uploaded_at: row.get(8)?,
        is_processed: row.get(9)?,
    })
}
