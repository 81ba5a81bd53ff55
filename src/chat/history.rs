//! Chat History Storage
//! Mission: Persist each user message and bot reply per session

use crate::chat::responder::{ChatReply, SourceRef};
use crate::db;
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Row};
use serde::Serialize;

const MESSAGE_COLUMNS: &str =
    "id, user_id, session_id, message, is_user, tokens_used, source_documents, created_at";

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub id: i64,
    pub user_id: i64,
    pub session_id: String,
    pub message: String,
    pub is_user: bool,
    pub tokens_used: i64,
    pub sources: Vec<SourceRef>,
    pub created_at: String,
}

pub struct ChatStore {
    db_path: String,
}

impl ChatStore {
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
            "CREATE TABLE IF NOT EXISTS chat_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                session_id TEXT NOT NULL,
                message TEXT NOT NULL,
                is_user INTEGER NOT NULL,
                tokens_used INTEGER NOT NULL DEFAULT 0,
                source_documents TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_chat_history_session
                ON chat_history(user_id, session_id);",
        )
        .context("Failed to create chat_history table")?;
        Ok(())
    }

    /// Store the user's message and the bot's reply together; returns the
    /// reply's row id.
    pub fn record_exchange(
        &self,
        user_id: i64,
        session_id: &str,
        user_message: &str,
        reply: &ChatReply,
    ) -> Result<i64> {
        let mut conn = db::open(&self.db_path)?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();
        let sources =
            serde_json::to_string(&reply.sources).context("Failed to encode reply sources")?;

        tx.execute(
            "INSERT INTO chat_history (user_id, session_id, message, is_user, tokens_used, source_documents, created_at)
             VALUES (?1, ?2, ?3, 1, 0, '[]', ?4)",
            params![user_id, session_id, user_message, now],
        )
        .context("Failed to store user message")?;

        tx.execute(
            "INSERT INTO chat_history (user_id, session_id, message, is_user, tokens_used, source_documents, created_at)
             VALUES (?1, ?2, ?3, 0, ?4, ?5, ?6)",
            params![user_id, session_id, reply.response, reply.tokens_used, sources, now],
        )
        .context("Failed to store bot reply")?;

        let reply_id = tx.last_insert_rowid();
        tx.commit().context("Failed to commit chat exchange")?;
        Ok(reply_id)
    }

    /// Oldest first, optionally narrowed to one session
    pub fn history(&self, user_id: i64, session_id: Option<&str>) -> Result<Vec<ChatMessage>> {
        let conn = db::open(&self.db_path)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM chat_history
             WHERE user_id = ?1 AND (?2 IS NULL OR session_id = ?2)
             ORDER BY id ASC"
        ))?;

        let messages = stmt
            .query_map(params![user_id, session_id], message_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to load chat history")?;

        Ok(messages)
    }
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<ChatMessage> {
    let raw_sources: String = row.get(6)?;
    Ok(ChatMessage {
        id: row.get(0)?,
        user_id: row.get(1)?,
        session_id: row.get(2)?,
        message: row.get(3)?,
        is_user: row.get(4)?,
        tokens_used: row.get(5)?,
        // Rows are only ever written by record_exchange; tolerate anything else.
        sources: serde_json::from_str(&raw_sources).unwrap_or_default(),
        created_at: row.get(7)?,
    })
}
