//! Account Storage
//! Mission: Durable account records with storage-enforced unique usernames and emails

use crate::auth::{models::Account, password::PasswordHasher};
use crate::db;
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row, TransactionBehavior};
use thiserror::Error;
use tracing::{info, warn};

pub const DEMO_USERNAME: &str = "demo";
pub const DEMO_EMAIL: &str = "demo@test.com";
pub const DEMO_PASSWORD: &str = "demo123";

const ACCOUNT_COLUMNS: &str = "id, username, email, password_hash, created_at, updated_at";

// Usernames and emails share one login namespace, so each new value is
// checked against both columns.
const TAKEN_SQL: &str = "SELECT EXISTS(SELECT 1 FROM users
     WHERE username = ?1 OR email = ?1 OR username = ?2 OR email = ?2)";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username, email and password are required")]
    MissingFields,
    #[error("username or email already registered")]
    Duplicate,
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Account storage with SQLite backend
pub struct AccountStore {
    db_path: String,
}

impl AccountStore {
    /// Create the store and initialize its schema
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = db::open(&self.db_path)
            .with_context(|| format!("Failed to open account database at {}", self.db_path))?;
        db::enable_wal(&conn).context("Failed to enable WAL journal")?;

        // Uniqueness lives in the schema so racing registrations cannot both land.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE COLLATE NOCASE,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create users table")?;

        Ok(())
    }

    pub fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        self.find_one("username", username)
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        self.find_one("email", email)
    }

    /// Resolve a login identifier: username first, then email.
    pub fn find_by_identifier(&self, identifier: &str) -> Result<Option<Account>> {
        match self.find_by_username(identifier)? {
            Some(account) => Ok(Some(account)),
            None => self.find_by_email(identifier),
        }
    }

    fn find_one(&self, column: &'static str, value: &str) -> Result<Option<Account>> {
        let conn = db::open(&self.db_path)?;
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE {column} = ?1");
        let account = conn
            .query_row(&sql, params![value], account_from_row)
            .optional()
            .with_context(|| format!("Failed to look up account by {column}"))?;
        Ok(account)
    }

    /// True when either value is already in use as a username or an email
    pub fn identifier_taken(&self, username: &str, email: &str) -> Result<bool> {
        let conn = db::open(&self.db_path)?;
        let taken = conn
            .query_row(TAKEN_SQL, params![username, email], |row| row.get(0))
            .context("Failed to check for existing account")?;
        Ok(taken)
    }

    /// Insert an account whose password is already hashed.
    ///
    /// Runs as one IMMEDIATE transaction: the existence check and the insert
    /// see the same snapshot, and the UNIQUE indexes catch anything that slips
    /// past. Either path reports [`StoreError::Duplicate`] and writes nothing.
    pub fn create_account(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Account, StoreError> {
        let mut conn = db::open(&self.db_path)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let taken: bool = tx.query_row(TAKEN_SQL, params![username, email], |row| row.get(0))?;
        if taken {
            return Err(StoreError::Duplicate);
        }

        let now = Utc::now().to_rfc3339();
        let inserted = tx.execute(
            "INSERT INTO users (username, email, password_hash, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![username, email, password_hash, now],
        );
        match inserted {
            Ok(_) => {}
            Err(e) if db::is_unique_violation(&e) => return Err(StoreError::Duplicate),
            Err(e) => return Err(e.into()),
        }

        let id = tx.last_insert_rowid();
        tx.commit()?;

        info!("✅ Created account: {} (id {})", username, id);

        Ok(Account {
            id,
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    pub fn count_accounts(&self) -> Result<i64> {
        let conn = db::open(&self.db_path)?;
        let count = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .context("Failed to count accounts")?;
        Ok(count)
    }

    /// Create the well-known demo account if it is missing. Callers gate this
    /// behind an explicit opt-in.
    pub fn seed_demo_account(&self, hasher: &PasswordHasher) -> Result<Option<Account>> {
        if self.find_by_username(DEMO_USERNAME)?.is_some() {
            return Ok(None);
        }

        let password_hash = hasher.hash(DEMO_PASSWORD)?;
        match self.create_account(DEMO_USERNAME, DEMO_EMAIL, &password_hash) {
            Ok(account) => {
                info!(
                    "🔐 Demo account created (username: {}, password: {})",
                    DEMO_USERNAME, DEMO_PASSWORD
                );
                warn!("⚠️  NEVER ENABLE DEMO SEEDING IN PRODUCTION!");
                Ok(Some(account))
            }
            // Another process seeded it between our lookup and insert.
            Err(StoreError::Duplicate) => Ok(None),
            Err(e) => Err(anyhow::Error::new(e).context("Failed to seed demo account")),
        }
    }
}

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}
