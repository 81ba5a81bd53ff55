//! Runtime Configuration
//! Mission: Collect secrets, token policy and storage paths from the environment

use anyhow::{bail, Context, Result};
use jsonwebtoken::Algorithm;
use std::env;
use std::path::PathBuf;
use tracing::warn;

/// Development signing key. Tokens signed with it are forgeable by anyone who
/// has read this file.
pub const DEFAULT_SECRET_KEY: &str = "dev-secret-change-in-production";

pub const DEFAULT_TOKEN_EXPIRE_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub struct Config {
    pub secret_key: String,
    pub jwt_algorithm: Algorithm,
    pub token_expire_hours: i64,
    pub bcrypt_cost: u32,
    pub database_path: String,
    pub upload_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub seed_demo_user: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            jwt_algorithm: Algorithm::HS256,
            token_expire_hours: DEFAULT_TOKEN_EXPIRE_HOURS,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            database_path: "./chatdesk.db".to_string(),
            upload_dir: PathBuf::from("./uploads"),
            host: "0.0.0.0".to_string(),
            port: 8000,
            seed_demo_user: false,
        }
    }
}

impl Config {
    /// Build the configuration from environment variables, falling back to
    /// development defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let secret_key = non_empty_var("SECRET_KEY")
            .or_else(|| non_empty_var("JWT_SECRET"))
            .unwrap_or(defaults.secret_key);

        let jwt_algorithm = match non_empty_var("JWT_ALGORITHM") {
            Some(name) => parse_algorithm(&name)?,
            None => defaults.jwt_algorithm,
        };

        let token_expire_hours = match non_empty_var("TOKEN_EXPIRE_HOURS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .context("Invalid TOKEN_EXPIRE_HOURS")?,
            None => defaults.token_expire_hours,
        };
        if token_expire_hours <= 0 {
            bail!("TOKEN_EXPIRE_HOURS must be positive (got {token_expire_hours})");
        }

        let bcrypt_cost = match non_empty_var("BCRYPT_COST") {
            Some(raw) => raw.trim().parse::<u32>().context("Invalid BCRYPT_COST")?,
            None => defaults.bcrypt_cost,
        };
        if !(4..=31).contains(&bcrypt_cost) {
            bail!("BCRYPT_COST must be between 4 and 31 (got {bcrypt_cost})");
        }

        let database_path = non_empty_var("DATABASE_PATH")
            .or_else(|| non_empty_var("DB_PATH"))
            .unwrap_or(defaults.database_path);

        let upload_dir = non_empty_var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.upload_dir);

        let host = non_empty_var("HOST").unwrap_or(defaults.host);
        let port = match non_empty_var("PORT") {
            Some(raw) => raw.trim().parse::<u16>().context("Invalid PORT")?,
            None => defaults.port,
        };

        let seed_demo_user = non_empty_var("SEED_DEMO_USER")
            .map(|v| is_truthy(&v))
            .unwrap_or(defaults.seed_demo_user);

        Ok(Self {
            secret_key,
            jwt_algorithm,
            token_expire_hours,
            bcrypt_cost,
            database_path,
            upload_dir,
            host,
            port,
            seed_demo_user,
        })
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }

    /// Log loudly about settings that must never reach production.
    pub fn warn_if_insecure(&self) {
        if self.uses_default_secret() {
            warn!("⚠️  SECRET_KEY is unset: using the development signing key, UNSAFE FOR PRODUCTION");
        } else if self.secret_key.len() < 32 {
            warn!(
                "⚠️  SECRET_KEY is only {} bytes; use at least 32 random bytes",
                self.secret_key.len()
            );
        }
        if self.seed_demo_user {
            warn!("⚠️  Demo account seeding is enabled (demo / demo123)");
        }
    }
}

/// Only the HMAC family is accepted: the signing key is a shared secret.
pub fn parse_algorithm(name: &str) -> Result<Algorithm> {
    match name.trim().to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => bail!("Unsupported JWT algorithm '{other}' (expected HS256, HS384 or HS512)"),
    }
}

pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
