//! Authentication Models
//! Mission: Define account records, token claims and auth request/response bodies

use serde::{Deserialize, Serialize};
use std::fmt;

/// Registered account
#[derive(Clone, Serialize)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt digest - never serialize
    pub created_at: String,
    pub updated_at: String,
}

// Hand-written so the digest never ends up in a log line.
impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// JWT Claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>, // username or email the token was issued for
    pub exp: i64, // expiration timestamp
    #[serde(default)]
    pub iat: i64,
}

/// Registration form body
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login form body; `username` may hold either the username or the email
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Public part of an account
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    pub username: String,
    pub email: String,
}

impl UserResponse {
    pub fn from_account(account: &Account) -> Self {
        Self {
            username: account.username.clone(),
            email: account.email.clone(),
        }
    }
}

/// Register/login response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub user: UserResponse,
    pub access_token: String,
    pub token_type: &'static str,
}

impl AuthResponse {
    pub fn bearer(message: &'static str, account: &Account, access_token: String) -> Self {
        Self {
            message,
            user: UserResponse::from_account(account),
            access_token,
            token_type: "bearer",
        }
    }
}

/// GET /api/auth/me
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: String,
}

impl ProfileResponse {
    pub fn from_account(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            created_at: account.created_at.clone(),
        }
    }
}
