//! Session Resolver
//! Mission: Turn a bearer token into the account making the request

use crate::auth::{jwt::JwtHandler, models::Account, user_store::AccountStore};
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

/// Boundary outcome of a failed resolution. Every token problem collapses
/// into `Unauthenticated`.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("account lookup failed: {0}")]
    Storage(#[from] anyhow::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                Json(json!({ "detail": "Could not validate credentials" })),
            )
                .into_response(),
            AuthError::Storage(e) => {
                error!("Session resolution failed: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

pub struct SessionResolver {
    jwt_handler: Arc<JwtHandler>,
    store: Arc<AccountStore>,
}

impl SessionResolver {
    pub fn new(jwt_handler: Arc<JwtHandler>, store: Arc<AccountStore>) -> Self {
        Self { jwt_handler, store }
    }

    /// Validate the token and load its subject's account (username first,
    /// then email). An account deleted after issuance is also unauthenticated.
    pub fn resolve(&self, token: &str) -> Result<Account, AuthError> {
        let subject = self.jwt_handler.validate(token).map_err(|reason| {
            debug!("Rejected bearer token: {}", reason);
            AuthError::Unauthenticated
        })?;

        match self.store.find_by_identifier(&subject)? {
            Some(account) => Ok(account),
            None => {
                debug!("Token subject {} has no account", subject);
                Err(AuthError::Unauthenticated)
            }
        }
    }
}
