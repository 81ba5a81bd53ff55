//! Authentication API Endpoints
//! Mission: Register, log in and describe the current account

use crate::auth::{
    authenticator::Authenticator,
    jwt::JwtHandler,
    models::{Account, AuthResponse, LoginForm, ProfileResponse, RegisterForm},
    user_store::StoreError,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Form, Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub authenticator: Arc<Authenticator>,
    pub jwt_handler: Arc<JwtHandler>,
}

impl AuthState {
    pub fn new(authenticator: Arc<Authenticator>, jwt_handler: Arc<JwtHandler>) -> Self {
        Self {
            authenticator,
            jwt_handler,
        }
    }

    fn issue_token(&self, account: &Account) -> Result<String, AuthApiError> {
        self.jwt_handler
            .issue_default(&account.username)
            .map_err(|e| {
                error!("Failed to issue token for {}: {:#}", account.username, e);
                AuthApiError::InternalError
            })
    }
}

/// Register endpoint - POST /api/auth/register
pub async fn register(
    State(state): State<AuthState>,
    Form(form): Form<RegisterForm>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthApiError> {
    let RegisterForm {
        username,
        email,
        password,
    } = form;

    info!("📝 Registration attempt: {}", username.trim());

    let authenticator = state.authenticator.clone();
    let account =
        tokio::task::spawn_blocking(move || authenticator.register(&username, &email, &password))
            .await
            .map_err(|e| {
                error!("Registration task failed: {}", e);
                AuthApiError::InternalError
            })?
            .map_err(|e| match e {
                StoreError::MissingFields => AuthApiError::MissingFields,
                StoreError::Duplicate => {
                    warn!("❌ Registration rejected: username or email taken");
                    AuthApiError::AlreadyRegistered
                }
                other => {
                    error!("Failed to create account: {:#}", other);
                    AuthApiError::InternalError
                }
            })?;

    let token = state.issue_token(&account)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::bearer("User created", &account, token)),
    ))
}

/// Login endpoint - POST /api/auth/login
pub async fn login(
    State(state): State<AuthState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<AuthResponse>, AuthApiError> {
    let LoginForm { username, password } = form;
    info!("🔐 Login attempt: {}", username);

    let authenticator = state.authenticator.clone();
    let identifier = username.clone();
    let account =
        tokio::task::spawn_blocking(move || authenticator.authenticate(&identifier, &password))
            .await
            .map_err(|e| {
                error!("Login task failed: {}", e);
                AuthApiError::InternalError
            })?
            .map_err(|e| {
                error!("Credential lookup failed: {:#}", e);
                AuthApiError::InternalError
            })?
            .ok_or_else(|| {
                warn!("❌ Failed login attempt: {}", username);
                AuthApiError::InvalidCredentials
            })?;

    let token = state.issue_token(&account)?;

    info!("✅ Login successful: {}", account.username);

    Ok(Json(AuthResponse::bearer("Login successful", &account, token)))
}

/// Get current account - GET /api/auth/me
pub async fn get_current_user(Extension(account): Extension<Account>) -> Json<ProfileResponse> {
    Json(ProfileResponse::from_account(&account))
}

/// Auth API errors
#[derive(Debug)]
pub enum AuthApiError {
    InvalidCredentials,
    AlreadyRegistered,
    MissingFields,
    InternalError,
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Incorrect username or password")
            }
            AuthApiError::AlreadyRegistered => {
                (StatusCode::BAD_REQUEST, "Username or email already registered")
            }
            AuthApiError::MissingFields => (
                StatusCode::BAD_REQUEST,
                "Username, email and password are required",
            ),
            AuthApiError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "detail": message }))).into_response()
    }
}
