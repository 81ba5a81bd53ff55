//! HTTP surface: shared application state and router composition.

use crate::{
    auth::{
        api as auth_api, auth_middleware, AccountStore, AuthState, Authenticator, JwtHandler,
        PasswordHasher, SessionResolver,
    },
    chat::{api as chat_api, ChatState, ChatStore},
    config::Config,
    documents::{api as documents_api, DocumentState, DocumentStore, UPLOAD_BODY_LIMIT},
    middleware::request_logging,
};
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub account_store: Arc<AccountStore>,
    pub document_store: Arc<DocumentStore>,
    pub chat_store: Arc<ChatStore>,
    pub jwt_handler: Arc<JwtHandler>,
    pub authenticator: Arc<Authenticator>,
    pub session_resolver: Arc<SessionResolver>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Open the stores and wire the auth components together.
    pub fn new(config: &Config) -> Result<Self> {
        let db_path = config.database_path.as_str();

        let account_store = Arc::new(
            AccountStore::new(db_path).context("Failed to initialize account store")?,
        );
        let document_store = Arc::new(
            DocumentStore::new(db_path).context("Failed to initialize document store")?,
        );
        let chat_store =
            Arc::new(ChatStore::new(db_path).context("Failed to initialize chat store")?);

        let jwt_handler = Arc::new(JwtHandler::from_config(config));
        let authenticator = Arc::new(Authenticator::new(
            account_store.clone(),
            PasswordHasher::new(config.bcrypt_cost),
        ));
        let session_resolver = Arc::new(SessionResolver::new(
            jwt_handler.clone(),
            account_store.clone(),
        ));

        info!("🗄️  Storage initialized at: {}", db_path);

        Ok(Self {
            account_store,
            document_store,
            chat_store,
            jwt_handler,
            authenticator,
            session_resolver,
            config: Arc::new(config.clone()),
        })
    }

    /// Opt-in demo account
    pub fn seed_demo_account(&self) -> Result<()> {
        self.account_store
            .seed_demo_account(self.authenticator.hasher())?;
        Ok(())
    }
}

/// Build the full API router
pub fn build_router(state: AppState) -> Router {
    let auth_state = AuthState::new(state.authenticator.clone(), state.jwt_handler.clone());
    let document_state = DocumentState {
        store: state.document_store.clone(),
        upload_dir: state.config.upload_dir.clone(),
    };
    let chat_state = ChatState {
        chat_store: state.chat_store.clone(),
        document_store: state.document_store.clone(),
    };

    let auth_router = Router::new()
        .route("/api/auth/register", post(auth_api::register))
        .route("/api/auth/login", post(auth_api::login))
        .with_state(auth_state);

    let document_router = Router::new()
        .route(
            "/api/documents/upload",
            post(documents_api::upload_document).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/documents", get(documents_api::list_documents))
        .with_state(document_state);

    let chat_router = Router::new()
        .route("/api/chat", post(chat_api::post_chat))
        .route("/api/chat/history", get(chat_api::get_chat_history))
        .with_state(chat_state);

    // Everything here requires a resolved account
    let protected_routes = Router::new()
        .route("/api/auth/me", get(auth_api::get_current_user))
        .merge(document_router)
        .merge(chat_router)
        .route_layer(middleware::from_fn_with_state(
            state.session_resolver.clone(),
            auth_middleware,
        ));

    let public_routes = Router::new().route("/api/health", get(health_check));

    Router::new()
        .merge(public_routes)
        .merge(auth_router)
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_logging)),
        )
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "chatdesk",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
