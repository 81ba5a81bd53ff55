//! Authentication Middleware
//! Mission: Protect API endpoints by resolving the bearer token to an account

use crate::auth::session::{AuthError, SessionResolver};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use std::sync::Arc;

/// Resolves `Authorization: Bearer <token>` and stores the [`Account`] in the
/// request extensions for handlers to pick up with `Extension<Account>`.
///
/// [`Account`]: crate::auth::models::Account
pub async fn auth_middleware(
    State(resolver): State<Arc<SessionResolver>>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AuthError::Unauthenticated)?;
    let token = bearer.token().to_string();

    // Account lookup touches SQLite; keep it off the async workers.
    let account = tokio::task::spawn_blocking(move || resolver.resolve(&token))
        .await
        .map_err(|e| AuthError::Storage(e.into()))??;

    req.extensions_mut().insert(account);

    Ok(next.run(req).await)
}
