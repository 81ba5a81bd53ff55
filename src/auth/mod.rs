//! Authentication Module
//! Mission: Password hashing, signed bearer tokens, credential checks and per-request session resolution

pub mod api;
pub mod authenticator;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod session;
pub mod user_store;

pub use api::AuthState;
pub use authenticator::Authenticator;
pub use jwt::{JwtHandler, TokenError};
pub use middleware::auth_middleware;
pub use models::Account;
pub use password::PasswordHasher;
pub use session::{AuthError, SessionResolver};
pub use user_store::{AccountStore, StoreError};
