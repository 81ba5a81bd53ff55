//! Authenticator
//! Mission: Check credentials against the account store and admit new accounts

use crate::auth::{
    models::Account,
    password::PasswordHasher,
    user_store::{AccountStore, StoreError},
};
use anyhow::Result;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

/// Hashed once per authenticator and verified against when the identifier
/// matches nobody, so unknown accounts cost the same bcrypt work.
const DUMMY_PASSWORD: &str = "chatdesk-no-such-account";

pub struct Authenticator {
    store: Arc<AccountStore>,
    hasher: PasswordHasher,
    dummy_digest: OnceLock<String>,
}

impl Authenticator {
    pub fn new(store: Arc<AccountStore>, hasher: PasswordHasher) -> Self {
        Self {
            store,
            hasher,
            dummy_digest: OnceLock::new(),
        }
    }

    pub fn store(&self) -> &Arc<AccountStore> {
        &self.store
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    /// Username-or-email plus password. `None` covers both an unknown
    /// identifier and a wrong password; callers must not tell them apart.
    pub fn authenticate(&self, identifier: &str, password: &str) -> Result<Option<Account>> {
        let identifier = identifier.trim();
        let Some(account) = self.store.find_by_identifier(identifier)? else {
            debug!("No account matches identifier {}", identifier);
            self.hasher.verify(password, self.dummy_digest());
            return Ok(None);
        };

        if self.hasher.verify(password, &account.password_hash) {
            Ok(Some(account))
        } else {
            debug!("Password mismatch for account {}", account.id);
            Ok(None)
        }
    }

    /// Hash the password and create the account. Username and email are
    /// trimmed here, the same way `authenticate` trims its identifier.
    /// A cheap pre-check skips the bcrypt cost for obvious collisions; the
    /// store's transaction is what actually guarantees uniqueness.
    pub fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Account, StoreError> {
        let username = username.trim();
        let email = email.trim();
        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(StoreError::MissingFields);
        }

        if self.store.identifier_taken(username, email)? {
            return Err(StoreError::Duplicate);
        }
        let password_hash = self.hasher.hash(password)?;
        self.store.create_account(username, email, &password_hash)
    }

    fn dummy_digest(&self) -> &str {
        self.dummy_digest.get_or_init(|| {
            self.hasher.hash(DUMMY_PASSWORD).unwrap_or_else(|e| {
                warn!("Could not prepare dummy password digest: {:#}", e);
                String::new()
            })
        })
    }
}
