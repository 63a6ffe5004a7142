//! In-memory credential store with argon2 password hashes.
//!
//! Owned by whoever builds it (usually the CLI from the `[auth]` section);
//! nothing is written back.

use std::collections::HashMap;

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use tracing::{info, warn};

use crate::domain::error::NavError;
use crate::ports::auth_port::Authenticator;
use crate::ports::config_port::ConfigPort;

/// Hash `password` into a PHC string suitable for `[auth]`.
pub fn hash_password(password: &str) -> Result<String, NavError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| NavError::Credential {
            reason: e.to_string(),
        })
}

#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    // username -> PHC hash
    users: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new() -> Self {
        CredentialStore {
            users: HashMap::new(),
        }
    }

    /// Load `username = hash` pairs from the `[auth]` section.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, NavError> {
        let mut store = CredentialStore::new();
        for username in config.keys("auth") {
            let hash = config
                .get_string("auth", &username)
                .ok_or_else(|| NavError::ConfigMissing {
                    section: "auth".to_string(),
                    key: username.clone(),
                })?;
            PasswordHash::new(hash.trim()).map_err(|e| NavError::ConfigInvalid {
                section: "auth".to_string(),
                key: username.clone(),
                reason: e.to_string(),
            })?;
            store.users.insert(username, hash.trim().to_string());
        }
        info!(users = store.users.len(), "credential store loaded");
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    /// Stored PHC hash for `username`.
    pub fn hash_for(&self, username: &str) -> Option<&str> {
        self.users.get(username).map(String::as_str)
    }
}

impl Authenticator for CredentialStore {
    fn login(&self, username: &str, password: &str) -> bool {
        let Some(stored) = self.users.get(username) else {
            warn!(username, "login for unknown user");
            return false;
        };
        let parsed = match PasswordHash::new(stored) {
            Ok(h) => h,
            Err(_) => return false,
        };
        let ok = Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok();
        if !ok {
            warn!(username, "login failed");
        }
        ok
    }

    fn register(&mut self, username: &str, password: &str) -> bool {
        if username.is_empty() || self.users.contains_key(username) {
            return false;
        }
        match hash_password(password) {
            Ok(hash) => {
                self.users.insert(username.to_string(), hash);
                info!(username, "user registered");
                true
            }
            Err(e) => {
                warn!(username, error = %e, "could not hash password");
                false
            }
        }
    }
}
