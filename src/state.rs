// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ScholarStream

use std::sync::Arc;

use crate::storage::DocumentStorage;

/// Authentication and authorization policy configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret for issued tokens.
    pub token_secret: String,
    /// Bootstrap admin identity; its role can never be altered via the API.
    pub admin_email: Option<String>,
    /// Bootstrap super-admin identity; its role can never be altered via
    /// the API.
    pub super_admin_email: Option<String>,
}

impl AuthConfig {
    /// Whether `email` is one of the environment-configured bootstrap
    /// identities.
    pub fn is_bootstrap(&self, email: &str) -> bool {
        let matches = |configured: &Option<String>| {
            configured
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(email))
        };
        matches(&self.admin_email) || matches(&self.super_admin_email)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: "insecure-dev-secret".to_string(),
            admin_email: None,
            super_admin_email: None,
        }
    }
}

/// Shared application state handed to every handler.
///
/// Replaces the original's process-wide collection handles: the storage
/// context is constructed once at startup and cloned (cheaply, via `Arc`)
/// into each request.
#[derive(Clone)]
pub struct AppState {
    storage: Arc<DocumentStorage>,
    pub auth_config: AuthConfig,
}

impl AppState {
    pub fn new(storage: DocumentStorage) -> Self {
        Self {
            storage: Arc::new(storage),
            auth_config: AuthConfig::default(),
        }
    }

    pub fn with_auth_config(mut self, auth_config: AuthConfig) -> Self {
        self.auth_config = auth_config;
        self
    }

    /// Handle to the document store.
    pub fn storage(&self) -> Arc<DocumentStorage> {
        self.storage.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_match_is_case_insensitive() {
        let config = AuthConfig {
            token_secret: "secret".to_string(),
            admin_email: Some("admin@example.com".to_string()),
            super_admin_email: Some("root@example.com".to_string()),
        };

        assert!(config.is_bootstrap("Admin@Example.com"));
        assert!(config.is_bootstrap("root@example.com"));
        assert!(!config.is_bootstrap("student@example.com"));
    }

    #[test]
    fn default_config_has_no_bootstrap_identities() {
        let config = AuthConfig::default();
        assert!(!config.is_bootstrap("admin@example.com"));
    }
}
