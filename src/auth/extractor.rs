// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ScholarStream

//! Axum extractors for authenticated and authorized users.
//!
//! Use the `Auth` extractor in handlers to require a verified token:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(claims): Auth) -> impl IntoResponse {
//!     // claims.email() is the verified identity
//! }
//! ```
//!
//! `ModeratorOnly` and `AdminOnly` additionally load the caller's role from
//! the users collection and reject callers below the gate. The role is
//! looked up per request rather than trusted from the token, so role changes
//! apply to tokens that are already in flight.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{token, AuthError, Role, TokenClaims};
use crate::state::AppState;
use crate::storage::UserRepository;

/// A caller whose token was verified and whose role was loaded from storage.
#[derive(Debug, Clone)]
pub struct AuthorizedUser {
    /// Verified email identity.
    pub email: String,
    /// Role loaded from the users collection.
    pub role: Role,
}

/// Extractor for authenticated callers.
///
/// Validates the bearer token from the Authorization header and yields the
/// verified claims. Does not touch storage.
pub struct Auth(pub TokenClaims);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // First check if middleware or a test already set the claims
        if let Some(claims) = parts.extensions.get::<TokenClaims>().cloned() {
            return Ok(Auth(claims));
        }

        // Extract Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        // Extract Bearer token
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?;

        let claims = token::verify(token.trim(), &state.auth_config.token_secret)?;

        Ok(Auth(claims))
    }
}

/// The role stored for `email`, defaulting to Student when no user matches.
pub fn role_for_email(state: &AppState, email: &str) -> Role {
    let storage = state.storage();
    let repo = UserRepository::new(&storage);
    match repo.find_by_email(email) {
        Ok(Some(user)) => user.role,
        _ => Role::default(),
    }
}

fn require_role(state: &AppState, claims: &TokenClaims, required: Role) -> Result<AuthorizedUser, AuthError> {
    let storage = state.storage();
    let repo = UserRepository::new(&storage);

    let user = repo
        .find_by_email(claims.email())
        .map_err(|e| AuthError::InternalError(format!("role lookup failed: {e}")))?
        .ok_or(AuthError::InsufficientPermissions)?;

    if !user.role.has_privilege(required) {
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(AuthorizedUser {
        email: user.email,
        role: user.role,
    })
}

/// Extractor that requires the Moderator role (or higher).
pub struct ModeratorOnly(pub AuthorizedUser);

impl FromRequestParts<AppState> for ModeratorOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(claims) = Auth::from_request_parts(parts, state).await?;
        let user = require_role(state, &claims, Role::Moderator)?;
        Ok(ModeratorOnly(user))
    }
}

/// Extractor that requires the Admin role (or higher).
pub struct AdminOnly(pub AuthorizedUser);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(claims) = Auth::from_request_parts(parts, state).await?;
        let user = require_role(state, &claims, Role::Admin)?;
        Ok(AdminOnly(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AppState, AuthConfig};
    use crate::storage::{DocumentStorage, StoragePaths, StoredUser};
    use axum::http::Request;
    use tempfile::TempDir;

    const SECRET: &str = "test-secret";

    /// Helper to create a test AppState over a temp data directory.
    fn create_test_state() -> (AppState, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let paths = StoragePaths::new(temp_dir.path());
        let mut storage = DocumentStorage::new(paths);
        storage.initialize().expect("Failed to initialize storage");

        let state = AppState::new(storage).with_auth_config(AuthConfig {
            token_secret: SECRET.to_string(),
            admin_email: None,
            super_admin_email: None,
        });
        (state, temp_dir)
    }

    fn seed_user(state: &AppState, email: &str, role: Role) {
        let storage = state.storage();
        let repo = UserRepository::new(&storage);
        repo.create(&StoredUser::new(
            uuid::Uuid::new_v4().to_string(),
            email.to_string(),
            "Test User".to_string(),
            None,
            role,
        ))
        .expect("seed user");
    }

    fn request_with_token(email: &str) -> Parts {
        let token = token::issue(email, SECRET).expect("issue token");
        Request::builder()
            .uri("/test")
            .header("Authorization", format!("Bearer {token}"))
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let (state, _temp_dir) = create_test_state();
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_non_bearer_header() {
        let (state, _temp_dir) = create_test_state();
        let mut parts = Request::builder()
            .uri("/test")
            .header("Authorization", "Basic abc123")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_succeeds_with_issued_token() {
        let (state, _temp_dir) = create_test_state();
        let mut parts = request_with_token("student@example.com");

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(result.is_ok());
        assert_eq!(result.unwrap().0.email(), "student@example.com");
    }

    #[tokio::test]
    async fn auth_extractor_prefers_extensions() {
        let (state, _temp_dir) = create_test_state();
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let claims = TokenClaims {
            sub: "preset@example.com".to_string(),
            iat: 0,
            exp: 0,
        };
        parts.extensions.insert(claims);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(result.is_ok());
        assert_eq!(result.unwrap().0.email(), "preset@example.com");
    }

    #[tokio::test]
    async fn admin_only_rejects_student() {
        let (state, _temp_dir) = create_test_state();
        seed_user(&state, "student@example.com", Role::Student);
        let mut parts = request_with_token("student@example.com");

        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[tokio::test]
    async fn admin_only_rejects_unknown_user() {
        let (state, _temp_dir) = create_test_state();
        let mut parts = request_with_token("ghost@example.com");

        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[tokio::test]
    async fn admin_only_accepts_admin() {
        let (state, _temp_dir) = create_test_state();
        seed_user(&state, "admin@example.com", Role::Admin);
        let mut parts = request_with_token("admin@example.com");

        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        let AdminOnly(user) = result.expect("admin should pass");
        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn moderator_gate_accepts_higher_roles() {
        let (state, _temp_dir) = create_test_state();
        seed_user(&state, "root@example.com", Role::SuperAdmin);
        let mut parts = request_with_token("root@example.com");

        let result = ModeratorOnly::from_request_parts(&mut parts, &state).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn role_for_email_defaults_to_student() {
        let (state, _temp_dir) = create_test_state();
        assert_eq!(role_for_email(&state, "nobody@example.com"), Role::Student);

        seed_user(&state, "mod@example.com", Role::Moderator);
        assert_eq!(role_for_email(&state, "mod@example.com"), Role::Moderator);
    }
}
