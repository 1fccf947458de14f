// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ScholarStream

//! User endpoints: first-sign-in registration, admin listing/deletion, role
//! lookup and the role-change operation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    auth::{AdminOnly, AuthorizedUser, Role},
    error::ApiError,
    state::{AppState, AuthConfig},
    storage::{StoredUser, UserRepository},
};

/// Request body for POST /users (first sign-in).
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    /// Display name.
    pub name: String,
    /// Sign-in email.
    pub email: String,
    /// Optional avatar reference.
    #[serde(default)]
    pub photo: Option<String>,
}

/// User record returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// User ID.
    pub user_id: String,
    /// Sign-in email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Optional avatar reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Authorization role.
    pub role: Role,
    /// Creation time.
    pub created_at: String,
}

/// Response for POST /users: the created record, or a notice that the email
/// is already registered.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum CreateUserResponse {
    /// The email already has an account.
    Existing {
        /// Human-readable notice.
        message: String,
    },
    /// Freshly created account.
    Created(UserResponse),
}

/// List response for GET /users.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    /// All registered users.
    pub users: Vec<UserResponse>,
    /// Total count.
    pub total: usize,
}

/// Request body for PATCH /users/role/{id}.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SetRoleRequest {
    /// The role to assign.
    pub role: Role,
}

/// Response for PATCH /users/role/{id}.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoleChangeResponse {
    /// Human-readable outcome.
    pub message: String,
    /// The updated user record.
    pub result: UserResponse,
}

/// Response for GET /users/{email}/role.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoleResponse {
    /// The stored role, `student` when the email is unknown.
    pub role: Role,
}

/// Simple message response.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: String,
}

fn to_response(record: &StoredUser) -> UserResponse {
    UserResponse {
        user_id: record.user_id.clone(),
        email: record.email.clone(),
        name: record.name.clone(),
        photo_url: record.photo_url.clone(),
        role: record.role,
        created_at: record.created_at.to_rfc3339(),
    }
}

/// Role assigned at first sign-in: bootstrap identities come up elevated,
/// everyone else starts as a student.
fn initial_role(config: &AuthConfig, email: &str) -> Role {
    if config
        .super_admin_email
        .as_deref()
        .is_some_and(|c| c.eq_ignore_ascii_case(email))
    {
        Role::SuperAdmin
    } else if config
        .admin_email
        .as_deref()
        .is_some_and(|c| c.eq_ignore_ascii_case(email))
    {
        Role::Admin
    } else {
        Role::Student
    }
}

/// The one canonical role-change policy.
///
/// The requester (already past the Admin gate) must strictly outrank both
/// the target's current role and the requested role; nobody may change
/// their own role; bootstrap identities are immutable regardless of
/// requester.
fn authorize_role_change(
    requester: &AuthorizedUser,
    target: &StoredUser,
    new_role: Role,
    config: &AuthConfig,
) -> Result<(), ApiError> {
    if config.is_bootstrap(&target.email) {
        return Err(ApiError::forbidden(
            "The bootstrap identity's role cannot be changed",
        ));
    }
    if requester.email.eq_ignore_ascii_case(&target.email) {
        return Err(ApiError::forbidden("You cannot change your own role"));
    }
    if requester.role.rank() <= target.role.rank() {
        return Err(ApiError::forbidden(
            "Changing this user's role requires a higher-privileged role",
        ));
    }
    if requester.role.rank() <= new_role.rank() {
        return Err(ApiError::forbidden(
            "You cannot grant a role at or above your own",
        ));
    }
    Ok(())
}

/// Register a user on first sign-in.
///
/// Creating an email that already exists is not an error: the existing
/// account is left untouched and a notice is returned.
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 200, description = "User already exists", body = MessageResponse),
        (status = 400, description = "Missing required field")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), ApiError> {
    let email = request.email.trim().to_string();
    if email.is_empty() {
        return Err(ApiError::bad_request("email is required"));
    }

    let storage = state.storage();
    let repo = UserRepository::new(&storage);

    let existing = repo
        .find_by_email(&email)
        .map_err(|e| ApiError::internal(format!("Failed to look up user: {e}")))?;
    if existing.is_some() {
        return Ok((
            StatusCode::OK,
            Json(CreateUserResponse::Existing {
                message: "User already exists".to_string(),
            }),
        ));
    }

    let record = StoredUser::new(
        Uuid::new_v4().to_string(),
        email.clone(),
        request.name,
        request.photo,
        initial_role(&state.auth_config, &email),
    );
    repo.create(&record)
        .map_err(|e| ApiError::internal(format!("Failed to store user: {e}")))?;

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse::Created(to_response(&record))),
    ))
}

/// List all users. Admin only.
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users", body = UserListResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)")
    )
)]
pub async fn list_users(
    AdminOnly(_user): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<UserListResponse>, ApiError> {
    let storage = state.storage();
    let repo = UserRepository::new(&storage);

    let users = repo
        .list_all()
        .map_err(|e| ApiError::internal(format!("Failed to list users: {e}")))?;
    let mapped: Vec<UserResponse> = users.iter().map(to_response).collect();

    Ok(Json(UserListResponse {
        total: mapped.len(),
        users: mapped,
    }))
}

/// Delete a user. Admin only; bootstrap identities are refused.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized or bootstrap identity"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    AdminOnly(_user): AdminOnly,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let storage = state.storage();
    let repo = UserRepository::new(&storage);

    let target = repo
        .get(&user_id)
        .map_err(|_| ApiError::not_found("User not found"))?;
    if state.auth_config.is_bootstrap(&target.email) {
        return Err(ApiError::forbidden(
            "The bootstrap identity cannot be deleted",
        ));
    }

    repo.delete(&user_id)
        .map_err(|e| ApiError::internal(format!("Failed to delete user: {e}")))?;

    Ok(Json(MessageResponse {
        message: "User deleted".to_string(),
    }))
}

/// Change a user's role. Admin only, with the canonical policy.
#[utoipa::path(
    patch,
    path = "/users/role/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "Target user ID")
    ),
    request_body = SetRoleRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Role updated", body = RoleChangeResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Policy refused the change"),
        (status = 404, description = "User not found")
    )
)]
pub async fn set_user_role(
    AdminOnly(requester): AdminOnly,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<SetRoleRequest>,
) -> Result<Json<RoleChangeResponse>, ApiError> {
    let storage = state.storage();
    let repo = UserRepository::new(&storage);

    let mut target = repo
        .get(&user_id)
        .map_err(|_| ApiError::not_found("User not found"))?;

    authorize_role_change(&requester, &target, request.role, &state.auth_config)?;

    target.role = request.role;
    repo.update(&target)
        .map_err(|e| ApiError::internal(format!("Failed to update user: {e}")))?;

    Ok(Json(RoleChangeResponse {
        message: format!("Role updated to {}", target.role),
        result: to_response(&target),
    }))
}

/// Look up the role stored for an email; unknown emails are students.
#[utoipa::path(
    get,
    path = "/users/{email}/role",
    tag = "Users",
    params(
        ("email" = String, Path, description = "User email")
    ),
    responses(
        (status = 200, description = "Stored role", body = RoleResponse)
    )
)]
pub async fn get_role(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Json<RoleResponse> {
    Json(RoleResponse {
        role: crate::auth::extractor::role_for_email(&state, &email),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DocumentStorage, StoragePaths};
    use tempfile::TempDir;

    fn test_state(admin_email: Option<&str>, super_admin_email: Option<&str>) -> (AppState, TempDir) {
        let temp_dir = TempDir::new().expect("temp dir");
        let paths = StoragePaths::new(temp_dir.path());
        let mut storage = DocumentStorage::new(paths);
        storage.initialize().expect("initialize storage");

        let state = AppState::new(storage).with_auth_config(AuthConfig {
            token_secret: "test-secret".to_string(),
            admin_email: admin_email.map(str::to_string),
            super_admin_email: super_admin_email.map(str::to_string),
        });
        (state, temp_dir)
    }

    fn seed_user(state: &AppState, email: &str, role: Role) -> StoredUser {
        let storage = state.storage();
        let repo = UserRepository::new(&storage);
        let record = StoredUser::new(
            Uuid::new_v4().to_string(),
            email.to_string(),
            "Test User".to_string(),
            None,
            role,
        );
        repo.create(&record).expect("seed user");
        record
    }

    fn requester(email: &str, role: Role) -> AuthorizedUser {
        AuthorizedUser {
            email: email.to_string(),
            role,
        }
    }

    fn stored(email: &str, role: Role) -> StoredUser {
        StoredUser::new(
            "target-id".to_string(),
            email.to_string(),
            "Target".to_string(),
            None,
            role,
        )
    }

    #[test]
    fn admin_may_promote_student_to_moderator() {
        let config = AuthConfig::default();
        let result = authorize_role_change(
            &requester("admin@example.com", Role::Admin),
            &stored("student@example.com", Role::Student),
            Role::Moderator,
            &config,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn admin_may_not_touch_equal_rank_target() {
        let config = AuthConfig::default();
        let err = authorize_role_change(
            &requester("admin@example.com", Role::Admin),
            &stored("other-admin@example.com", Role::Admin),
            Role::Student,
            &config,
        )
        .expect_err("equal rank should fail");
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn admin_may_not_grant_own_rank() {
        let config = AuthConfig::default();
        let err = authorize_role_change(
            &requester("admin@example.com", Role::Admin),
            &stored("student@example.com", Role::Student),
            Role::Admin,
            &config,
        )
        .expect_err("granting own rank should fail");
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn nobody_changes_their_own_role() {
        let config = AuthConfig::default();
        let err = authorize_role_change(
            &requester("admin@example.com", Role::Admin),
            &stored("Admin@Example.com", Role::Moderator),
            Role::Student,
            &config,
        )
        .expect_err("self change should fail");
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn bootstrap_target_fails_regardless_of_requester() {
        let config = AuthConfig {
            token_secret: "secret".to_string(),
            admin_email: Some("admin@example.com".to_string()),
            super_admin_email: Some("root@example.com".to_string()),
        };
        let err = authorize_role_change(
            &requester("root@example.com", Role::SuperAdmin),
            &stored("admin@example.com", Role::Admin),
            Role::Student,
            &config,
        )
        .expect_err("bootstrap target should fail");
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn super_admin_may_demote_admin() {
        let config = AuthConfig::default();
        let result = authorize_role_change(
            &requester("root@example.com", Role::SuperAdmin),
            &stored("admin@example.com", Role::Admin),
            Role::Moderator,
            &config,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn initial_role_elevates_bootstrap_identities() {
        let config = AuthConfig {
            token_secret: "secret".to_string(),
            admin_email: Some("admin@example.com".to_string()),
            super_admin_email: Some("root@example.com".to_string()),
        };
        assert_eq!(initial_role(&config, "root@example.com"), Role::SuperAdmin);
        assert_eq!(initial_role(&config, "Admin@Example.com"), Role::Admin);
        assert_eq!(initial_role(&config, "student@example.com"), Role::Student);
    }

    #[tokio::test]
    async fn create_user_is_idempotent_per_email() {
        let (state, _temp_dir) = test_state(None, None);

        let request = CreateUserRequest {
            name: "Student".to_string(),
            email: "student@example.com".to_string(),
            photo: None,
        };

        let (status, _) = create_user(State(state.clone()), Json(request.clone()))
            .await
            .expect("first create");
        assert_eq!(status, StatusCode::CREATED);

        let (status, Json(body)) = create_user(State(state.clone()), Json(request))
            .await
            .expect("second create");
        assert_eq!(status, StatusCode::OK);
        assert!(matches!(body, CreateUserResponse::Existing { .. }));

        let storage = state.storage();
        let repo = UserRepository::new(&storage);
        assert_eq!(repo.list_all().expect("list").len(), 1);
    }

    #[tokio::test]
    async fn set_user_role_refuses_and_leaves_target_unchanged() {
        let (state, _temp_dir) = test_state(None, None);
        let target = seed_user(&state, "other-admin@example.com", Role::Admin);

        let err = set_user_role(
            AdminOnly(requester("admin@example.com", Role::Admin)),
            State(state.clone()),
            Path(target.user_id.clone()),
            Json(SetRoleRequest {
                role: Role::Student,
            }),
        )
        .await
        .expect_err("equal rank should fail");
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let storage = state.storage();
        let repo = UserRepository::new(&storage);
        assert_eq!(repo.get(&target.user_id).expect("get").role, Role::Admin);
    }

    #[tokio::test]
    async fn set_user_role_updates_record() {
        let (state, _temp_dir) = test_state(None, None);
        let target = seed_user(&state, "student@example.com", Role::Student);

        let Json(response) = set_user_role(
            AdminOnly(requester("admin@example.com", Role::Admin)),
            State(state.clone()),
            Path(target.user_id.clone()),
            Json(SetRoleRequest {
                role: Role::Moderator,
            }),
        )
        .await
        .expect("role change should pass");
        assert_eq!(response.result.role, Role::Moderator);

        let storage = state.storage();
        let repo = UserRepository::new(&storage);
        assert_eq!(
            repo.get(&target.user_id).expect("get").role,
            Role::Moderator
        );
    }

    #[tokio::test]
    async fn delete_user_refuses_bootstrap_identity() {
        let (state, _temp_dir) = test_state(Some("admin@example.com"), None);
        let target = seed_user(&state, "admin@example.com", Role::Admin);

        let err = delete_user(
            AdminOnly(requester("root@example.com", Role::SuperAdmin)),
            State(state.clone()),
            Path(target.user_id.clone()),
        )
        .await
        .expect_err("bootstrap delete should fail");
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn get_role_defaults_to_student() {
        let (state, _temp_dir) = test_state(None, None);
        let Json(response) = get_role(
            State(state.clone()),
            Path("nobody@example.com".to_string()),
        )
        .await;
        assert_eq!(response.role, Role::Student);

        seed_user(&state, "mod@example.com", Role::Moderator);
        let Json(response) =
            get_role(State(state), Path("mod@example.com".to_string())).await;
        assert_eq!(response.role, Role::Moderator);
    }
}
