// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ScholarStream

//! User account repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;

use super::super::{DocumentStorage, StorageError, StorageResult};

/// Persisted user account.
///
/// Created on first sign-in; the email is the unique identity, the role
/// governs what the account may do.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoredUser {
    /// Unique user identifier.
    pub user_id: String,
    /// Sign-in email (unique across the collection).
    pub email: String,
    /// Display name.
    pub name: String,
    /// Optional avatar reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Authorization role.
    pub role: Role,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl StoredUser {
    /// Construct a new user record.
    pub fn new(
        user_id: String,
        email: String,
        name: String,
        photo_url: Option<String>,
        role: Role,
    ) -> Self {
        Self {
            user_id,
            email,
            name,
            photo_url,
            role,
            created_at: Utc::now(),
        }
    }
}

/// Repository for user storage.
pub struct UserRepository<'a> {
    storage: &'a DocumentStorage,
}

impl<'a> UserRepository<'a> {
    /// Create repository.
    pub fn new(storage: &'a DocumentStorage) -> Self {
        Self { storage }
    }

    /// Check if a user exists.
    pub fn exists(&self, user_id: &str) -> bool {
        self.storage.exists(self.storage.paths().user(user_id))
    }

    /// Get user by ID.
    pub fn get(&self, user_id: &str) -> StorageResult<StoredUser> {
        let path = self.storage.paths().user(user_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("User {user_id}")));
        }
        self.storage.read_json(path)
    }

    /// Find a user by email, if one exists.
    pub fn find_by_email(&self, email: &str) -> StorageResult<Option<StoredUser>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().users_dir(), "json")?;

        for id in ids {
            if let Ok(record) = self.get(&id) {
                if record.email.eq_ignore_ascii_case(email) {
                    return Ok(Some(record));
                }
            }
        }
        Ok(None)
    }

    /// Persist new user.
    pub fn create(&self, user: &StoredUser) -> StorageResult<()> {
        if self.exists(&user.user_id) {
            return Err(StorageError::AlreadyExists(format!(
                "User {}",
                user.user_id
            )));
        }
        self.storage
            .write_json(self.storage.paths().user(&user.user_id), user)
    }

    /// Update existing user.
    pub fn update(&self, user: &StoredUser) -> StorageResult<()> {
        if !self.exists(&user.user_id) {
            return Err(StorageError::NotFound(format!("User {}", user.user_id)));
        }
        self.storage
            .write_json(self.storage.paths().user(&user.user_id), user)
    }

    /// Delete a user by ID.
    pub fn delete(&self, user_id: &str) -> StorageResult<()> {
        let path = self.storage.paths().user(user_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("User {user_id}")));
        }
        self.storage.delete(path)
    }

    /// List all users, newest first.
    pub fn list_all(&self) -> StorageResult<Vec<StoredUser>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().users_dir(), "json")?;

        let mut users = Vec::new();
        for id in ids {
            if let Ok(record) = self.get(&id) {
                users.push(record);
            }
        }

        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use std::env;
    use std::fs;

    fn test_storage() -> DocumentStorage {
        let test_dir = env::temp_dir().join(format!("test-user-repo-{}", uuid::Uuid::new_v4()));
        let paths = StoragePaths::new(&test_dir);
        let mut storage = DocumentStorage::new(paths);
        storage.initialize().expect("initialize test storage");
        storage
    }

    fn cleanup(storage: &DocumentStorage) {
        let _ = fs::remove_dir_all(storage.paths().root());
    }

    fn sample_user(id: &str, email: &str, role: Role) -> StoredUser {
        StoredUser::new(
            id.to_string(),
            email.to_string(),
            "Test User".to_string(),
            None,
            role,
        )
    }

    #[test]
    fn create_and_get_user() {
        let storage = test_storage();
        let repo = UserRepository::new(&storage);
        let user = sample_user("u-1", "student@example.com", Role::Student);

        repo.create(&user).expect("create user");
        let loaded = repo.get("u-1").expect("get user");
        assert_eq!(loaded.email, "student@example.com");
        assert_eq!(loaded.role, Role::Student);

        cleanup(&storage);
    }

    #[test]
    fn create_duplicate_id_fails() {
        let storage = test_storage();
        let repo = UserRepository::new(&storage);
        let user = sample_user("u-1", "student@example.com", Role::Student);

        repo.create(&user).expect("create user");
        let err = repo.create(&user).expect_err("duplicate should fail");
        assert!(matches!(err, StorageError::AlreadyExists(_)));

        cleanup(&storage);
    }

    #[test]
    fn find_by_email_is_case_insensitive() {
        let storage = test_storage();
        let repo = UserRepository::new(&storage);
        repo.create(&sample_user("u-1", "Admin@Example.com", Role::Admin))
            .expect("create user");

        let found = repo
            .find_by_email("admin@example.com")
            .expect("lookup")
            .expect("user should exist");
        assert_eq!(found.user_id, "u-1");

        let missing = repo.find_by_email("nobody@example.com").expect("lookup");
        assert!(missing.is_none());

        cleanup(&storage);
    }

    #[test]
    fn update_replaces_role() {
        let storage = test_storage();
        let repo = UserRepository::new(&storage);
        let mut user = sample_user("u-1", "mod@example.com", Role::Student);
        repo.create(&user).expect("create user");

        user.role = Role::Moderator;
        repo.update(&user).expect("update user");

        let loaded = repo.get("u-1").expect("get user");
        assert_eq!(loaded.role, Role::Moderator);

        cleanup(&storage);
    }

    #[test]
    fn delete_missing_user_errors() {
        let storage = test_storage();
        let repo = UserRepository::new(&storage);
        let err = repo.delete("missing").expect_err("missing should fail");
        assert!(matches!(err, StorageError::NotFound(_)));
        cleanup(&storage);
    }
}
