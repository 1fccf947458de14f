// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ScholarStream

//! Scholarship review repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DocumentStorage, StorageError, StorageResult};

/// Persisted review record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoredReview {
    /// Unique review identifier.
    pub review_id: String,
    /// Reviewed scholarship.
    pub scholarship_id: String,
    /// University name snapshot for display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university_name: Option<String>,
    /// Author email (matched against the caller's claims on edit/delete).
    pub reviewer_email: String,
    /// Author display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_name: Option<String>,
    /// Rating, typically 1-5.
    pub rating: f64,
    /// Free-form comment.
    pub comment: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Repository for review storage.
pub struct ReviewRepository<'a> {
    storage: &'a DocumentStorage,
}

impl<'a> ReviewRepository<'a> {
    /// Create repository.
    pub fn new(storage: &'a DocumentStorage) -> Self {
        Self { storage }
    }

    /// Check if a review exists.
    pub fn exists(&self, review_id: &str) -> bool {
        self.storage.exists(self.storage.paths().review(review_id))
    }

    /// Get review by ID.
    pub fn get(&self, review_id: &str) -> StorageResult<StoredReview> {
        let path = self.storage.paths().review(review_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Review {review_id}")));
        }
        self.storage.read_json(path)
    }

    /// Persist new review.
    pub fn create(&self, review: &StoredReview) -> StorageResult<()> {
        if self.exists(&review.review_id) {
            return Err(StorageError::AlreadyExists(format!(
                "Review {}",
                review.review_id
            )));
        }
        self.storage
            .write_json(self.storage.paths().review(&review.review_id), review)
    }

    /// Update existing review.
    pub fn update(&self, review: &StoredReview) -> StorageResult<()> {
        if !self.exists(&review.review_id) {
            return Err(StorageError::NotFound(format!(
                "Review {}",
                review.review_id
            )));
        }
        self.storage
            .write_json(self.storage.paths().review(&review.review_id), review)
    }

    /// Delete a review by ID.
    pub fn delete(&self, review_id: &str) -> StorageResult<()> {
        let path = self.storage.paths().review(review_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Review {review_id}")));
        }
        self.storage.delete(path)
    }

    /// List all reviews, newest first.
    pub fn list_all(&self) -> StorageResult<Vec<StoredReview>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().reviews_dir(), "json")?;

        let mut reviews = Vec::new();
        for id in ids {
            if let Ok(record) = self.get(&id) {
                reviews.push(record);
            }
        }

        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    /// List every review for one scholarship, newest first.
    pub fn list_by_scholarship(&self, scholarship_id: &str) -> StorageResult<Vec<StoredReview>> {
        let all = self.list_all()?;
        Ok(all
            .into_iter()
            .filter(|record| record.scholarship_id == scholarship_id)
            .collect())
    }
}
