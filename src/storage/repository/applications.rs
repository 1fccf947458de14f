// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ScholarStream

//! Scholarship application repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DocumentStorage, StorageError, StorageResult};

/// Application review lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    /// Submitted, fee not yet paid.
    Submitted,
    /// Fee paid, waiting for moderator review.
    Pending,
    /// Accepted by a moderator.
    Accepted,
    /// Rejected by a moderator.
    Rejected,
}

/// Application fee payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Fee not paid.
    Unpaid,
    /// Fee settled through a verified checkout session.
    Paid,
}

/// Persisted application record.
///
/// `payment_status` moves only unpaid -> paid, and only through the payment
/// confirmation workflow.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoredApplication {
    /// Unique application identifier.
    pub application_id: String,
    /// Applicant email.
    pub applicant_email: String,
    /// Applied-for scholarship.
    pub scholarship_id: String,
    /// Review lifecycle status.
    pub application_status: ApplicationStatus,
    /// Fee payment status.
    pub payment_status: PaymentStatus,
    /// Moderator feedback, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl StoredApplication {
    /// Construct a freshly submitted, unpaid application.
    pub fn new_submitted(
        application_id: String,
        applicant_email: String,
        scholarship_id: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            application_id,
            applicant_email,
            scholarship_id,
            application_status: ApplicationStatus::Submitted,
            payment_status: PaymentStatus::Unpaid,
            feedback: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Repository for application storage.
pub struct ApplicationRepository<'a> {
    storage: &'a DocumentStorage,
}

impl<'a> ApplicationRepository<'a> {
    /// Create repository.
    pub fn new(storage: &'a DocumentStorage) -> Self {
        Self { storage }
    }

    /// Check if an application exists.
    pub fn exists(&self, application_id: &str) -> bool {
        self.storage
            .exists(self.storage.paths().application(application_id))
    }

    /// Get application by ID.
    pub fn get(&self, application_id: &str) -> StorageResult<StoredApplication> {
        let path = self.storage.paths().application(application_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!(
                "Application {application_id}"
            )));
        }
        self.storage.read_json(path)
    }

    /// Persist new application.
    pub fn create(&self, application: &StoredApplication) -> StorageResult<()> {
        if self.exists(&application.application_id) {
            return Err(StorageError::AlreadyExists(format!(
                "Application {}",
                application.application_id
            )));
        }
        self.storage.write_json(
            self.storage.paths().application(&application.application_id),
            application,
        )
    }

    /// Update existing application.
    pub fn update(&self, application: &StoredApplication) -> StorageResult<()> {
        if !self.exists(&application.application_id) {
            return Err(StorageError::NotFound(format!(
                "Application {}",
                application.application_id
            )));
        }
        self.storage.write_json(
            self.storage.paths().application(&application.application_id),
            application,
        )
    }

    /// Delete an application by ID.
    pub fn delete(&self, application_id: &str) -> StorageResult<()> {
        let path = self.storage.paths().application(application_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!(
                "Application {application_id}"
            )));
        }
        self.storage.delete(path)
    }

    /// List all applications, newest first.
    pub fn list_all(&self) -> StorageResult<Vec<StoredApplication>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().applications_dir(), "json")?;

        let mut applications = Vec::new();
        for id in ids {
            if let Ok(record) = self.get(&id) {
                applications.push(record);
            }
        }

        applications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(applications)
    }

    /// List every application submitted by one applicant, newest first.
    pub fn list_by_applicant(&self, email: &str) -> StorageResult<Vec<StoredApplication>> {
        let all = self.list_all()?;
        Ok(all
            .into_iter()
            .filter(|record| record.applicant_email.eq_ignore_ascii_case(email))
            .collect())
    }
}
