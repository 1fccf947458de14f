// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ScholarStream

//! Path constants and utilities for the document storage layout.

use std::path::{Path, PathBuf};

/// Storage path utilities for the document store.
///
/// Each collection is a directory; each document is a `{id}.json` file whose
/// stem is the document identifier.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all stored documents.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== User Paths ==========

    /// Directory containing all users.
    pub fn users_dir(&self) -> PathBuf {
        self.root.join("users")
    }

    /// Path to a specific user document.
    pub fn user(&self, user_id: &str) -> PathBuf {
        self.users_dir().join(format!("{user_id}.json"))
    }

    // ========== Scholarship Paths ==========

    /// Directory containing all scholarships.
    pub fn scholarships_dir(&self) -> PathBuf {
        self.root.join("scholarships")
    }

    /// Path to a specific scholarship document.
    pub fn scholarship(&self, scholarship_id: &str) -> PathBuf {
        self.scholarships_dir().join(format!("{scholarship_id}.json"))
    }

    // ========== Review Paths ==========

    /// Directory containing all reviews.
    pub fn reviews_dir(&self) -> PathBuf {
        self.root.join("reviews")
    }

    /// Path to a specific review document.
    pub fn review(&self, review_id: &str) -> PathBuf {
        self.reviews_dir().join(format!("{review_id}.json"))
    }

    // ========== Application Paths ==========

    /// Directory containing all applications.
    pub fn applications_dir(&self) -> PathBuf {
        self.root.join("applications")
    }

    /// Path to a specific application document.
    pub fn application(&self, application_id: &str) -> PathBuf {
        self.applications_dir().join(format!("{application_id}.json"))
    }

    // ========== Payment Paths ==========

    /// Directory containing the payment ledger.
    pub fn payments_dir(&self) -> PathBuf {
        self.root.join("payments")
    }

    /// Path to a ledger entry, keyed by the processor transaction id.
    pub fn payment(&self, transaction_id: &str) -> PathBuf {
        self.payments_dir().join(format!("{transaction_id}.json"))
    }
}
