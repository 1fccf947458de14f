// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ScholarStream

//! # Document Storage Module
//!
//! Filesystem-backed document store: each collection is a directory under
//! the data root, each document a JSON file named by its identifier.
//!
//! ## Storage Layout
//!
//! ```text
//! data/
//!   users/{user_id}.json
//!   scholarships/{scholarship_id}.json
//!   reviews/{review_id}.json
//!   applications/{application_id}.json
//!   payments/{transaction_id}.json   # ledger, keyed by processor txn id
//! ```
//!
//! Writes are atomic (temp file + rename), which gives per-document
//! last-write-wins semantics without any application-level locking.

pub mod document_fs;
pub mod paths;
pub mod repository;

pub use document_fs::{DocumentStorage, StorageError, StorageResult};
pub use paths::StoragePaths;
pub use repository::{
    ApplicationRepository, ApplicationStatus, PaymentRepository, PaymentStatus, ReviewRepository,
    ScholarshipPage, ScholarshipQuery, ScholarshipRepository, SortOrder, StoredApplication,
    StoredPayment, StoredReview, StoredScholarship, StoredUser, UserRepository, DEFAULT_PAGE_SIZE,
};
