// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ScholarStream

//! Repository layer providing typed access to document storage.
//!
//! Each repository provides CRUD operations for a specific collection,
//! using the DocumentStorage for all file operations.

pub mod applications;
pub mod payments;
pub mod reviews;
pub mod scholarships;
pub mod users;

pub use applications::{
    ApplicationRepository, ApplicationStatus, PaymentStatus, StoredApplication,
};
pub use payments::{PaymentRepository, StoredPayment};
pub use reviews::{ReviewRepository, StoredReview};
pub use scholarships::{
    ScholarshipPage, ScholarshipQuery, ScholarshipRepository, SortOrder, StoredScholarship,
    DEFAULT_PAGE_SIZE,
};
pub use users::{StoredUser, UserRepository};
