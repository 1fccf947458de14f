// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ScholarStream

//! Scholarship catalog repository: CRUD plus filtered, sorted, paginated
//! search.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::super::{DocumentStorage, StorageError, StorageResult};

/// Default page size for catalog search.
pub const DEFAULT_PAGE_SIZE: usize = 9;

/// Persisted scholarship record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoredScholarship {
    /// Unique scholarship identifier.
    pub scholarship_id: String,
    /// Scholarship display name.
    pub scholarship_name: String,
    /// Offering university.
    pub university_name: String,
    /// University country (the catalog's location filter).
    pub university_country: String,
    /// University city.
    pub university_city: String,
    /// Degree level (e.g. "Bachelor", "Masters").
    pub degree: String,
    /// Scholarship category (e.g. "Full fund").
    pub scholarship_category: String,
    /// Subject category (e.g. "Engineering").
    pub subject_category: String,
    /// Tuition fee, 0 when not published.
    pub tuition_fee: f64,
    /// Application fee charged through checkout.
    pub application_fee: f64,
    /// Service charge added to the application fee.
    pub service_charge: f64,
    /// University world rank, 0 when unknown.
    pub world_rank: f64,
    /// Application deadline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_deadline: Option<DateTime<Utc>>,
    /// Email of the posting user.
    pub posted_by: String,
    /// When the scholarship was posted.
    pub posted_at: DateTime<Utc>,
}

/// Catalog sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending application fee.
    FeeAsc,
    /// Descending application fee.
    FeeDesc,
    /// Most recently posted first.
    Newest,
    /// Insertion (post) order.
    Unsorted,
}

impl SortOrder {
    /// Parse the query-string sort value. Unknown values keep insertion order.
    pub fn from_query(raw: Option<&str>) -> SortOrder {
        match raw.map(str::trim) {
            Some("fee_asc") => SortOrder::FeeAsc,
            Some("fee_desc") => SortOrder::FeeDesc,
            Some("newest") => SortOrder::Newest,
            _ => SortOrder::Unsorted,
        }
    }
}

/// Catalog search parameters.
#[derive(Debug, Clone)]
pub struct ScholarshipQuery {
    /// Case-insensitive substring matched against scholarship name,
    /// university name, or degree.
    pub search: Option<String>,
    /// Exact scholarship category filter.
    pub scholarship_category: Option<String>,
    /// Exact subject category filter.
    pub subject_category: Option<String>,
    /// Exact location (university country) filter.
    pub location: Option<String>,
    /// Sort order.
    pub sort: SortOrder,
    /// 1-indexed page.
    pub page: usize,
    /// Page size.
    pub limit: usize,
}

impl Default for ScholarshipQuery {
    fn default() -> Self {
        Self {
            search: None,
            scholarship_category: None,
            subject_category: None,
            location: None,
            sort: SortOrder::Unsorted,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of catalog results.
#[derive(Debug, Clone)]
pub struct ScholarshipPage {
    /// Count of the filtered set before pagination.
    pub total: usize,
    /// The requested page of records.
    pub items: Vec<StoredScholarship>,
}

fn matches_query(query: &ScholarshipQuery, record: &StoredScholarship) -> bool {
    if let Some(category) = query.scholarship_category.as_deref() {
        if record.scholarship_category != category {
            return false;
        }
    }
    if let Some(subject) = query.subject_category.as_deref() {
        if record.subject_category != subject {
            return false;
        }
    }
    if let Some(location) = query.location.as_deref() {
        if record.university_country != location {
            return false;
        }
    }
    if let Some(search) = query.search.as_deref() {
        let needle = search.to_lowercase();
        if !needle.is_empty() {
            let matched = record.scholarship_name.to_lowercase().contains(&needle)
                || record.university_name.to_lowercase().contains(&needle)
                || record.degree.to_lowercase().contains(&needle);
            if !matched {
                return false;
            }
        }
    }
    true
}

/// Repository for scholarship storage.
pub struct ScholarshipRepository<'a> {
    storage: &'a DocumentStorage,
}

impl<'a> ScholarshipRepository<'a> {
    /// Create repository.
    pub fn new(storage: &'a DocumentStorage) -> Self {
        Self { storage }
    }

    /// Check if a scholarship exists.
    pub fn exists(&self, scholarship_id: &str) -> bool {
        self.storage
            .exists(self.storage.paths().scholarship(scholarship_id))
    }

    /// Get scholarship by ID.
    ///
    /// Tries the canonical uuid form of the id first, then the raw string,
    /// so both `GET /scholarships/<uuid>` and legacy string ids resolve.
    pub fn get(&self, scholarship_id: &str) -> StorageResult<StoredScholarship> {
        if let Ok(parsed) = Uuid::parse_str(scholarship_id) {
            let canonical = self.storage.paths().scholarship(&parsed.to_string());
            if self.storage.exists(&canonical) {
                return self.storage.read_json(canonical);
            }
        }

        let raw = self.storage.paths().scholarship(scholarship_id);
        if !self.storage.exists(&raw) {
            return Err(StorageError::NotFound(format!(
                "Scholarship {scholarship_id}"
            )));
        }
        self.storage.read_json(raw)
    }

    /// Persist new scholarship.
    pub fn create(&self, record: &StoredScholarship) -> StorageResult<()> {
        if self.exists(&record.scholarship_id) {
            return Err(StorageError::AlreadyExists(format!(
                "Scholarship {}",
                record.scholarship_id
            )));
        }
        self.storage.write_json(
            self.storage.paths().scholarship(&record.scholarship_id),
            record,
        )
    }

    /// Update existing scholarship.
    pub fn update(&self, record: &StoredScholarship) -> StorageResult<()> {
        if !self.exists(&record.scholarship_id) {
            return Err(StorageError::NotFound(format!(
                "Scholarship {}",
                record.scholarship_id
            )));
        }
        self.storage.write_json(
            self.storage.paths().scholarship(&record.scholarship_id),
            record,
        )
    }

    /// Delete a scholarship by ID.
    pub fn delete(&self, scholarship_id: &str) -> StorageResult<()> {
        let path = self.storage.paths().scholarship(scholarship_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!(
                "Scholarship {scholarship_id}"
            )));
        }
        self.storage.delete(path)
    }

    /// List every scholarship in post order.
    pub fn list_all(&self) -> StorageResult<Vec<StoredScholarship>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().scholarships_dir(), "json")?;

        let mut records = Vec::new();
        for id in ids {
            if let Ok(record) = self.get(&id) {
                records.push(record);
            }
        }

        // Directory listing order is arbitrary; post order is the baseline.
        records.sort_by(|a, b| a.posted_at.cmp(&b.posted_at));
        Ok(records)
    }

    /// Filtered, sorted, paginated catalog search.
    ///
    /// `total` counts the filtered set before pagination.
    pub fn search(&self, query: &ScholarshipQuery) -> StorageResult<ScholarshipPage> {
        let mut records: Vec<StoredScholarship> = self
            .list_all()?
            .into_iter()
            .filter(|record| matches_query(query, record))
            .collect();

        match query.sort {
            SortOrder::FeeAsc => records.sort_by(|a, b| {
                a.application_fee
                    .partial_cmp(&b.application_fee)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            SortOrder::FeeDesc => records.sort_by(|a, b| {
                b.application_fee
                    .partial_cmp(&a.application_fee)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            SortOrder::Newest => records.sort_by(|a, b| b.posted_at.cmp(&a.posted_at)),
            SortOrder::Unsorted => {}
        }

        let total = records.len();
        let page = query.page.max(1);
        let limit = if query.limit == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            query.limit
        };
        let items = records
            .into_iter()
            .skip((page - 1) * limit)
            .take(limit)
            .collect();

        Ok(ScholarshipPage { total, items })
    }
}
