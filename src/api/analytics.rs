// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ScholarStream

//! Admin analytics: on-demand aggregate counts over the collections.

use std::collections::{BTreeMap, HashMap};

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::AdminOnly,
    error::ApiError,
    state::AppState,
    storage::{
        ApplicationRepository, DocumentStorage, PaymentRepository, ScholarshipRepository,
        UserRepository,
    },
};

/// Bucket for applications lacking a resolvable scholarship category.
const UNKNOWN_CATEGORY: &str = "Unknown";

/// Application count for one scholarship category.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryCount {
    /// Scholarship category (or `Unknown`).
    pub category: String,
    /// Applications in this category.
    pub count: u64,
}

/// Aggregate summary response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    /// Registered users.
    pub total_users: usize,
    /// Cataloged scholarships.
    pub total_scholarships: usize,
    /// Sum of paid ledger entries, in major units.
    pub total_fees_collected: f64,
    /// Applications grouped by their scholarship's category.
    pub applications_per_category: Vec<CategoryCount>,
}

fn compute_summary(storage: &DocumentStorage) -> Result<AnalyticsResponse, ApiError> {
    let total_users = UserRepository::new(storage)
        .list_all()
        .map_err(|e| ApiError::internal(format!("Failed to count users: {e}")))?
        .len();

    let scholarships = ScholarshipRepository::new(storage)
        .list_all()
        .map_err(|e| ApiError::internal(format!("Failed to count scholarships: {e}")))?;

    let total_fees_collected = PaymentRepository::new(storage)
        .list_all()
        .map_err(|e| ApiError::internal(format!("Failed to sum payments: {e}")))?
        .iter()
        .filter(|payment| payment.status == "paid")
        .map(|payment| payment.amount)
        .sum();

    let category_by_scholarship: HashMap<&str, &str> = scholarships
        .iter()
        .map(|s| (s.scholarship_id.as_str(), s.scholarship_category.as_str()))
        .collect();

    let applications = ApplicationRepository::new(storage)
        .list_all()
        .map_err(|e| ApiError::internal(format!("Failed to group applications: {e}")))?;

    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for application in &applications {
        let category = category_by_scholarship
            .get(application.scholarship_id.as_str())
            .copied()
            .filter(|category| !category.is_empty())
            .unwrap_or(UNKNOWN_CATEGORY);
        *counts.entry(category.to_string()).or_insert(0) += 1;
    }

    Ok(AnalyticsResponse {
        total_users,
        total_scholarships: scholarships.len(),
        total_fees_collected,
        applications_per_category: counts
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect(),
    })
}

/// Aggregate platform summary. Admin only.
#[utoipa::path(
    get,
    path = "/analytics",
    tag = "Analytics",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Aggregate summary", body = AnalyticsResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)")
    )
)]
pub async fn get_analytics(
    AdminOnly(_user): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let storage = state.storage();
    Ok(Json(compute_summary(&storage)?))
}
