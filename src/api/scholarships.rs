// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ScholarStream

//! Scholarship catalog endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    auth::Auth,
    error::ApiError,
    state::AppState,
    storage::{ScholarshipQuery, ScholarshipRepository, SortOrder, StoredScholarship},
};

/// Accepts a JSON number or a numeric string; used for the fee/rank fields
/// that clients historically sent as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn coerce_numeric(raw: Option<NumberOrText>) -> Result<f64, String> {
    match raw {
        None => Ok(0.0),
        Some(NumberOrText::Number(n)) => Ok(n),
        Some(NumberOrText::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(0.0)
            } else {
                trimmed
                    .parse::<f64>()
                    .map_err(|_| format!("`{s}` is not a number"))
            }
        }
    }
}

/// Coerce number-or-string to f64, defaulting to 0 when absent or null.
pub(crate) fn de_numeric<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrText>::deserialize(deserializer)?;
    coerce_numeric(raw).map_err(serde::de::Error::custom)
}

/// Coerce number-or-string to f64, keeping "absent" distinct for partial
/// updates.
fn de_numeric_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrText>::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        some => coerce_numeric(some).map(Some).map_err(serde::de::Error::custom),
    }
}

/// Request body for POST /scholarships.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateScholarshipRequest {
    /// Scholarship display name.
    pub scholarship_name: String,
    /// Offering university.
    pub university_name: String,
    /// University country.
    #[serde(default)]
    pub university_country: String,
    /// University city.
    #[serde(default)]
    pub university_city: String,
    /// Degree level.
    #[serde(default)]
    pub degree: String,
    /// Scholarship category.
    #[serde(default)]
    pub scholarship_category: String,
    /// Subject category.
    #[serde(default)]
    pub subject_category: String,
    /// Tuition fee; number or numeric string, 0 when absent.
    #[serde(default, deserialize_with = "de_numeric")]
    pub tuition_fee: f64,
    /// Application fee; number or numeric string, 0 when absent.
    #[serde(default, deserialize_with = "de_numeric")]
    pub application_fee: f64,
    /// Service charge; number or numeric string, 0 when absent.
    #[serde(default, deserialize_with = "de_numeric")]
    pub service_charge: f64,
    /// World rank; number or numeric string, 0 when absent.
    #[serde(default, deserialize_with = "de_numeric")]
    pub world_rank: f64,
    /// Application deadline.
    #[serde(default)]
    pub application_deadline: Option<DateTime<Utc>>,
    /// Poster email; defaults to the authenticated caller.
    #[serde(default)]
    pub posted_by: Option<String>,
}

/// Request body for PATCH /scholarships/{id} (partial merge).
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateScholarshipRequest {
    #[serde(default)]
    pub scholarship_name: Option<String>,
    #[serde(default)]
    pub university_name: Option<String>,
    #[serde(default)]
    pub university_country: Option<String>,
    #[serde(default)]
    pub university_city: Option<String>,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub scholarship_category: Option<String>,
    #[serde(default)]
    pub subject_category: Option<String>,
    #[serde(default, deserialize_with = "de_numeric_opt")]
    pub tuition_fee: Option<f64>,
    #[serde(default, deserialize_with = "de_numeric_opt")]
    pub application_fee: Option<f64>,
    #[serde(default, deserialize_with = "de_numeric_opt")]
    pub service_charge: Option<f64>,
    #[serde(default, deserialize_with = "de_numeric_opt")]
    pub world_rank: Option<f64>,
    #[serde(default)]
    pub application_deadline: Option<DateTime<Utc>>,
}

/// Scholarship record returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScholarshipResponse {
    pub scholarship_id: String,
    pub scholarship_name: String,
    pub university_name: String,
    pub university_country: String,
    pub university_city: String,
    pub degree: String,
    pub scholarship_category: String,
    pub subject_category: String,
    pub tuition_fee: f64,
    pub application_fee: f64,
    pub service_charge: f64,
    pub world_rank: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_deadline: Option<String>,
    pub posted_by: String,
    pub posted_at: String,
}

/// Query params for GET /scholarships.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ScholarshipListQuery {
    /// Free-text search across name, university and degree.
    pub search: Option<String>,
    /// Exact scholarship category filter.
    pub scholarship_category: Option<String>,
    /// Exact subject category filter.
    pub subject_category: Option<String>,
    /// Exact location (university country) filter.
    pub location: Option<String>,
    /// Sort order: `fee_asc`, `fee_desc` or `newest`.
    pub sort: Option<String>,
    /// 1-indexed page.
    pub page: Option<usize>,
    /// Page size (default 9).
    pub limit: Option<usize>,
}

/// List response for GET /scholarships.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScholarshipListResponse {
    /// Filtered count before pagination.
    pub total: usize,
    /// The requested page.
    pub result: Vec<ScholarshipResponse>,
}

/// Simple message response.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

fn to_response(record: &StoredScholarship) -> ScholarshipResponse {
    ScholarshipResponse {
        scholarship_id: record.scholarship_id.clone(),
        scholarship_name: record.scholarship_name.clone(),
        university_name: record.university_name.clone(),
        university_country: record.university_country.clone(),
        university_city: record.university_city.clone(),
        degree: record.degree.clone(),
        scholarship_category: record.scholarship_category.clone(),
        subject_category: record.subject_category.clone(),
        tuition_fee: record.tuition_fee,
        application_fee: record.application_fee,
        service_charge: record.service_charge,
        world_rank: record.world_rank,
        application_deadline: record.application_deadline.map(|d| d.to_rfc3339()),
        posted_by: record.posted_by.clone(),
        posted_at: record.posted_at.to_rfc3339(),
    }
}

/// Search the catalog with filters, sorting and pagination.
#[utoipa::path(
    get,
    path = "/scholarships",
    tag = "Scholarships",
    params(ScholarshipListQuery),
    responses(
        (status = 200, description = "Catalog page", body = ScholarshipListResponse)
    )
)]
pub async fn search_scholarships(
    State(state): State<AppState>,
    Query(query): Query<ScholarshipListQuery>,
) -> Result<Json<ScholarshipListResponse>, ApiError> {
    let storage = state.storage();
    let repo = ScholarshipRepository::new(&storage);

    let page = repo
        .search(&ScholarshipQuery {
            search: query.search,
            scholarship_category: query.scholarship_category,
            subject_category: query.subject_category,
            location: query.location,
            sort: SortOrder::from_query(query.sort.as_deref()),
            page: query.page.unwrap_or(1),
            limit: query.limit.unwrap_or(crate::storage::DEFAULT_PAGE_SIZE),
        })
        .map_err(|e| ApiError::internal(format!("Failed to search scholarships: {e}")))?;

    Ok(Json(ScholarshipListResponse {
        total: page.total,
        result: page.items.iter().map(to_response).collect(),
    }))
}

/// Get one scholarship by id.
#[utoipa::path(
    get,
    path = "/scholarships/{id}",
    tag = "Scholarships",
    params(
        ("id" = String, Path, description = "Scholarship ID")
    ),
    responses(
        (status = 200, description = "Scholarship", body = ScholarshipResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_scholarship(
    State(state): State<AppState>,
    Path(scholarship_id): Path<String>,
) -> Result<Json<ScholarshipResponse>, ApiError> {
    let storage = state.storage();
    let repo = ScholarshipRepository::new(&storage);
    let record = repo
        .get(&scholarship_id)
        .map_err(|_| ApiError::not_found("Scholarship not found"))?;
    Ok(Json(to_response(&record)))
}

/// Post a new scholarship.
#[utoipa::path(
    post,
    path = "/scholarships",
    tag = "Scholarships",
    request_body = CreateScholarshipRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Scholarship created", body = ScholarshipResponse),
        (status = 400, description = "Missing required field"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_scholarship(
    Auth(claims): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateScholarshipRequest>,
) -> Result<(StatusCode, Json<ScholarshipResponse>), ApiError> {
    if request.scholarship_name.trim().is_empty() {
        return Err(ApiError::bad_request("scholarshipName is required"));
    }
    if request.university_name.trim().is_empty() {
        return Err(ApiError::bad_request("universityName is required"));
    }

    let record = StoredScholarship {
        scholarship_id: Uuid::new_v4().to_string(),
        scholarship_name: request.scholarship_name,
        university_name: request.university_name,
        university_country: request.university_country,
        university_city: request.university_city,
        degree: request.degree,
        scholarship_category: request.scholarship_category,
        subject_category: request.subject_category,
        tuition_fee: request.tuition_fee,
        application_fee: request.application_fee,
        service_charge: request.service_charge,
        world_rank: request.world_rank,
        application_deadline: request.application_deadline,
        posted_by: request
            .posted_by
            .unwrap_or_else(|| claims.email().to_string()),
        posted_at: Utc::now(),
    };

    let storage = state.storage();
    let repo = ScholarshipRepository::new(&storage);
    repo.create(&record)
        .map_err(|e| ApiError::internal(format!("Failed to store scholarship: {e}")))?;

    Ok((StatusCode::CREATED, Json(to_response(&record))))
}

/// Partially update a scholarship.
#[utoipa::path(
    patch,
    path = "/scholarships/{id}",
    tag = "Scholarships",
    params(
        ("id" = String, Path, description = "Scholarship ID")
    ),
    request_body = UpdateScholarshipRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Scholarship updated", body = ScholarshipResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_scholarship(
    Auth(_claims): Auth,
    State(state): State<AppState>,
    Path(scholarship_id): Path<String>,
    Json(request): Json<UpdateScholarshipRequest>,
) -> Result<Json<ScholarshipResponse>, ApiError> {
    let storage = state.storage();
    let repo = ScholarshipRepository::new(&storage);

    let mut record = repo
        .get(&scholarship_id)
        .map_err(|_| ApiError::not_found("Scholarship not found"))?;

    if let Some(value) = request.scholarship_name {
        record.scholarship_name = value;
    }
    if let Some(value) = request.university_name {
        record.university_name = value;
    }
    if let Some(value) = request.university_country {
        record.university_country = value;
    }
    if let Some(value) = request.university_city {
        record.university_city = value;
    }
    if let Some(value) = request.degree {
        record.degree = value;
    }
    if let Some(value) = request.scholarship_category {
        record.scholarship_category = value;
    }
    if let Some(value) = request.subject_category {
        record.subject_category = value;
    }
    if let Some(value) = request.tuition_fee {
        record.tuition_fee = value;
    }
    if let Some(value) = request.application_fee {
        record.application_fee = value;
    }
    if let Some(value) = request.service_charge {
        record.service_charge = value;
    }
    if let Some(value) = request.world_rank {
        record.world_rank = value;
    }
    if let Some(value) = request.application_deadline {
        record.application_deadline = Some(value);
    }

    repo.update(&record)
        .map_err(|e| ApiError::internal(format!("Failed to update scholarship: {e}")))?;

    Ok(Json(to_response(&record)))
}

/// Delete a scholarship.
#[utoipa::path(
    delete,
    path = "/scholarships/{id}",
    tag = "Scholarships",
    params(
        ("id" = String, Path, description = "Scholarship ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Scholarship deleted", body = MessageResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_scholarship(
    Auth(_claims): Auth,
    State(state): State<AppState>,
    Path(scholarship_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let storage = state.storage();
    let repo = ScholarshipRepository::new(&storage);
    repo.delete(&scholarship_id)
        .map_err(|_| ApiError::not_found("Scholarship not found"))?;

    Ok(Json(MessageResponse {
        message: "Scholarship deleted".to_string(),
    }))
}
