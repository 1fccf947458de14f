// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ScholarStream

//! Review endpoints.
//!
//! Anyone may read reviews; creating one requires authentication, and the
//! author's email is taken from the verified claims rather than the body.
//! Editing and deleting are restricted to the review's author or an Admin.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    auth::{extractor::role_for_email, Auth, Role, TokenClaims},
    error::ApiError,
    state::AppState,
    storage::{ReviewRepository, StoredReview},
};

/// Request body for POST /reviews.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateReviewRequest {
    /// Reviewed scholarship id.
    pub scholarship_id: String,
    /// University name snapshot for display.
    #[serde(default)]
    pub university_name: Option<String>,
    /// Author display name.
    #[serde(default)]
    pub reviewer_name: Option<String>,
    /// Rating, typically 1-5.
    #[serde(default)]
    pub rating: f64,
    /// Free-form comment.
    #[serde(default)]
    pub comment: String,
}

/// Request body for PATCH /reviews/{id} (partial merge).
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateReviewRequest {
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Review record returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub review_id: String,
    pub scholarship_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university_name: Option<String>,
    pub reviewer_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_name: Option<String>,
    pub rating: f64,
    pub comment: String,
    pub created_at: String,
    pub updated_at: String,
}

/// List response for review queries.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewListResponse {
    pub reviews: Vec<ReviewResponse>,
    pub total: usize,
}

/// Simple message response.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

fn to_response(record: &StoredReview) -> ReviewResponse {
    ReviewResponse {
        review_id: record.review_id.clone(),
        scholarship_id: record.scholarship_id.clone(),
        university_name: record.university_name.clone(),
        reviewer_email: record.reviewer_email.clone(),
        reviewer_name: record.reviewer_name.clone(),
        rating: record.rating,
        comment: record.comment.clone(),
        created_at: record.created_at.to_rfc3339(),
        updated_at: record.updated_at.to_rfc3339(),
    }
}

/// Author-or-Admin check for review mutation.
fn ensure_author_or_admin(
    state: &AppState,
    claims: &TokenClaims,
    record: &StoredReview,
) -> Result<(), ApiError> {
    if record
        .reviewer_email
        .eq_ignore_ascii_case(claims.email())
    {
        return Ok(());
    }
    if role_for_email(state, claims.email()).has_privilege(Role::Admin) {
        return Ok(());
    }
    Err(ApiError::forbidden(
        "Only the review's author or an admin may modify it",
    ))
}

/// Create a review.
#[utoipa::path(
    post,
    path = "/reviews",
    tag = "Reviews",
    request_body = CreateReviewRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Missing required field"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_review(
    Auth(claims): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), ApiError> {
    if request.scholarship_id.trim().is_empty() {
        return Err(ApiError::bad_request("scholarshipId is required"));
    }

    let now = Utc::now();
    let record = StoredReview {
        review_id: Uuid::new_v4().to_string(),
        scholarship_id: request.scholarship_id,
        university_name: request.university_name,
        reviewer_email: claims.email().to_string(),
        reviewer_name: request.reviewer_name,
        rating: request.rating,
        comment: request.comment,
        created_at: now,
        updated_at: now,
    };

    let storage = state.storage();
    let repo = ReviewRepository::new(&storage);
    repo.create(&record)
        .map_err(|e| ApiError::internal(format!("Failed to store review: {e}")))?;

    Ok((StatusCode::CREATED, Json(to_response(&record))))
}

/// List all reviews.
#[utoipa::path(
    get,
    path = "/reviews",
    tag = "Reviews",
    responses(
        (status = 200, description = "All reviews", body = ReviewListResponse)
    )
)]
pub async fn list_reviews(
    State(state): State<AppState>,
) -> Result<Json<ReviewListResponse>, ApiError> {
    let storage = state.storage();
    let repo = ReviewRepository::new(&storage);

    let reviews = repo
        .list_all()
        .map_err(|e| ApiError::internal(format!("Failed to list reviews: {e}")))?;
    let mapped: Vec<ReviewResponse> = reviews.iter().map(to_response).collect();

    Ok(Json(ReviewListResponse {
        total: mapped.len(),
        reviews: mapped,
    }))
}

/// List the reviews for one scholarship.
#[utoipa::path(
    get,
    path = "/reviews/{scholarship_id}",
    tag = "Reviews",
    params(
        ("scholarship_id" = String, Path, description = "Scholarship ID")
    ),
    responses(
        (status = 200, description = "Reviews for the scholarship", body = ReviewListResponse)
    )
)]
pub async fn list_reviews_for_scholarship(
    State(state): State<AppState>,
    Path(scholarship_id): Path<String>,
) -> Result<Json<ReviewListResponse>, ApiError> {
    let storage = state.storage();
    let repo = ReviewRepository::new(&storage);

    let reviews = repo
        .list_by_scholarship(&scholarship_id)
        .map_err(|e| ApiError::internal(format!("Failed to list reviews: {e}")))?;
    let mapped: Vec<ReviewResponse> = reviews.iter().map(to_response).collect();

    Ok(Json(ReviewListResponse {
        total: mapped.len(),
        reviews: mapped,
    }))
}

/// Partially update a review (author or admin).
#[utoipa::path(
    patch,
    path = "/reviews/{id}",
    tag = "Reviews",
    params(
        ("id" = String, Path, description = "Review ID")
    ),
    request_body = UpdateReviewRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Review updated", body = ReviewResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the author or an admin"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_review(
    Auth(claims): Auth,
    State(state): State<AppState>,
    Path(review_id): Path<String>,
    Json(request): Json<UpdateReviewRequest>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let storage = state.storage();
    let repo = ReviewRepository::new(&storage);

    let mut record = repo
        .get(&review_id)
        .map_err(|_| ApiError::not_found("Review not found"))?;

    ensure_author_or_admin(&state, &claims, &record)?;

    if let Some(rating) = request.rating {
        record.rating = rating;
    }
    if let Some(comment) = request.comment {
        record.comment = comment;
    }
    record.updated_at = Utc::now();

    repo.update(&record)
        .map_err(|e| ApiError::internal(format!("Failed to update review: {e}")))?;

    Ok(Json(to_response(&record)))
}

/// Delete a review (author or admin).
#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    tag = "Reviews",
    params(
        ("id" = String, Path, description = "Review ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Review deleted", body = MessageResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the author or an admin"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_review(
    Auth(claims): Auth,
    State(state): State<AppState>,
    Path(review_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let storage = state.storage();
    let repo = ReviewRepository::new(&storage);

    let record = repo
        .get(&review_id)
        .map_err(|_| ApiError::not_found("Review not found"))?;

    ensure_author_or_admin(&state, &claims, &record)?;

    repo.delete(&review_id)
        .map_err(|e| ApiError::internal(format!("Failed to delete review: {e}")))?;

    Ok(Json(MessageResponse {
        message: "Review deleted".to_string(),
    }))
}
