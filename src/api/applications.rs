// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ScholarStream

//! Application endpoints.
//!
//! Applicants create and read their own applications; the moderator queue
//! sees all of them. Status and feedback are merged by moderators; the
//! payment status field is reserved to the payment confirmation workflow.

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
    auth::{extractor::role_for_email, Auth, ModeratorOnly, Role, TokenClaims},
    error::ApiError,
    state::AppState,
    storage::{ApplicationRepository, ApplicationStatus, StoredApplication},
};

/// Request body for POST /applications.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateApplicationRequest {
    /// The scholarship being applied for.
    pub scholarship_id: String,
}

/// Request body for PATCH /applications/{id} (moderator partial merge).
///
/// The payment status is deliberately absent: it moves only through the
/// payment confirmation workflow.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateApplicationRequest {
    #[serde(default)]
    pub application_status: Option<ApplicationStatus>,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// Application record returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub application_id: String,
    pub applicant_email: String,
    pub scholarship_id: String,
    pub application_status: ApplicationStatus,
    pub payment_status: crate::storage::PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// List response for application queries.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApplicationListResponse {
    pub applications: Vec<ApplicationResponse>,
    pub total: usize,
}

/// Simple message response.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

fn to_response(record: &StoredApplication) -> ApplicationResponse {
    ApplicationResponse {
        application_id: record.application_id.clone(),
        applicant_email: record.applicant_email.clone(),
        scholarship_id: record.scholarship_id.clone(),
        application_status: record.application_status,
        payment_status: record.payment_status,
        feedback: record.feedback.clone(),
        created_at: record.created_at.to_rfc3339(),
        updated_at: record.updated_at.to_rfc3339(),
    }
}

/// Applications carry PII, so reads are limited to the applicant and the
/// moderator queue.
fn ensure_owner_or_moderator(
    state: &AppState,
    claims: &TokenClaims,
    applicant_email: &str,
) -> Result<(), ApiError> {
    if applicant_email.eq_ignore_ascii_case(claims.email()) {
        return Ok(());
    }
    if role_for_email(state, claims.email()).has_privilege(Role::Moderator) {
        return Ok(());
    }
    Err(ApiError::forbidden(
        "Only the applicant or a moderator may access this application",
    ))
}

/// Submit an application.
#[utoipa::path(
    post,
    path = "/applications",
    tag = "Applications",
    request_body = CreateApplicationRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Application submitted", body = ApplicationResponse),
        (status = 400, description = "Missing required field"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_application(
    Auth(claims): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationResponse>), ApiError> {
    if request.scholarship_id.trim().is_empty() {
        return Err(ApiError::bad_request("scholarshipId is required"));
    }

    let record = StoredApplication::new_submitted(
        Uuid::new_v4().to_string(),
        claims.email().to_string(),
        request.scholarship_id,
    );

    let storage = state.storage();
    let repo = ApplicationRepository::new(&storage);
    repo.create(&record)
        .map_err(|e| ApiError::internal(format!("Failed to store application: {e}")))?;

    Ok((StatusCode::CREATED, Json(to_response(&record))))
}

/// List every application. Moderator queue.
#[utoipa::path(
    get,
    path = "/applications",
    tag = "Applications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All applications", body = ApplicationListResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (moderator required)")
    )
)]
pub async fn list_applications(
    ModeratorOnly(_user): ModeratorOnly,
    State(state): State<AppState>,
) -> Result<Json<ApplicationListResponse>, ApiError> {
    let storage = state.storage();
    let repo = ApplicationRepository::new(&storage);

    let applications = repo
        .list_all()
        .map_err(|e| ApiError::internal(format!("Failed to list applications: {e}")))?;
    let mapped: Vec<ApplicationResponse> = applications.iter().map(to_response).collect();

    Ok(Json(ApplicationListResponse {
        total: mapped.len(),
        applications: mapped,
    }))
}

/// Get one application (applicant or moderator).
#[utoipa::path(
    get,
    path = "/applications/{id}",
    tag = "Applications",
    params(
        ("id" = String, Path, description = "Application ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Application", body = ApplicationResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the applicant or a moderator"),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_application(
    Auth(claims): Auth,
    State(state): State<AppState>,
    Path(application_id): Path<String>,
) -> Result<Json<ApplicationResponse>, ApiError> {
    let storage = state.storage();
    let repo = ApplicationRepository::new(&storage);

    let record = repo
        .get(&application_id)
        .map_err(|_| ApiError::not_found("Application not found"))?;

    ensure_owner_or_moderator(&state, &claims, &record.applicant_email)?;

    Ok(Json(to_response(&record)))
}

/// List the applications submitted by one applicant.
#[utoipa::path(
    get,
    path = "/applications/user/{email}",
    tag = "Applications",
    params(
        ("email" = String, Path, description = "Applicant email")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Applications by the user", body = ApplicationListResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the applicant or a moderator")
    )
)]
pub async fn list_applications_for_user(
    Auth(claims): Auth,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<ApplicationListResponse>, ApiError> {
    ensure_owner_or_moderator(&state, &claims, &email)?;

    let storage = state.storage();
    let repo = ApplicationRepository::new(&storage);

    let applications = repo
        .list_by_applicant(&email)
        .map_err(|e| ApiError::internal(format!("Failed to list applications: {e}")))?;
    let mapped: Vec<ApplicationResponse> = applications.iter().map(to_response).collect();

    Ok(Json(ApplicationListResponse {
        total: mapped.len(),
        applications: mapped,
    }))
}

/// Merge status and feedback into an application. Moderator only.
#[utoipa::path(
    patch,
    path = "/applications/{id}",
    tag = "Applications",
    params(
        ("id" = String, Path, description = "Application ID")
    ),
    request_body = UpdateApplicationRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Application updated", body = ApplicationResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (moderator required)"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_application(
    ModeratorOnly(_user): ModeratorOnly,
    State(state): State<AppState>,
    Path(application_id): Path<String>,
    Json(request): Json<UpdateApplicationRequest>,
) -> Result<Json<ApplicationResponse>, ApiError> {
    let storage = state.storage();
    let repo = ApplicationRepository::new(&storage);

    let mut record = repo
        .get(&application_id)
        .map_err(|_| ApiError::not_found("Application not found"))?;

    if let Some(status) = request.application_status {
        record.application_status = status;
    }
    if let Some(feedback) = request.feedback {
        record.feedback = Some(feedback);
    }
    record.updated_at = Utc::now();

    repo.update(&record)
        .map_err(|e| ApiError::internal(format!("Failed to update application: {e}")))?;

    Ok(Json(to_response(&record)))
}

/// Delete an application (applicant or moderator).
#[utoipa::path(
    delete,
    path = "/applications/{id}",
    tag = "Applications",
    params(
        ("id" = String, Path, description = "Application ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Application deleted", body = MessageResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the applicant or a moderator"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_application(
    Auth(claims): Auth,
    State(state): State<AppState>,
    Path(application_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let storage = state.storage();
    let repo = ApplicationRepository::new(&storage);

    let record = repo
        .get(&application_id)
        .map_err(|_| ApiError::not_found("Application not found"))?;

    ensure_owner_or_moderator(&state, &claims, &record.applicant_email)?;

    repo.delete(&application_id)
        .map_err(|e| ApiError::internal(format!("Failed to delete application: {e}")))?;

    Ok(Json(MessageResponse {
        message: "Application deleted".to_string(),
    }))
}
