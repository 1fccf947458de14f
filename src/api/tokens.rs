// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ScholarStream

//! Token issuing endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::token;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /jwt.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct IssueTokenRequest {
    /// Email identity the token will assert.
    pub email: String,
}

/// Response for POST /jwt.
#[derive(Debug, Serialize, ToSchema)]
pub struct IssueTokenResponse {
    /// Signed bearer token, valid for one hour.
    pub token: String,
}

/// Issue a short-lived identity token for the given email.
#[utoipa::path(
    post,
    path = "/jwt",
    tag = "Auth",
    request_body = IssueTokenRequest,
    responses(
        (status = 200, description = "Token issued", body = IssueTokenResponse),
        (status = 400, description = "Missing email")
    )
)]
pub async fn issue_token(
    State(state): State<AppState>,
    Json(request): Json<IssueTokenRequest>,
) -> Result<Json<IssueTokenResponse>, ApiError> {
    let email = request.email.trim();
    if email.is_empty() {
        return Err(ApiError::bad_request("email is required"));
    }

    let token = token::issue(email, &state.auth_config.token_secret)
        .map_err(|e| ApiError::internal(format!("Failed to issue token: {e}")))?;

    Ok(Json(IssueTokenResponse { token }))
}
