// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ScholarStream

//! Payment endpoints: checkout session creation, the payment confirmation
//! workflow, the best-effort failure lookup, and the ledger listing.
//!
//! Confirmation is the one transactional piece of the system. The payer may
//! retry the return navigation, so the same session can be confirmed more
//! than once; the ledger absorbs that by upserting on the processor's
//! transaction id instead of locking.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::Auth,
    error::ApiError,
    providers::checkout::{
        CheckoutClient, CheckoutError, CheckoutSession, CreateSessionRequest,
    },
    state::AppState,
    storage::{
        ApplicationRepository, ApplicationStatus, DocumentStorage, PaymentRepository,
        PaymentStatus, ScholarshipRepository, StoredPayment,
    },
};

/// Request body for POST /create-checkout-session.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateCheckoutSessionRequest {
    /// Fee to charge; number or numeric string.
    #[serde(default, deserialize_with = "super::scholarships::de_numeric")]
    pub application_fees: f64,
    /// The application the fee settles.
    pub application_id: String,
    /// Payer email; defaults to the authenticated caller.
    #[serde(default)]
    pub applicant_email: Option<String>,
    /// Scholarship name embedded as session metadata.
    #[serde(default)]
    pub scholarship_name: String,
    /// University name embedded as session metadata.
    #[serde(default)]
    pub university_name: String,
}

/// Response for POST /create-checkout-session.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateCheckoutSessionResponse {
    /// Processor-hosted checkout URL to redirect the payer to.
    pub url: String,
}

/// Receipt summary assembled from the persisted ledger entry.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scholarship_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university_name: Option<String>,
    pub amount: f64,
    pub currency: String,
    pub transaction_id: String,
}

/// Response for PATCH /payment-success.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConfirmPaymentResponse {
    pub success: bool,
    pub message: String,
    pub payment: PaymentSummary,
}

/// Response for GET /payment-failed.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FailureInfoResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scholarship_name: Option<String>,
    pub message: String,
}

/// Ledger entry returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub transaction_id: String,
    pub application_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scholarship_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university_name: Option<String>,
    pub amount: f64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer_email: Option<String>,
    pub status: String,
    pub paid_at: String,
}

/// Query params carrying the processor session id.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct SessionQuery {
    /// Checkout session id from the return redirect.
    pub session_id: Option<String>,
}

fn to_response(record: &StoredPayment) -> PaymentResponse {
    PaymentResponse {
        transaction_id: record.transaction_id.clone(),
        application_id: record.application_id.clone(),
        scholarship_name: record.scholarship_name.clone(),
        university_name: record.university_name.clone(),
        amount: record.amount,
        currency: record.currency.clone(),
        payer_email: record.payer_email.clone(),
        status: record.status.clone(),
        paid_at: record.paid_at.to_rfc3339(),
    }
}

fn map_provider_error(error: CheckoutError) -> ApiError {
    match error {
        CheckoutError::MissingConfig(message) => ApiError::service_unavailable(format!(
            "Checkout processor configuration error: {message}"
        )),
        CheckoutError::Request(message) | CheckoutError::InvalidResponse(message) => {
            ApiError::service_unavailable(format!("Checkout processor request failed: {message}"))
        }
    }
}

/// Reconcile a verified processor session against the application record
/// and the payment ledger.
///
/// The session must be paid; the application it names must exist. Marking
/// the application paid/pending is idempotent, and the ledger upsert is
/// keyed by the session's transaction id, so repeated confirmations of the
/// same session converge on one ledger entry. Nothing is mutated on the
/// failure paths.
fn apply_paid_session(
    storage: &DocumentStorage,
    session: &CheckoutSession,
) -> Result<StoredPayment, ApiError> {
    if !session.payment_status.is_paid() {
        return Err(ApiError::bad_request(
            "Payment has not been completed for this session",
        ));
    }

    let application_id = session
        .application_id
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("Session carries no application reference"))?;

    let application_repo = ApplicationRepository::new(storage);
    let mut application = application_repo
        .get(application_id)
        .map_err(|_| ApiError::not_found("Application not found"))?;

    // Best-effort receipt fields: the stored scholarship wins, the session
    // metadata is the fallback, and neither being available is fine.
    let scholarship = ScholarshipRepository::new(storage)
        .get(&application.scholarship_id)
        .ok();
    let scholarship_name = scholarship
        .as_ref()
        .map(|s| s.scholarship_name.clone())
        .or_else(|| session.scholarship_name.clone());
    let university_name = scholarship
        .as_ref()
        .map(|s| s.university_name.clone())
        .or_else(|| session.university_name.clone());

    application.payment_status = PaymentStatus::Paid;
    application.application_status = ApplicationStatus::Pending;
    application.updated_at = Utc::now();
    application_repo
        .update(&application)
        .map_err(|e| ApiError::internal(format!("Failed to update application: {e}")))?;

    let payment = StoredPayment {
        transaction_id: session.transaction_id().to_string(),
        application_id: application.application_id.clone(),
        scholarship_name,
        university_name,
        amount: session.amount_major().unwrap_or(0.0),
        currency: session
            .currency
            .clone()
            .unwrap_or_else(|| "usd".to_string())
            .to_ascii_uppercase(),
        payer_email: session
            .customer_email
            .clone()
            .or_else(|| Some(application.applicant_email.clone())),
        status: "paid".to_string(),
        paid_at: Utc::now(),
    };

    PaymentRepository::new(storage)
        .upsert(&payment)
        .map_err(|e| ApiError::internal(format!("Failed to record payment: {e}")))?;

    Ok(payment)
}

/// Best-effort scholarship name for a failed/cancelled session. Every
/// lookup failure degrades to `None` instead of an error.
fn lookup_failure_scholarship(
    storage: &DocumentStorage,
    session: Option<&CheckoutSession>,
) -> Option<String> {
    let session = session?;
    let from_metadata = session.scholarship_name.clone();

    let Some(application_id) = session.application_id.as_deref() else {
        return from_metadata;
    };
    let Ok(application) = ApplicationRepository::new(storage).get(application_id) else {
        return from_metadata;
    };
    ScholarshipRepository::new(storage)
        .get(&application.scholarship_id)
        .ok()
        .map(|s| s.scholarship_name)
        .or(from_metadata)
}

/// Start a hosted checkout session for an application fee.
#[utoipa::path(
    post,
    path = "/create-checkout-session",
    tag = "Payments",
    request_body = CreateCheckoutSessionRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Hosted checkout URL", body = CreateCheckoutSessionResponse),
        (status = 400, description = "Missing application id or non-positive fee"),
        (status = 401, description = "Not authenticated"),
        (status = 503, description = "Processor unavailable")
    )
)]
pub async fn create_checkout_session(
    Auth(claims): Auth,
    State(_state): State<AppState>,
    Json(request): Json<CreateCheckoutSessionRequest>,
) -> Result<Json<CreateCheckoutSessionResponse>, ApiError> {
    if request.application_id.trim().is_empty() {
        return Err(ApiError::bad_request("applicationId is required"));
    }
    if request.application_fees <= 0.0 {
        return Err(ApiError::bad_request(
            "applicationFees must be a positive amount",
        ));
    }

    let amount_in_minor = (request.application_fees * 100.0).round() as u64;
    let payer_email = request
        .applicant_email
        .unwrap_or_else(|| claims.email().to_string());

    let client = CheckoutClient::from_env().map_err(map_provider_error)?;
    let link = client
        .create_session(CreateSessionRequest {
            application_id: request.application_id.trim(),
            amount_in_minor,
            payer_email: &payer_email,
            scholarship_name: &request.scholarship_name,
            university_name: &request.university_name,
        })
        .await
        .map_err(map_provider_error)?;

    info!(
        session_id = %link.session_id,
        application_id = %request.application_id.trim(),
        "created checkout session"
    );

    Ok(Json(CreateCheckoutSessionResponse { url: link.url }))
}

/// Confirm a payment after the payer returns from the processor.
#[utoipa::path(
    patch,
    path = "/payment-success",
    tag = "Payments",
    params(SessionQuery),
    responses(
        (status = 200, description = "Payment recorded", body = ConfirmPaymentResponse),
        (status = 400, description = "Missing session id or session not paid"),
        (status = 404, description = "Application not found"),
        (status = 503, description = "Processor unavailable")
    )
)]
pub async fn confirm_payment(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<ConfirmPaymentResponse>, ApiError> {
    let session_id = query
        .session_id
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::bad_request("session_id is required"))?;

    let client = CheckoutClient::from_env().map_err(map_provider_error)?;
    let session = client
        .fetch_session(session_id)
        .await
        .map_err(map_provider_error)?;

    let storage = state.storage();
    let payment = apply_paid_session(&storage, &session)?;

    Ok(Json(ConfirmPaymentResponse {
        success: true,
        message: "Payment recorded".to_string(),
        payment: PaymentSummary {
            scholarship_name: payment.scholarship_name.clone(),
            university_name: payment.university_name.clone(),
            amount: payment.amount,
            currency: payment.currency.clone(),
            transaction_id: payment.transaction_id,
        },
    }))
}

/// Describe a failed/cancelled checkout for display. Never fails: lookup
/// errors degrade to null fields.
#[utoipa::path(
    get,
    path = "/payment-failed",
    tag = "Payments",
    params(SessionQuery),
    responses(
        (status = 200, description = "Failure display info", body = FailureInfoResponse)
    )
)]
pub async fn payment_failed(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Json<FailureInfoResponse> {
    let session = match query
        .session_id
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        Some(session_id) if CheckoutClient::is_configured() => {
            match CheckoutClient::from_env() {
                Ok(client) => match client.fetch_session(session_id).await {
                    Ok(session) => Some(session),
                    Err(error) => {
                        warn!(%session_id, %error, "failed to look up cancelled session");
                        None
                    }
                },
                Err(error) => {
                    warn!(%error, "checkout client unavailable for failure lookup");
                    None
                }
            }
        }
        _ => None,
    };

    let storage = state.storage();
    let scholarship_name = lookup_failure_scholarship(&storage, session.as_ref());

    Json(FailureInfoResponse {
        success: false,
        scholarship_name,
        message: "Payment was not completed".to_string(),
    })
}

/// List the payment ledger, newest first.
#[utoipa::path(
    get,
    path = "/payments",
    tag = "Payments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Payment ledger", body = [PaymentResponse]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_payments(
    Auth(_claims): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    let storage = state.storage();
    let repo = PaymentRepository::new(&storage);

    let payments = repo
        .list_all()
        .map_err(|e| ApiError::internal(format!("Failed to list payments: {e}")))?;

    Ok(Json(payments.iter().map(to_response).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::checkout::SessionPaymentStatus;
    use crate::storage::{StoragePaths, StoredApplication, StoredScholarship};
    use axum::http::StatusCode;
    use tempfile::TempDir;

    fn test_storage() -> (DocumentStorage, TempDir) {
        let temp_dir = TempDir::new().expect("temp dir");
        let paths = StoragePaths::new(temp_dir.path());
        let mut storage = DocumentStorage::new(paths);
        storage.initialize().expect("initialize storage");
        (storage, temp_dir)
    }

    fn seed_application(storage: &DocumentStorage, application_id: &str) -> StoredApplication {
        let record = StoredApplication::new_submitted(
            application_id.to_string(),
            "student@example.com".to_string(),
            "s-1".to_string(),
        );
        ApplicationRepository::new(storage)
            .create(&record)
            .expect("seed application");
        record
    }

    fn seed_scholarship(storage: &DocumentStorage) {
        let record = StoredScholarship {
            scholarship_id: "s-1".to_string(),
            scholarship_name: "MIT Fellowship".to_string(),
            university_name: "MIT".to_string(),
            university_country: "USA".to_string(),
            university_city: "Cambridge".to_string(),
            degree: "Masters".to_string(),
            scholarship_category: "Full fund".to_string(),
            subject_category: "Engineering".to_string(),
            tuition_fee: 0.0,
            application_fee: 25.0,
            service_charge: 0.0,
            world_rank: 0.0,
            application_deadline: None,
            posted_by: "poster@example.com".to_string(),
            posted_at: Utc::now(),
        };
        ScholarshipRepository::new(storage)
            .create(&record)
            .expect("seed scholarship");
    }

    fn paid_session(application_id: &str, payment_intent: Option<&str>) -> CheckoutSession {
        CheckoutSession {
            session_id: "cs_test_123".to_string(),
            payment_status: SessionPaymentStatus::Paid,
            amount_total: Some(2550),
            currency: Some("usd".to_string()),
            customer_email: Some("student@example.com".to_string()),
            payment_intent_id: payment_intent.map(str::to_string),
            application_id: Some(application_id.to_string()),
            scholarship_name: Some("Session Scholarship".to_string()),
            university_name: Some("Session University".to_string()),
        }
    }

    #[test]
    fn confirming_twice_keeps_one_ledger_entry() {
        let (storage, _temp_dir) = test_storage();
        seed_application(&storage, "app-1");
        let session = paid_session("app-1", Some("pi_123"));

        apply_paid_session(&storage, &session).expect("first confirmation");
        apply_paid_session(&storage, &session).expect("second confirmation");

        let ledger = PaymentRepository::new(&storage).list_all().expect("list");
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].transaction_id, "pi_123");

        let application = ApplicationRepository::new(&storage)
            .get("app-1")
            .expect("get application");
        assert_eq!(application.payment_status, PaymentStatus::Paid);
        assert_eq!(application.application_status, ApplicationStatus::Pending);
    }

    #[test]
    fn unpaid_session_mutates_nothing() {
        let (storage, _temp_dir) = test_storage();
        seed_application(&storage, "app-1");
        let mut session = paid_session("app-1", Some("pi_123"));
        session.payment_status = SessionPaymentStatus::Unpaid;

        let err = apply_paid_session(&storage, &session).expect_err("unpaid should fail");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let application = ApplicationRepository::new(&storage)
            .get("app-1")
            .expect("get application");
        assert_eq!(application.payment_status, PaymentStatus::Unpaid);
        assert_eq!(application.application_status, ApplicationStatus::Submitted);
        assert!(PaymentRepository::new(&storage)
            .list_all()
            .expect("list")
            .is_empty());
    }

    #[test]
    fn missing_application_is_404_and_no_ledger_entry() {
        let (storage, _temp_dir) = test_storage();
        let session = paid_session("ghost-app", Some("pi_123"));

        let err = apply_paid_session(&storage, &session).expect_err("missing app should fail");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert!(PaymentRepository::new(&storage)
            .list_all()
            .expect("list")
            .is_empty());
    }

    #[test]
    fn transaction_id_falls_back_to_session_id() {
        let (storage, _temp_dir) = test_storage();
        seed_application(&storage, "app-1");
        let session = paid_session("app-1", None);

        let payment = apply_paid_session(&storage, &session).expect("confirmation");
        assert_eq!(payment.transaction_id, "cs_test_123");
    }

    #[test]
    fn receipt_prefers_stored_scholarship_over_session_metadata() {
        let (storage, _temp_dir) = test_storage();
        seed_application(&storage, "app-1");
        seed_scholarship(&storage);

        let payment = apply_paid_session(&storage, &paid_session("app-1", Some("pi_123")))
            .expect("confirmation");
        assert_eq!(payment.scholarship_name.as_deref(), Some("MIT Fellowship"));
        assert_eq!(payment.university_name.as_deref(), Some("MIT"));
        assert_eq!(payment.amount, 25.5);
        assert_eq!(payment.currency, "USD");
    }

    #[test]
    fn receipt_falls_back_to_session_metadata() {
        let (storage, _temp_dir) = test_storage();
        seed_application(&storage, "app-1");

        let payment = apply_paid_session(&storage, &paid_session("app-1", Some("pi_123")))
            .expect("confirmation");
        assert_eq!(
            payment.scholarship_name.as_deref(),
            Some("Session Scholarship")
        );
    }

    #[test]
    fn failure_lookup_degrades_to_none() {
        let (storage, _temp_dir) = test_storage();
        assert_eq!(lookup_failure_scholarship(&storage, None), None);

        // A session naming an unknown application falls back to metadata.
        let session = paid_session("ghost-app", None);
        assert_eq!(
            lookup_failure_scholarship(&storage, Some(&session)).as_deref(),
            Some("Session Scholarship")
        );
    }

    #[test]
    fn failure_lookup_prefers_stored_scholarship() {
        let (storage, _temp_dir) = test_storage();
        seed_application(&storage, "app-1");
        seed_scholarship(&storage);

        let session = paid_session("app-1", None);
        assert_eq!(
            lookup_failure_scholarship(&storage, Some(&session)).as_deref(),
            Some("MIT Fellowship")
        );
    }

    #[test]
    fn checkout_request_coerces_fee_strings() {
        let request: CreateCheckoutSessionRequest =
            serde_json::from_value(serde_json::json!({
                "applicationFees": "25.50",
                "applicationId": "app-1",
                "applicantEmail": "student@example.com",
                "scholarshipName": "MIT Fellowship",
                "universityName": "MIT"
            }))
            .expect("deserialize");
        assert_eq!(request.application_fees, 25.5);
    }
}
