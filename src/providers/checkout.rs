// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ScholarStream

//! Hosted-checkout processor integration (Stripe Checkout API).
//!
//! The client creates a hosted checkout session for an application fee and
//! later retrieves the session to verify its payment status. The session
//! carries the application id and scholarship/university names as metadata
//! so the confirmation step can reconcile the payment against the
//! application record.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";
const DEFAULT_SITE_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_CURRENCY: &str = "USD";

/// Payment status reported by the processor for a checkout session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPaymentStatus {
    /// The session's charge settled.
    Paid,
    /// The session has not (or not yet) been paid.
    Unpaid,
}

impl SessionPaymentStatus {
    /// Whether the session may mark an application as paid.
    pub fn is_paid(&self) -> bool {
        matches!(self, SessionPaymentStatus::Paid)
    }
}

/// Request to create a hosted checkout session.
pub struct CreateSessionRequest<'a> {
    pub application_id: &'a str,
    pub amount_in_minor: u64,
    pub payer_email: &'a str,
    pub scholarship_name: &'a str,
    pub university_name: &'a str,
}

/// A created checkout session: its id plus the processor-hosted URL the
/// payer is redirected to.
#[derive(Debug, Clone)]
pub struct CheckoutSessionLink {
    pub session_id: String,
    pub url: String,
}

/// A checkout session as retrieved from the processor.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub session_id: String,
    pub payment_status: SessionPaymentStatus,
    /// Settled amount in minor currency units.
    pub amount_total: Option<u64>,
    pub currency: Option<String>,
    pub customer_email: Option<String>,
    /// The processor's payment-intent reference for the charge.
    pub payment_intent_id: Option<String>,
    /// Application id embedded as session metadata.
    pub application_id: Option<String>,
    pub scholarship_name: Option<String>,
    pub university_name: Option<String>,
}

impl CheckoutSession {
    /// The idempotency key for ledger upserts: the payment-intent id when
    /// present, otherwise the session id.
    pub fn transaction_id(&self) -> &str {
        self.payment_intent_id
            .as_deref()
            .unwrap_or(&self.session_id)
    }

    /// Settled amount converted to major units.
    pub fn amount_major(&self) -> Option<f64> {
        self.amount_total.map(|minor| minor as f64 / 100.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("checkout configuration missing: {0}")]
    MissingConfig(String),

    #[error("checkout request failed: {0}")]
    Request(String),

    #[error("checkout response was invalid: {0}")]
    InvalidResponse(String),
}

/// Client for the hosted checkout processor.
#[derive(Debug, Clone)]
pub struct CheckoutClient {
    api_base_url: String,
    secret_key: String,
    site_origin: String,
    currency: String,
    http: Client,
}

impl CheckoutClient {
    pub fn is_configured() -> bool {
        env_optional("STRIPE_SECRET_KEY").is_some()
    }

    pub fn from_env() -> Result<Self, CheckoutError> {
        let api_base_url = env_or_default("STRIPE_API_BASE_URL", DEFAULT_API_BASE_URL);
        let secret_key = env_required("STRIPE_SECRET_KEY")?;
        let site_origin = env_or_default("SITE_ORIGIN", DEFAULT_SITE_ORIGIN);
        url::Url::parse(&site_origin)
            .map_err(|e| CheckoutError::MissingConfig(format!("SITE_ORIGIN is not a URL: {e}")))?;
        let currency = env_or_default("CHECKOUT_CURRENCY", DEFAULT_CURRENCY).to_ascii_lowercase();

        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| CheckoutError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_base_url,
            secret_key,
            site_origin,
            currency,
            http,
        })
    }

    /// Create a hosted checkout session for an application fee.
    pub async fn create_session(
        &self,
        request: CreateSessionRequest<'_>,
    ) -> Result<CheckoutSessionLink, CheckoutError> {
        let form = session_form(&request, &self.currency, &self.site_origin);

        let response = self
            .http
            .post(format!(
                "{}/v1/checkout/sessions",
                self.api_base_url.trim_end_matches('/')
            ))
            .header("Authorization", format!("Bearer {}", self.secret_key))
            .form(&form)
            .send()
            .await
            .map_err(|e| CheckoutError::Request(format!("create session failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CheckoutError::Request(format!(
                "create session returned {status}: {body}"
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            CheckoutError::InvalidResponse(format!("create session invalid JSON: {e}"))
        })?;

        let session_id = body
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                CheckoutError::InvalidResponse("missing session id in response".to_string())
            })?
            .to_string();

        let url = body
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                CheckoutError::InvalidResponse("missing hosted URL in response".to_string())
            })?
            .to_string();

        Ok(CheckoutSessionLink { session_id, url })
    }

    /// Retrieve a checkout session by id.
    pub async fn fetch_session(&self, session_id: &str) -> Result<CheckoutSession, CheckoutError> {
        let response = self
            .http
            .get(format!(
                "{}/v1/checkout/sessions/{session_id}",
                self.api_base_url.trim_end_matches('/')
            ))
            .header("Authorization", format!("Bearer {}", self.secret_key))
            .send()
            .await
            .map_err(|e| CheckoutError::Request(format!("fetch session failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CheckoutError::Request(format!(
                "fetch session returned {status}: {body}"
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            CheckoutError::InvalidResponse(format!("fetch session invalid JSON: {e}"))
        })?;

        parse_session(&body)
    }
}

/// Map the processor's raw payment status onto the session status enum.
///
/// `no_payment_required` counts as settled (zero-fee sessions).
pub fn map_session_status(raw_status: &str) -> SessionPaymentStatus {
    match raw_status.trim().to_ascii_lowercase().as_str() {
        "paid" | "no_payment_required" => SessionPaymentStatus::Paid,
        _ => SessionPaymentStatus::Unpaid,
    }
}

/// Parse a retrieved checkout session from the processor's JSON.
pub fn parse_session(response: &Value) -> Result<CheckoutSession, CheckoutError> {
    let session_id = response
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            CheckoutError::InvalidResponse("missing session id in response".to_string())
        })?
        .to_string();

    let payment_status = response
        .get("payment_status")
        .and_then(Value::as_str)
        .map(map_session_status)
        .ok_or_else(|| {
            CheckoutError::InvalidResponse("missing payment status in response".to_string())
        })?;

    // The payment intent may come expanded (object) or as a bare id.
    let payment_intent_id = response
        .pointer("/payment_intent/id")
        .and_then(Value::as_str)
        .or_else(|| response.get("payment_intent").and_then(Value::as_str))
        .map(str::to_string);

    let customer_email = response
        .pointer("/customer_details/email")
        .and_then(Value::as_str)
        .or_else(|| response.get("customer_email").and_then(Value::as_str))
        .map(str::to_string);

    Ok(CheckoutSession {
        session_id,
        payment_status,
        amount_total: response.get("amount_total").and_then(Value::as_u64),
        currency: response
            .get("currency")
            .and_then(Value::as_str)
            .map(str::to_string),
        customer_email,
        payment_intent_id,
        application_id: metadata_value(response, "application_id"),
        scholarship_name: metadata_value(response, "scholarship_name"),
        university_name: metadata_value(response, "university_name"),
    })
}

fn metadata_value(response: &Value, key: &str) -> Option<String> {
    response
        .pointer(&format!("/metadata/{key}"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn build_success_url(site_origin: &str) -> String {
    // {CHECKOUT_SESSION_ID} is the processor's literal placeholder; it is
    // substituted with the real session id on redirect.
    format!(
        "{}/payment-success?session_id={{CHECKOUT_SESSION_ID}}",
        site_origin.trim_end_matches('/')
    )
}

fn build_cancel_url(site_origin: &str) -> String {
    format!(
        "{}/payment-failed?session_id={{CHECKOUT_SESSION_ID}}",
        site_origin.trim_end_matches('/')
    )
}

fn session_form(
    request: &CreateSessionRequest<'_>,
    currency: &str,
    site_origin: &str,
) -> Vec<(String, String)> {
    vec![
        ("mode".to_string(), "payment".to_string()),
        ("customer_email".to_string(), request.payer_email.to_string()),
        ("success_url".to_string(), build_success_url(site_origin)),
        ("cancel_url".to_string(), build_cancel_url(site_origin)),
        (
            "line_items[0][price_data][currency]".to_string(),
            currency.to_string(),
        ),
        (
            "line_items[0][price_data][unit_amount]".to_string(),
            request.amount_in_minor.to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]".to_string(),
            format!(
                "{} - {}",
                request.scholarship_name, request.university_name
            ),
        ),
        ("line_items[0][quantity]".to_string(), "1".to_string()),
        (
            "metadata[application_id]".to_string(),
            request.application_id.to_string(),
        ),
        (
            "metadata[scholarship_name]".to_string(),
            request.scholarship_name.to_string(),
        ),
        (
            "metadata[university_name]".to_string(),
            request.university_name.to_string(),
        ),
    ]
}

fn env_required(name: &str) -> Result<String, CheckoutError> {
    env_optional(name).ok_or_else(|| CheckoutError::MissingConfig(name.to_string()))
}

fn env_optional(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) => {
            let trimmed = value.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        Err(_) => None,
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
