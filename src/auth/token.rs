// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ScholarStream

//! Identity token issuing and verification.
//!
//! Tokens are self-issued: `POST /jwt` signs the caller's email with the
//! server's `TOKEN_SECRET` (HS256) and a fixed one-hour expiry. Verification
//! checks signature and expiry only; the role is NOT a token claim — it is
//! loaded from the users collection at authorization time, so a role change
//! takes effect without re-issuing tokens.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AuthError;

/// Fixed token lifetime (1 hour).
pub const TOKEN_TTL_SECS: i64 = 3600;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Claims carried by an issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user's email address.
    pub sub: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

impl TokenClaims {
    /// The email the token asserts.
    pub fn email(&self) -> &str {
        &self.sub
    }
}

/// Sign a token asserting `email`, expiring [`TOKEN_TTL_SECS`] from now.
pub fn issue(email: &str, secret: &str) -> Result<String, AuthError> {
    issue_at(email, secret, Utc::now().timestamp())
}

fn issue_at(email: &str, secret: &str, issued_at: i64) -> Result<String, AuthError> {
    let claims = TokenClaims {
        sub: email.to_string(),
        iat: issued_at,
        exp: issued_at + TOKEN_TTL_SECS,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::InternalError(format!("failed to sign token: {e}")))
}

/// Verify signature and expiry, returning the asserted claims.
pub fn verify(token: &str, secret: &str) -> Result<TokenClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = CLOCK_SKEW_LEEWAY;

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::MalformedToken,
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn issue_and_verify_round_trip() {
        let token = issue("student@example.com", SECRET).expect("issue token");
        let claims = verify(&token, SECRET).expect("verify token");
        assert_eq!(claims.email(), "student@example.com");
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);
    }

    #[test]
    fn expired_token_is_rejected() {
        // Issued two hours ago, so the 1h expiry is well past the leeway.
        let issued_at = Utc::now().timestamp() - 2 * TOKEN_TTL_SECS;
        let token = issue_at("student@example.com", SECRET, issued_at).expect("issue token");
        let err = verify(&token, SECRET).expect_err("expired token should fail");
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[test]
    fn wrong_secret_is_invalid_signature() {
        let token = issue("student@example.com", SECRET).expect("issue token");
        let err = verify(&token, "another-secret").expect_err("wrong secret should fail");
        assert!(matches!(err, AuthError::InvalidSignature));
    }

    #[test]
    fn garbage_token_is_malformed() {
        let err = verify("not-a-token", SECRET).expect_err("garbage should fail");
        assert!(matches!(err, AuthError::MalformedToken));
    }
}
