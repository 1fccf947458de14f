// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ScholarStream

//! # Authentication Module
//!
//! Self-issued bearer-token authentication and role-based authorization.
//!
//! ## Auth Flow
//!
//! 1. Frontend signs the user in and calls `POST /jwt {email}`
//! 2. Server signs `{sub: email, iat, exp}` with HS256 over `TOKEN_SECRET`
//!    (fixed 1 hour expiry) and returns the token
//! 3. Frontend sends `Authorization: Bearer <token>` on protected routes
//! 4. Server verifies signature and expiry, then — for role-gated routes —
//!    loads the user's role from the users collection
//!
//! ## Security
//!
//! - The token asserts identity (email) only; roles live in storage so a
//!   role change applies to tokens already in flight
//! - Clock skew tolerance is 60 seconds
//! - Bootstrap admin/super-admin identities are environment-configured and
//!   their roles can never be altered through the API

pub mod error;
pub mod extractor;
pub mod roles;
pub mod token;

pub use error::AuthError;
pub use extractor::{AdminOnly, Auth, AuthorizedUser, ModeratorOnly};
pub use roles::Role;
pub use token::TokenClaims;
