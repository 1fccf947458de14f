// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ScholarStream

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for document storage | `data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `TOKEN_SECRET` | HS256 signing secret for issued tokens | Required for production |
//! | `ADMIN_EMAIL` | Bootstrap admin identity (role immutable via API) | Optional |
//! | `SUPER_ADMIN_EMAIL` | Bootstrap super-admin identity (role immutable via API) | Optional |
//! | `STRIPE_SECRET_KEY` | Checkout processor secret key | Required for payments |
//! | `STRIPE_API_BASE_URL` | Checkout processor API base URL | `https://api.stripe.com` |
//! | `SITE_ORIGIN` | Public site origin for checkout redirect URLs | `http://localhost:5173` |
//! | `CHECKOUT_CURRENCY` | Currency for checkout sessions | `USD` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

/// Environment variable name for the document storage root directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Default document storage root when `DATA_DIR` is unset.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Environment variable name for the server bind address.
pub const HOST_ENV: &str = "HOST";

/// Environment variable name for the server bind port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the token signing secret.
///
/// Tokens issued by `POST /jwt` are signed with HS256 over this secret.
/// Falls back to an insecure development secret when unset.
pub const TOKEN_SECRET_ENV: &str = "TOKEN_SECRET";

/// Environment variable name for the bootstrap admin email.
pub const ADMIN_EMAIL_ENV: &str = "ADMIN_EMAIL";

/// Environment variable name for the bootstrap super-admin email.
pub const SUPER_ADMIN_EMAIL_ENV: &str = "SUPER_ADMIN_EMAIL";

/// Environment variable name for the logging format (`json` or `pretty`).
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
