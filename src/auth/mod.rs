// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Authentication
//!
//! Operators authenticate against the upstream platform; this service never
//! verifies tokens itself. It only locates the operator's session token and
//! hands it to the upstream gateway as a bearer credential.
//!
//! ## Credential Sources
//!
//! 1. The session cookie (`auth_token` by default, see `SESSION_COOKIE_NAME`)
//! 2. An `Authorization: Bearer <token>` header
//!
//! The token is read fresh for every request and never cached. A request
//! without one is answered with 401 before anything is sent upstream.

pub mod error;
pub mod extractor;

pub use error::AuthError;
pub use extractor::{Session, SessionToken};
