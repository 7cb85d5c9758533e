// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the operator session.
//!
//! The extractor never rejects: validation errors must win over auth errors,
//! so handlers validate first and the gateway calls [`Session::require`]
//! right before going upstream.
//!
//! ```rust,ignore
//! async fn my_handler(session: Session, State(state): State<AppState>) -> impl IntoResponse {
//!     state.gateway.forward(&session, request).await
//! }
//! ```

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap,
    },
};

use super::AuthError;
use crate::state::AppState;

/// Opaque operator token, sent upstream as `Authorization: Bearer <token>`.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Returns `None` for blank tokens.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// The credential, if any, that accompanied a request.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<SessionToken>,
    malformed_header: bool,
}

impl Session {
    /// A request with no credential at all.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_token(token: SessionToken) -> Self {
        Self {
            token: Some(token),
            malformed_header: false,
        }
    }

    /// Resolves the session from a cookie first, then a bearer header.
    pub fn from_headers(headers: &HeaderMap, cookie_name: &str) -> Self {
        if let Some(token) = session_cookie(headers, cookie_name) {
            return Self::from_token(token);
        }

        match headers.get(AUTHORIZATION) {
            None => Self::anonymous(),
            Some(value) => {
                let token = value
                    .to_str()
                    .ok()
                    .and_then(|v| v.strip_prefix("Bearer "))
                    .and_then(SessionToken::new);
                match token {
                    Some(token) => Self::from_token(token),
                    None => Self {
                        token: None,
                        malformed_header: true,
                    },
                }
            }
        }
    }

    pub fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    /// The credential, or the reason there is none. Fails closed.
    pub fn require(&self) -> Result<&SessionToken, AuthError> {
        match (&self.token, self.malformed_header) {
            (Some(token), _) => Ok(token),
            (None, true) => Err(AuthError::InvalidAuthHeader),
            (None, false) => Err(AuthError::MissingSession),
        }
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Session::from_headers(&parts.headers, &state.session_cookie))
    }
}

fn session_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<SessionToken> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| name.trim() == cookie_name)
        .and_then(|(_, value)| SessionToken::new(value.trim().trim_matches('"')))
}
