// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use crate::{
    config::{AppConfig, DEFAULT_SESSION_COOKIE_NAME},
    upstream::{UpstreamError, UpstreamGateway},
};

#[derive(Clone)]
pub struct AppState {
    pub gateway: UpstreamGateway,
    /// Name of the cookie the session extractor reads.
    pub session_cookie: String,
}

impl AppState {
    pub fn new(gateway: UpstreamGateway) -> Self {
        Self {
            gateway,
            session_cookie: DEFAULT_SESSION_COOKIE_NAME.to_string(),
        }
    }

    pub fn with_session_cookie(mut self, name: impl Into<String>) -> Self {
        self.session_cookie = name.into();
        self
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, UpstreamError> {
        let gateway =
            UpstreamGateway::new(config.upstream.base_url.clone(), config.upstream.timeout)?;
        Ok(Self::new(gateway).with_session_cookie(config.session_cookie.clone()))
    }
}
