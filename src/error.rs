// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::debug;

use crate::{
    auth::AuthError,
    upstream::{ForwardError, UpstreamError},
    validation::ValidationError,
};

pub const UPSTREAM_UNREACHABLE_MESSAGE: &str = "Üst servise ulaşılamadı. Lütfen tekrar deneyin.";
pub const UPSTREAM_TIMEOUT_MESSAGE: &str =
    "Üst servis zamanında yanıt vermedi. Lütfen tekrar deneyin.";
pub const INTERNAL_ERROR_MESSAGE: &str = "Beklenmeyen bir hata oluştu.";

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    /// Machine-readable code, set for authentication failures.
    pub code: Option<&'static str>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn gateway_timeout(message: impl Into<String>) -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            success: false,
            message: self.message,
            error_code: self.code.map(str::to_string),
        });
        (self.status, body).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        debug!(field = err.field(), "Rejected request payload");
        ApiError::bad_request(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError {
            code: Some(err.error_code()),
            ..ApiError::new(err.status_code(), err.to_string())
        }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Timeout(_) => ApiError::gateway_timeout(UPSTREAM_TIMEOUT_MESSAGE),
            UpstreamError::Transport(_) => ApiError::bad_gateway(UPSTREAM_UNREACHABLE_MESSAGE),
            UpstreamError::InvalidUrl(_) | UpstreamError::Encode(_) => {
                ApiError::internal(INTERNAL_ERROR_MESSAGE)
            }
        }
    }
}

impl From<ForwardError> for ApiError {
    fn from(err: ForwardError) -> Self {
        match err {
            ForwardError::Unauthenticated(auth) => auth.into(),
            ForwardError::Upstream(upstream) => upstream.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_message() {
        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad.message, "bad");

        let unauth = ApiError::unauthorized("who");
        assert_eq!(unauth.status, StatusCode::UNAUTHORIZED);

        let gw = ApiError::bad_gateway("down");
        assert_eq!(gw.status, StatusCode::BAD_GATEWAY);
        assert_eq!(gw.message, "down");
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"success":false,"message":"bad data"}"#);
    }

    #[test]
    fn validation_errors_are_field_specific_400s() {
        let err: ApiError = ValidationError::CallDuration.into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Geçersiz görüşme süresi formatı.");
    }

    #[test]
    fn upstream_failures_map_to_gateway_statuses() {
        let timeout: ApiError = UpstreamError::Timeout("slow".into()).into();
        assert_eq!(timeout.status, StatusCode::GATEWAY_TIMEOUT);

        let down: ApiError = UpstreamError::Transport("refused".into()).into();
        assert_eq!(down.status, StatusCode::BAD_GATEWAY);
        assert!(!down.message.contains("refused"));

        let config: ApiError = UpstreamError::InvalidUrl("x".into()).into();
        assert_eq!(config.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn missing_session_is_401() {
        let err: ApiError = ForwardError::Unauthenticated(AuthError::MissingSession).into();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.message, AuthError::MissingSession.to_string());
        assert_eq!(err.code, Some("missing_session"));
    }
}
