// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Upstream platform gateway.
//!
//! Every call leaving this service goes through [`UpstreamGateway::forward`].
//! The gateway attaches the operator's bearer credential, relays the upstream
//! status code untouched and keeps the response body even when it is not JSON.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use reqwest::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use url::Url;

use super::paging::QueryParams;
use crate::auth::{AuthError, Session};

const APPLICATION_JSON: &str = "application/json";

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream base URL is invalid: {0}")]
    InvalidUrl(String),

    #[error("failed to encode upstream request body: {0}")]
    Encode(String),

    #[error("upstream request timed out: {0}")]
    Timeout(String),

    #[error("upstream request failed: {0}")]
    Transport(String),
}

impl UpstreamError {
    /// Transport-level failures are worth retrying; configuration errors are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, UpstreamError::Timeout(_) | UpstreamError::Transport(_))
    }

    fn from_reqwest(err: reqwest::Error, method: &Method, url: &Url) -> Self {
        let detail = format!("{method} {} failed: {err}", url.path());
        if err.is_timeout() {
            UpstreamError::Timeout(detail)
        } else {
            UpstreamError::Transport(detail)
        }
    }
}

/// Why a forward did not produce an upstream response.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error(transparent)]
    Unauthenticated(#[from] AuthError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// A request to forward. The path is given as unencoded segments relative to
/// the configured base URL.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub path: Vec<String>,
    pub query: Option<QueryParams>,
    pub body: Option<Value>,
}

impl UpstreamRequest {
    pub fn new<I, S>(method: Method, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            path: path.into_iter().map(Into::into).collect(),
            query: None,
            body: None,
        }
    }

    pub fn get<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::GET, path)
    }

    pub fn post<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::POST, path)
    }

    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_json<T: Serialize>(self, body: &T) -> Result<Self, UpstreamError> {
        let value =
            serde_json::to_value(body).map_err(|e| UpstreamError::Encode(e.to_string()))?;
        Ok(self.with_body(value))
    }
}

/// Upstream status and body, relayed to the operator as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamGateway {
    base_url: Url,
    http: Client,
}

impl UpstreamGateway {
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self, UpstreamError> {
        if base_url.cannot_be_a_base() {
            return Err(UpstreamError::InvalidUrl(base_url.to_string()));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| UpstreamError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Joins the base URL with percent-encoded path segments and the query.
    pub fn endpoint(
        &self,
        path: &[String],
        query: Option<&QueryParams>,
    ) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(path);
        url.set_query(None);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.set_query(Some(&query.to_query_string()));
        }
        Ok(url)
    }

    /// Forwards `request` with the session's bearer credential.
    ///
    /// Without a credential nothing is sent and [`ForwardError::Unauthenticated`]
    /// is returned. Non-2xx upstream answers are *not* errors here: they come
    /// back as an [`UpstreamResponse`] carrying the original status.
    pub async fn forward(
        &self,
        session: &Session,
        request: UpstreamRequest,
    ) -> Result<UpstreamResponse, ForwardError> {
        let token = session.require()?;
        let url = self.endpoint(&request.path, request.query.as_ref())?;

        let mut builder = self
            .http
            .request(request.method.clone(), url.clone())
            .header(ACCEPT, APPLICATION_JSON)
            .header(AUTHORIZATION, token.bearer());

        if let Some(body) = &request.body {
            let encoded =
                serde_json::to_vec(body).map_err(|e| UpstreamError::Encode(e.to_string()))?;
            builder = builder.header(CONTENT_TYPE, APPLICATION_JSON).body(encoded);
        }

        let response = builder.send().await.map_err(|e| {
            let err = UpstreamError::from_reqwest(e, &request.method, &url);
            warn!(method = %request.method, path = %url.path(), error = %err, "Upstream request failed");
            err
        })?;

        let status = StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        let text = response
            .text()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, &request.method, &url))?;

        info!(
            method = %request.method,
            path = %url.path(),
            status = status.as_u16(),
            "Upstream request forwarded"
        );

        Ok(UpstreamResponse {
            status,
            body: parse_body(&text),
        })
    }

    /// Reachability check for readiness probes. Any HTTP answer counts.
    pub async fn probe(&self) -> Result<StatusCode, UpstreamError> {
        let response = self
            .http
            .get(self.base_url.clone())
            .header(ACCEPT, APPLICATION_JSON)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, &Method::GET, &self.base_url))?;
        Ok(StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY))
    }
}

/// JSON when parseable, `null` when empty, otherwise `{"raw": "<text>"}`.
pub fn parse_body(text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "raw": text }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionToken;
    use httpmock::prelude::*;

    fn gateway(server: &MockServer) -> UpstreamGateway {
        let base = Url::parse(&server.url("/api")).unwrap();
        UpstreamGateway::new(base, None).unwrap()
    }

    fn session() -> Session {
        Session::from_token(SessionToken::new("tok_123").unwrap())
    }

    #[test]
    fn parse_body_wraps_non_json_text() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body(r#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(parse_body("<html>oops</html>"), json!({"raw": "<html>oops</html>"}));
    }

    #[test]
    fn endpoint_encodes_segments_and_keeps_base_path() {
        let gateway =
            UpstreamGateway::new(Url::parse("https://upstream.test/api/").unwrap(), None).unwrap();
        let url = gateway
            .endpoint(
                &["support".into(), "applications".into(), "dealer_form".into(), "a/b c".into()],
                Some(&QueryParams::new().with("limit", "5")),
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://upstream.test/api/support/applications/dealer_form/a%2Fb%20c?limit=5"
        );
    }

    #[test]
    fn rejects_non_base_urls() {
        let err = UpstreamGateway::new(Url::parse("mailto:ops@example.com").unwrap(), None)
            .unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidUrl(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn forwards_get_with_bearer_and_accept_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/support/applications/dealer-forms")
                .query_param("limit", "10")
                .header("authorization", "Bearer tok_123")
                .header("accept", "application/json")
                .header_missing("content-type");
            then.status(200).json_body(json!({"success": true, "data": []}));
        });

        let response = gateway(&server)
            .forward(
                &session(),
                UpstreamRequest::get(["support", "applications", "dealer-forms"])
                    .with_query(QueryParams::new().with("limit", "10")),
            )
            .await
            .unwrap();

        mock.assert();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["success"], true);
    }

    #[tokio::test]
    async fn forwards_json_body_with_content_type() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/support/applications/review")
                .header("content-type", "application/json")
                .json_body(json!({"call_duration": 315}));
            then.status(201).json_body(json!({"success": true}));
        });

        let response = gateway(&server)
            .forward(
                &session(),
                UpstreamRequest::post(["support", "applications", "review"])
                    .with_body(json!({"call_duration": 315})),
            )
            .await
            .unwrap();

        mock.assert();
        assert_eq!(response.status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn relays_upstream_error_status_and_raw_text() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/support/applications/carrier_application/9");
            then.status(500).body("internal database failure");
        });

        let response = gateway(&server)
            .forward(
                &session(),
                UpstreamRequest::get(["support", "applications", "carrier_application", "9"]),
            )
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body, json!({"raw": "internal database failure"}));
    }

    #[tokio::test]
    async fn relays_not_found_unchanged() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(404)
                .json_body(json!({"success": false, "message": "Not found"}));
        });

        let response = gateway(&server)
            .forward(&session(), UpstreamRequest::get(["support", "x"]))
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body["message"], "Not found");
    }

    #[tokio::test]
    async fn missing_session_never_reaches_upstream() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.any_request();
            then.status(200);
        });

        let err = gateway(&server)
            .forward(&Session::anonymous(), UpstreamRequest::get(["support"]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ForwardError::Unauthenticated(AuthError::MissingSession)
        ));
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn transport_failure_is_retryable() {
        // Port 9 (discard) is closed on test hosts.
        let gateway =
            UpstreamGateway::new(Url::parse("http://127.0.0.1:9/api").unwrap(), None).unwrap();
        let err = gateway
            .forward(&session(), UpstreamRequest::get(["support"]))
            .await
            .unwrap_err();
        match err {
            ForwardError::Upstream(e) => assert!(e.is_retryable()),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
