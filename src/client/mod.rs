// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Operator-side Client
//!
//! The back-office side of the review workflow: it talks to this service's
//! `/api/support` endpoints through [`ApplicationsApi`] and drives the detail,
//! review, blacklist and list views.
//!
//! - [`resolution`] - detail loading with the list-scan fallback
//! - [`review`] - review form and submission
//! - [`blacklist`] - two-step blacklist enrollment
//! - [`listing`] - list rows for the three application kinds
//! - [`http`] - [`ApplicationsApi`] over HTTP

use std::{future::Future, sync::Arc};

use serde_json::Value;

use crate::{
    models::{ApplicationType, BlacklistEntry, ListKind, ReviewSubmission},
    record::{is_truthy, value_to_string},
    upstream::QueryParams,
    validation::ContactLookup,
};

pub mod blacklist;
pub mod http;
pub mod listing;
pub mod resolution;
pub mod review;

/// Status and body of a gateway answer, whatever the status.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    pub status: u16,
    pub body: Value,
}

impl ApiReply {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// 2xx without an explicit `"success": false` in the body.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status) && self.body.get("success") != Some(&Value::Bool(false))
    }

    /// Message carried by the body, or `HTTP <status>`.
    pub fn error_message(&self) -> String {
        pick_message(&self.body).unwrap_or_else(|| format!("HTTP {}", self.status))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The gateway could not be reached or its answer could not be read.
    #[error("gateway request failed: {0}")]
    Transport(String),
}

/// First truthy of `error.message`, `message`, `detail`, `title`.
pub fn pick_message(body: &Value) -> Option<String> {
    ["/error/message", "/message", "/detail", "/title"]
        .iter()
        .filter_map(|p| body.pointer(p))
        .find(|v| is_truthy(v))
        .and_then(value_to_string)
}

/// Entries of a list answer: `data` when it is an array, else the body
/// itself when it is an array, else nothing.
pub fn list_entries(body: &Value) -> &[Value] {
    match (body.get("data"), body) {
        (Some(Value::Array(entries)), _) => entries,
        (_, Value::Array(entries)) => entries,
        _ => &[],
    }
}

/// The gateway operations the operator views use. Non-2xx answers are
/// returned as [`ApiReply`]s; only transport failures are errors.
pub trait ApplicationsApi: Send + Sync {
    fn fetch_detail(
        &self,
        application_type: ApplicationType,
        application_id: &str,
    ) -> impl Future<Output = Result<ApiReply, ClientError>> + Send;

    fn fetch_list(
        &self,
        kind: ListKind,
        query: &QueryParams,
    ) -> impl Future<Output = Result<ApiReply, ClientError>> + Send;

    fn submit_review(
        &self,
        review: &ReviewSubmission,
    ) -> impl Future<Output = Result<ApiReply, ClientError>> + Send;

    fn enroll_blacklist(
        &self,
        entry: &BlacklistEntry,
    ) -> impl Future<Output = Result<ApiReply, ClientError>> + Send;

    fn check_blacklist(
        &self,
        lookup: &ContactLookup,
    ) -> impl Future<Output = Result<ApiReply, ClientError>> + Send;
}

impl<T: ApplicationsApi> ApplicationsApi for Arc<T> {
    fn fetch_detail(
        &self,
        application_type: ApplicationType,
        application_id: &str,
    ) -> impl Future<Output = Result<ApiReply, ClientError>> + Send {
        (**self).fetch_detail(application_type, application_id)
    }

    fn fetch_list(
        &self,
        kind: ListKind,
        query: &QueryParams,
    ) -> impl Future<Output = Result<ApiReply, ClientError>> + Send {
        (**self).fetch_list(kind, query)
    }

    fn submit_review(
        &self,
        review: &ReviewSubmission,
    ) -> impl Future<Output = Result<ApiReply, ClientError>> + Send {
        (**self).submit_review(review)
    }

    fn enroll_blacklist(
        &self,
        entry: &BlacklistEntry,
    ) -> impl Future<Output = Result<ApiReply, ClientError>> + Send {
        (**self).enroll_blacklist(entry)
    }

    fn check_blacklist(
        &self,
        lookup: &ContactLookup,
    ) -> impl Future<Output = Result<ApiReply, ClientError>> + Send {
        (**self).check_blacklist(lookup)
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! Scripted in-memory [`ApplicationsApi`].

    use std::{
        collections::VecDeque,
        sync::{Arc, Mutex},
    };

    use tokio::sync::Notify;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Detail(ApplicationType, String),
        List(ListKind, QueryParams),
        Review(ReviewSubmission),
        Enroll(BlacklistEntry),
        Check(ContactLookup),
    }

    type Script = Mutex<VecDeque<Result<ApiReply, ClientError>>>;

    #[derive(Default)]
    pub struct FakeApi {
        details: Script,
        lists: Script,
        writes: Script,
        calls: Mutex<Vec<Call>>,
        /// When set, the first detail fetch waits on this before answering.
        gate: Option<Arc<Notify>>,
    }

    pub fn ok(body: Value) -> Result<ApiReply, ClientError> {
        Ok(ApiReply::new(200, body))
    }

    pub fn status(code: u16, body: Value) -> Result<ApiReply, ClientError> {
        Ok(ApiReply::new(code, body))
    }

    impl FakeApi {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn gated(gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::default()
            }
        }

        pub fn detail(self, reply: Result<ApiReply, ClientError>) -> Self {
            self.details.lock().unwrap().push_back(reply);
            self
        }

        pub fn list(self, reply: Result<ApiReply, ClientError>) -> Self {
            self.lists.lock().unwrap().push_back(reply);
            self
        }

        /// Reply for the next review, enroll or check call.
        pub fn write(self, reply: Result<ApiReply, ClientError>) -> Self {
            self.writes.lock().unwrap().push_back(reply);
            self
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) -> usize {
            let mut calls = self.calls.lock().unwrap();
            calls.push(call);
            calls.len()
        }

        fn next(script: &Script) -> Result<ApiReply, ClientError> {
            script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ClientError::Transport("no scripted reply".into())))
        }
    }

    impl ApplicationsApi for FakeApi {
        async fn fetch_detail(
            &self,
            application_type: ApplicationType,
            application_id: &str,
        ) -> Result<ApiReply, ClientError> {
            let first_detail = !self
                .calls()
                .iter()
                .any(|c| matches!(c, Call::Detail(..)));
            self.record(Call::Detail(application_type, application_id.to_string()));
            let reply = Self::next(&self.details);
            if let (true, Some(gate)) = (first_detail, &self.gate) {
                gate.notified().await;
            }
            reply
        }

        async fn fetch_list(
            &self,
            kind: ListKind,
            query: &QueryParams,
        ) -> Result<ApiReply, ClientError> {
            self.record(Call::List(kind, query.clone()));
            Self::next(&self.lists)
        }

        async fn submit_review(&self, review: &ReviewSubmission) -> Result<ApiReply, ClientError> {
            self.record(Call::Review(review.clone()));
            Self::next(&self.writes)
        }

        async fn enroll_blacklist(
            &self,
            entry: &BlacklistEntry,
        ) -> Result<ApiReply, ClientError> {
            self.record(Call::Enroll(entry.clone()));
            Self::next(&self.writes)
        }

        async fn check_blacklist(&self, lookup: &ContactLookup) -> Result<ApiReply, ClientError> {
            self.record(Call::Check(lookup.clone()));
            Self::next(&self.writes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_requires_2xx_and_no_false_flag() {
        assert!(ApiReply::new(200, json!({"data": {}})).is_success());
        assert!(ApiReply::new(204, Value::Null).is_success());
        assert!(!ApiReply::new(200, json!({"success": false})).is_success());
        assert!(!ApiReply::new(404, json!({"success": true})).is_success());
    }

    #[test]
    fn error_message_priority() {
        let body = json!({
            "error": {"message": "nested"},
            "message": "top",
            "detail": "detail",
            "title": "title"
        });
        assert_eq!(pick_message(&body).as_deref(), Some("nested"));
        assert_eq!(
            pick_message(&json!({"message": "", "detail": "d"})).as_deref(),
            Some("d")
        );
        assert_eq!(pick_message(&json!({"title": "t"})).as_deref(), Some("t"));
        assert_eq!(ApiReply::new(502, json!({"raw": "<html>"})).error_message(), "HTTP 502");
    }

    #[test]
    fn list_entries_accepts_wrapped_and_bare_arrays() {
        assert_eq!(list_entries(&json!({"data": [1, 2]})).len(), 2);
        assert_eq!(list_entries(&json!([1])).len(), 1);
        assert!(list_entries(&json!({"data": {"items": []}})).is_empty());
        assert!(list_entries(&Value::Null).is_empty());
    }
}
