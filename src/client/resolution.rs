// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Detail Resolution
//!
//! Loads one application record for the detail view.
//!
//! 1. The detail endpoint is asked first. A successful answer is unwrapped
//!    ([`unwrap_payload`]) and becomes the record.
//! 2. If that fails, dealer and corporate forms get a second chance: the
//!    matching list is fetched (200 rows from offset 0) and scanned for the
//!    id. Carrier applications fail straight away.
//!
//! Every load runs under a fresh generation number and cancellation token.
//! Starting a new load cancels the previous one, and a load that has been
//! overtaken never writes to the visible state.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Mutex, MutexGuard, PoisonError,
};

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{list_entries, ApplicationsApi};
use crate::{
    models::{ApplicationType, ListKind},
    record::{is_truthy, value_to_string, ApplicationRecord},
    upstream::QueryParams,
};

pub const FALLBACK_PAGE_LIMIT: &str = "200";
pub const FALLBACK_PAGE_OFFSET: &str = "0";

pub const NOT_FOUND_MESSAGE: &str = "Başvuru kaydı bulunamadı.";
pub const DETAIL_UNAVAILABLE_MESSAGE: &str = "Başvuru detayı getirilemedi.";
pub const TECHNICAL_ERROR_MESSAGE: &str =
    "Başvuru detayı alınırken teknik bir hata oluştu. Lütfen tekrar deneyin veya teknik ekibe iletin.";

/// Marker of a database type error leaking through upstream.
const QUERY_ARGUMENT_ERROR: &str = "invalid input for query argument";

/// Application types that may be recovered from their list endpoint.
const FALLBACK: &[(ApplicationType, ListKind)] = &[
    (ApplicationType::DealerForm, ListKind::DealerForms),
    (ApplicationType::CorporateForm, ListKind::CorporateForms),
];

pub fn fallback_route(application_type: ApplicationType) -> Option<ListKind> {
    FALLBACK
        .iter()
        .find(|(ty, _)| *ty == application_type)
        .map(|(_, kind)| *kind)
}

/// Strips response envelopes: `data`, else `result`, else the value itself.
/// A remaining `data` wrapper without an `id` is removed once more.
pub fn unwrap_payload(raw: Value) -> Value {
    let inner = raw.as_object().and_then(|map| {
        map.get("data")
            .filter(|v| is_truthy(v))
            .or_else(|| map.get("result").filter(|v| is_truthy(v)))
            .cloned()
    });
    let mut value = inner.unwrap_or(raw);

    let double_wrapped = value.as_object().is_some_and(|map| {
        map.contains_key("data") && !map.get("id").is_some_and(is_truthy)
    });
    if double_wrapped {
        value = value
            .as_object_mut()
            .and_then(|map| map.remove("data"))
            .unwrap_or(Value::Null);
    }
    value
}

/// Replaces raw query-argument errors with the operator-facing technical message.
pub fn friendly_message(message: &str) -> String {
    if message.to_lowercase().contains(QUERY_ARGUMENT_ERROR) {
        TECHNICAL_ERROR_MESSAGE.to_string()
    } else {
        message.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Resolved(ApplicationRecord),
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResolutionState {
    #[default]
    Idle,
    Loading,
    Resolved(ApplicationRecord),
    Failed(String),
}

/// Resolves one record without touching any shared state.
pub async fn resolve<A: ApplicationsApi>(
    api: &A,
    application_type: ApplicationType,
    application_id: &str,
) -> Outcome {
    let primary_error = match api.fetch_detail(application_type, application_id).await {
        Ok(reply) if reply.is_success() => {
            return Outcome::Resolved(ApplicationRecord::from_value(unwrap_payload(reply.body)));
        }
        Ok(reply) => reply.error_message(),
        Err(err) => {
            warn!(error = %err, %application_type, "Detail fetch failed");
            DETAIL_UNAVAILABLE_MESSAGE.to_string()
        }
    };

    let Some(kind) = fallback_route(application_type) else {
        return Outcome::Failed(friendly_message(&primary_error));
    };

    debug!(%application_type, %kind, error = %primary_error, "Falling back to list scan");
    match scan_list(api, kind, application_id).await {
        Some(entry) => Outcome::Resolved(ApplicationRecord::from_value(unwrap_payload(entry))),
        None => Outcome::Failed(NOT_FOUND_MESSAGE.to_string()),
    }
}

async fn scan_list<A: ApplicationsApi>(
    api: &A,
    kind: ListKind,
    application_id: &str,
) -> Option<Value> {
    let query = QueryParams::new()
        .with("limit", FALLBACK_PAGE_LIMIT)
        .with("offset", FALLBACK_PAGE_OFFSET);

    let reply = match api.fetch_list(kind, &query).await {
        Ok(reply) if reply.is_success() => reply,
        Ok(reply) => {
            debug!(%kind, status = reply.status, "Fallback list fetch rejected");
            return None;
        }
        Err(err) => {
            warn!(%kind, error = %err, "Fallback list fetch failed");
            return None;
        }
    };

    list_entries(&reply.body)
        .iter()
        .find(|entry| {
            entry
                .get("id")
                .and_then(value_to_string)
                .is_some_and(|id| id == application_id)
        })
        .cloned()
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadResult {
    /// The outcome was written to the visible state.
    Committed(Outcome),
    /// A newer load started first; nothing was written.
    Superseded,
}

/// Detail view state for one (type, id) pair.
pub struct DetailResolver<A> {
    api: A,
    application_type: ApplicationType,
    application_id: String,
    generation: AtomicU64,
    in_flight: Mutex<CancellationToken>,
    state: Mutex<ResolutionState>,
}

impl<A: ApplicationsApi> DetailResolver<A> {
    pub fn new(
        api: A,
        application_type: ApplicationType,
        application_id: impl Into<String>,
    ) -> Self {
        Self {
            api,
            application_type,
            application_id: application_id.into(),
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(CancellationToken::new()),
            state: Mutex::new(ResolutionState::Idle),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn application_type(&self) -> ApplicationType {
        self.application_type
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    pub fn state(&self) -> ResolutionState {
        lock(&self.state).clone()
    }

    /// The resolved record, if the last committed load succeeded.
    pub fn record(&self) -> Option<ApplicationRecord> {
        match &*lock(&self.state) {
            ResolutionState::Resolved(record) => Some(record.clone()),
            _ => None,
        }
    }

    /// Cancels the in-flight load, if any.
    pub fn cancel(&self) {
        lock(&self.in_flight).cancel();
    }

    /// Starts a new load, superseding any load still running.
    pub async fn load(&self) -> LoadResult {
        let token = CancellationToken::new();
        let generation = {
            let mut in_flight = lock(&self.in_flight);
            in_flight.cancel();
            *in_flight = token.clone();
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *lock(&self.state) = ResolutionState::Loading;
            generation
        };

        let outcome = tokio::select! {
            _ = token.cancelled() => return LoadResult::Superseded,
            outcome = resolve(&self.api, self.application_type, &self.application_id) => outcome,
        };

        let mut state = lock(&self.state);
        if token.is_cancelled() || self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "Discarding superseded detail load");
            return LoadResult::Superseded;
        }
        *state = match &outcome {
            Outcome::Resolved(record) => ResolutionState::Resolved(record.clone()),
            Outcome::Failed(message) => ResolutionState::Failed(message.clone()),
        };
        LoadResult::Committed(outcome)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use tokio::sync::Notify;

    use super::*;
    use crate::client::{
        fake::{ok, status, Call, FakeApi},
        ClientError,
    };

    #[test]
    fn unwrap_prefers_data_then_result() {
        assert_eq!(unwrap_payload(json!({"data": {"id": 1}})), json!({"id": 1}));
        assert_eq!(unwrap_payload(json!({"result": {"id": 2}})), json!({"id": 2}));
        assert_eq!(
            unwrap_payload(json!({"data": null, "result": {"id": 3}})),
            json!({"id": 3})
        );
        assert_eq!(unwrap_payload(json!({"id": 4})), json!({"id": 4}));
    }

    #[test]
    fn unwrap_handles_double_wrapping() {
        assert_eq!(
            unwrap_payload(json!({"success": true, "data": {"data": {"id": 5}}})),
            json!({"id": 5})
        );
        // A record with a real id keeps its own `data` field.
        assert_eq!(
            unwrap_payload(json!({"data": {"id": 6, "data": "payload"}})),
            json!({"id": 6, "data": "payload"})
        );
    }

    #[test]
    fn only_dealer_and_corporate_fall_back() {
        assert_eq!(
            fallback_route(ApplicationType::DealerForm),
            Some(ListKind::DealerForms)
        );
        assert_eq!(
            fallback_route(ApplicationType::CorporateForm),
            Some(ListKind::CorporateForms)
        );
        assert_eq!(fallback_route(ApplicationType::CarrierApplication), None);
    }

    #[test]
    fn database_errors_are_masked() {
        assert_eq!(
            friendly_message("Invalid input for query argument $1: 'abc'"),
            TECHNICAL_ERROR_MESSAGE
        );
        assert_eq!(friendly_message("HTTP 404"), "HTTP 404");
    }

    #[tokio::test]
    async fn resolves_from_primary_fetch() {
        let api =
            FakeApi::new().detail(ok(json!({"success": true, "data": {"id": "12", "name": "Ali"}})));
        match resolve(&api, ApplicationType::DealerForm, "12").await {
            Outcome::Resolved(record) => assert_eq!(record.contact.name, "Ali"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn dealer_falls_back_to_list_scan() {
        let api = FakeApi::new()
            .detail(status(500, json!({"message": "boom"})))
            .list(ok(json!({"data": [{"id": 11}, {"id": 12, "email": "x@y.z"}]})));

        let outcome = resolve(&api, ApplicationType::DealerForm, "12").await;
        match outcome {
            Outcome::Resolved(record) => {
                assert_eq!(record.id.as_deref(), Some("12"));
                assert_eq!(record.contact.email, "x@y.z");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let expected_query = QueryParams::new().with("limit", "200").with("offset", "0");
        assert_eq!(
            api.calls()[1],
            Call::List(ListKind::DealerForms, expected_query)
        );
    }

    #[tokio::test]
    async fn fallback_matches_integral_float_ids() {
        let api = FakeApi::new()
            .detail(status(404, json!({})))
            .list(ok(json!({"data": [{"id": 11.5}, {"id": 12.0, "name": "Bayi"}]})));
        match resolve(&api, ApplicationType::DealerForm, "12").await {
            Outcome::Resolved(record) => assert_eq!(record.id.as_deref(), Some("12")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn corporate_fallback_accepts_bare_arrays_and_explicit_failure_flags() {
        let api = FakeApi::new()
            .detail(ok(json!({"success": false, "message": "nope"})))
            .list(ok(json!([{"id": "C-1", "businessName": "Acme"}])));
        let outcome = resolve(&api, ApplicationType::CorporateForm, "C-1").await;
        assert!(matches!(outcome, Outcome::Resolved(_)));
    }

    #[tokio::test]
    async fn missing_fallback_entry_is_not_found() {
        let api = FakeApi::new()
            .detail(status(404, json!({})))
            .list(ok(json!({"data": [{"id": 1}]})));
        assert_eq!(
            resolve(&api, ApplicationType::DealerForm, "2").await,
            Outcome::Failed(NOT_FOUND_MESSAGE.into())
        );

        let api = FakeApi::new()
            .detail(Err(ClientError::Transport("down".into())))
            .list(status(503, json!({"message": "maintenance"})));
        assert_eq!(
            resolve(&api, ApplicationType::CorporateForm, "2").await,
            Outcome::Failed(NOT_FOUND_MESSAGE.into())
        );
    }

    #[tokio::test]
    async fn carrier_never_falls_back() {
        let api = FakeApi::new().detail(status(
            500,
            json!({"error": {"message": "invalid input for query argument $1"}}),
        ));
        assert_eq!(
            resolve(&api, ApplicationType::CarrierApplication, "9").await,
            Outcome::Failed(TECHNICAL_ERROR_MESSAGE.into())
        );
        assert!(api
            .calls()
            .iter()
            .all(|call| !matches!(call, Call::List(..))));

        let api = FakeApi::new().detail(Err(ClientError::Transport("refused".into())));
        assert_eq!(
            resolve(&api, ApplicationType::CarrierApplication, "9").await,
            Outcome::Failed(DETAIL_UNAVAILABLE_MESSAGE.into())
        );
    }

    #[tokio::test]
    async fn resolver_commits_outcome_to_state() {
        let resolver = DetailResolver::new(
            FakeApi::new().detail(status(404, json!({"message": "Kayıt yok"}))),
            ApplicationType::CarrierApplication,
            "3",
        );
        assert_eq!(resolver.state(), ResolutionState::Idle);
        assert_eq!(
            resolver.load().await,
            LoadResult::Committed(Outcome::Failed("Kayıt yok".into()))
        );
        assert_eq!(resolver.state(), ResolutionState::Failed("Kayıt yok".into()));
        assert!(resolver.record().is_none());
    }

    #[tokio::test]
    async fn superseded_load_never_commits() {
        let gate = Arc::new(Notify::new());
        let api = FakeApi::gated(gate.clone())
            .detail(ok(json!({"data": {"id": "1", "name": "stale"}})))
            .detail(ok(json!({"data": {"id": "1", "name": "fresh"}})));
        let resolver = DetailResolver::new(api, ApplicationType::CarrierApplication, "1");

        let (first, second) = tokio::join!(resolver.load(), resolver.load());

        assert_eq!(first, LoadResult::Superseded);
        match second {
            LoadResult::Committed(Outcome::Resolved(record)) => {
                assert_eq!(record.contact.name, "fresh")
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(resolver.record().unwrap().contact.name, "fresh");

        // Releasing the stale request afterwards changes nothing.
        gate.notify_waiters();
        assert_eq!(resolver.record().unwrap().contact.name, "fresh");
    }
}
