// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! List rows for the three application kinds. Rows already approved or
//! rejected are hidden: the lists are work queues.

use serde::Serialize;
use serde_json::Value;

use super::{list_entries, ApplicationsApi};
use crate::{
    models::{ApplicationType, ListKind, ReviewStatus},
    record::{
        first_present, format_timestamp_tr, is_truthy, status_label, translate_vehicle_type,
        value_to_string,
    },
    upstream::paging::{QueryParams, DEFAULT_LIMIT, DEFAULT_OFFSET},
};

pub const LIST_FAILED_MESSAGE: &str = "Liste getirilemedi.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListRow {
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub application_type: ApplicationType,
}

fn text(entry: &Value, pointers: &[&str]) -> Option<String> {
    first_present(entry, pointers).and_then(value_to_string)
}

fn truthy_text(entry: &Value, pointers: &[&str]) -> Option<String> {
    first_present(entry, pointers)
        .filter(|v| is_truthy(v))
        .and_then(value_to_string)
}

impl ListRow {
    pub fn from_value(kind: ListKind, entry: &Value) -> Self {
        let id = text(entry, &["/id"]).unwrap_or_default();

        let (title, subtitle, phone) = match kind {
            ListKind::CarrierApplications => {
                let first = text(entry, &["/firstName", "/first_name"]).unwrap_or_default();
                let last = text(entry, &["/lastName", "/last_name"]).unwrap_or_default();
                let vehicle = truthy_text(entry, &["/vehicleType", "/vehicle_type"]);
                (
                    format!("{first} {last}").trim().to_string(),
                    vehicle.map(|v| format!("Araç: {}", translate_vehicle_type(Some(&v)))),
                    text(entry, &["/phoneNumber", "/phone"]),
                )
            }
            ListKind::CorporateForms => (
                text(entry, &["/name"]).unwrap_or_default(),
                truthy_text(entry, &["/businessName", "/business_name"])
                    .map(|b| format!("Firma: {b}")),
                text(entry, &["/phone"]),
            ),
            ListKind::DealerForms => (
                text(entry, &["/name"]).unwrap_or_default(),
                truthy_text(entry, &["/subject"]),
                text(entry, &["/phone"]),
            ),
        };

        Self {
            title: if title.is_empty() { id.clone() } else { title },
            id,
            subtitle,
            phone,
            email: text(entry, &["/email"]),
            city: text(entry, &["/city"]),
            status: text(entry, &["/status"]),
            created_at: text(entry, &["/createdAt", "/created_at"]),
            application_type: kind.application_type(),
        }
    }

    /// Still waiting for a decision.
    pub fn is_pending(&self) -> bool {
        !self
            .status
            .as_deref()
            .map(str::to_lowercase)
            .and_then(|s| ReviewStatus::parse(&s))
            .is_some_and(|s| s.is_terminal())
    }

    pub fn status_label(&self) -> &'static str {
        status_label(self.status.as_deref())
    }

    pub fn created_at_display(&self) -> String {
        format_timestamp_tr(self.created_at.as_deref())
    }
}

/// Rows of a list answer, without the ones already decided.
pub fn pending_rows(kind: ListKind, body: &Value) -> Vec<ListRow> {
    list_entries(body)
        .iter()
        .map(|entry| ListRow::from_value(kind, entry))
        .filter(ListRow::is_pending)
        .collect()
}

/// Operator-side list filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: i64,
    pub offset: i64,
    pub status: Option<String>,
    pub search: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: DEFAULT_OFFSET,
            status: None,
            search: None,
        }
    }
}

impl ListQuery {
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new()
            .with("limit", self.limit.to_string())
            .with("offset", self.offset.to_string());
        if let Some(status) = self.status.as_deref().filter(|s| !s.is_empty()) {
            params.set("status", status);
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            params.set("search", search);
        }
        params
    }
}

/// Fetches one page and keeps the pending rows. Errors are operator messages.
pub async fn load_list<A: ApplicationsApi>(
    api: &A,
    kind: ListKind,
    query: &ListQuery,
) -> Result<Vec<ListRow>, String> {
    match api.fetch_list(kind, &query.to_params()).await {
        Ok(reply) if reply.is_success() => Ok(pending_rows(kind, &reply.body)),
        Ok(reply) => Err(reply.error_message()),
        Err(_) => Err(LIST_FAILED_MESSAGE.to_string()),
    }
}
