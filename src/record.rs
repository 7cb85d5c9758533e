// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Application Records
//!
//! Upstream returns application records in several shapes: camelCase and
//! snake_case keys, review data either nested under `review` or flattened,
//! phone numbers under `phone` or `phoneNumber`. [`reconcile`] resolves all of
//! those through one alias table ([`RECORD_FIELDS`]) and
//! [`ApplicationRecord::from_value`] turns the result into a typed record.
//!
//! Display helpers used by the operator views live here too: status and
//! vehicle labels, Istanbul-time timestamps and document links.

use std::{collections::BTreeMap, sync::LazyLock};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::{duration, models::ReviewStatus};

/// Canonical field name and the JSON pointers it may be found at, in priority order.
pub type FieldAliases = (&'static str, &'static [&'static str]);

pub const RECORD_FIELDS: &[FieldAliases] = &[
    ("id", &["/id"]),
    ("name", &["/name"]),
    ("first_name", &["/firstName", "/first_name"]),
    ("last_name", &["/lastName", "/last_name"]),
    ("email", &["/email"]),
    ("phone", &["/phone", "/phoneNumber", "/phone_number"]),
    ("city", &["/city"]),
    ("status", &["/status"]),
    ("created_at", &["/createdAt", "/created_at"]),
    ("review_status", &["/review/status"]),
    (
        "review_notes",
        &[
            "/review/reviewNotes",
            "/review/review_notes",
            "/reviewNotes",
            "/review_notes",
        ],
    ),
    (
        "call_duration",
        &[
            "/review/callDuration",
            "/review/call_duration",
            "/callDuration",
            "/call_duration",
        ],
    ),
    (
        "call_duration_formatted",
        &[
            "/review/callDurationFormatted",
            "/review/call_duration_formatted",
            "/callDurationFormatted",
            "/call_duration_formatted",
        ],
    ),
    ("reviewed_at", &["/review/reviewedAt", "/review/reviewed_at"]),
    ("subject", &["/subject"]),
    ("message", &["/message"]),
    ("business_name", &["/businessName", "/business_name"]),
    ("vehicle_type", &["/vehicleType", "/vehicle_type"]),
    (
        "vehicle_registration_year",
        &["/vehicleRegistrationYear", "/vehicle_registration_year"],
    ),
];

/// Known document fields and their fixed labels.
const KNOWN_DOCUMENTS: &[(&str, &[&str])] = &[
    (
        "Araç Belgeleri",
        &["/vehicleDocumentsUrl", "/vehicle_documents_url"],
    ),
    (
        "Taşıyıcı Belgeleri",
        &["/carrierDocumentsUrl", "/carrier_documents_url"],
    ),
];

const DEFAULT_DOCUMENT_LABEL: &str = "Belge";
const MISSING: &str = "-";
const ISTANBUL_OFFSET_SECS: i32 = 3 * 3600;

static HTTP_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("url pattern is valid"));
static CAMEL_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").expect("camel pattern is valid"));

// =============================================================================
// Loose JSON helpers
// =============================================================================

/// First non-null value found at any of `pointers`.
pub fn first_present<'a>(value: &'a Value, pointers: &[&str]) -> Option<&'a Value> {
    pointers
        .iter()
        .filter_map(|p| value.pointer(p))
        .find(|v| !v.is_null())
}

/// Scalar rendered as text; `null` becomes `None`.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        other => Some(other.to_string()),
    }
}

/// Integral floats render without a fraction, so `12.0` reads as `12`.
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if !n.is_i64() && !n.is_u64() && f.fract() == 0.0 && f.abs() < 1e15 => {
            (f as i64).to_string()
        }
        _ => n.to_string(),
    }
}

/// Loose truthiness: `null`, `false`, `0` and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Resolves every canonical field in `table` against `raw`. Fields with no
/// non-null alias are omitted.
pub fn reconcile(raw: &Value, table: &[FieldAliases]) -> BTreeMap<&'static str, Value> {
    table
        .iter()
        .filter_map(|(field, pointers)| {
            first_present(raw, pointers).map(|value| (*field, value.clone()))
        })
        .collect()
}

// =============================================================================
// Typed record
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Contact {
    /// `name`, or `first_name last_name` when `name` is blank.
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Contact {
    /// All three identity fields are non-blank.
    pub fn is_complete(&self) -> bool {
        [&self.name, &self.email, &self.phone]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewRecord {
    pub status: Option<String>,
    pub notes: Option<String>,
    pub call_duration_seconds: Option<u64>,
    pub call_duration_formatted: Option<String>,
    pub reviewed_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationDetails {
    pub subject: Option<String>,
    pub message: Option<String>,
    pub business_name: Option<String>,
    pub vehicle_type: Option<String>,
    pub vehicle_registration_year: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationRecord {
    pub id: Option<String>,
    pub contact: Contact,
    pub city: Option<String>,
    pub created_at: Option<String>,
    pub status: Option<String>,
    pub review: ReviewRecord,
    pub details: ApplicationDetails,
    /// The record exactly as upstream sent it.
    pub raw: Value,
}

impl ApplicationRecord {
    pub fn from_value(raw: Value) -> Self {
        let fields = reconcile(&raw, RECORD_FIELDS);
        let text = |name: &str| fields.get(name).and_then(value_to_string);
        let trimmed = |name: &str| text(name).map(|s| s.trim().to_string()).unwrap_or_default();

        let name = {
            let name = trimmed("name");
            if name.is_empty() {
                format!("{} {}", trimmed("first_name"), trimmed("last_name"))
                    .trim()
                    .to_string()
            } else {
                name
            }
        };

        let call_duration_seconds = fields.get("call_duration").and_then(|v| match v {
            Value::Number(n) => n
                .as_f64()
                .and_then(|f| duration::CallDuration::from_number(f).ok())
                .map(|d| d.seconds()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        });

        Self {
            id: text("id"),
            contact: Contact {
                name,
                email: trimmed("email"),
                phone: trimmed("phone"),
            },
            city: text("city"),
            created_at: text("created_at"),
            status: text("status"),
            review: ReviewRecord {
                status: text("review_status"),
                notes: text("review_notes"),
                call_duration_seconds,
                call_duration_formatted: text("call_duration_formatted"),
                reviewed_at: text("reviewed_at"),
            },
            details: ApplicationDetails {
                subject: text("subject"),
                message: text("message"),
                business_name: text("business_name"),
                vehicle_type: text("vehicle_type"),
                vehicle_registration_year: text("vehicle_registration_year"),
            },
            raw,
        }
    }

    /// Record status, falling back to the nested review status. Unknown or
    /// missing values read as pending.
    pub fn effective_status(&self) -> ReviewStatus {
        self.status
            .as_deref()
            .or(self.review.status.as_deref())
            .map(|s| s.to_lowercase())
            .and_then(|s| ReviewStatus::parse(&s))
            .unwrap_or_default()
    }

    /// Stored call duration in `"M:SS"` form. Canonical seconds win over a
    /// pre-formatted string; nothing stored reads as `"0:00"`.
    pub fn display_duration(&self) -> String {
        match (
            self.review.call_duration_seconds,
            &self.review.call_duration_formatted,
        ) {
            (Some(seconds), _) => duration::format(seconds),
            (None, Some(formatted)) => formatted.clone(),
            (None, None) => duration::format(0),
        }
    }

    pub fn status_label(&self) -> &'static str {
        status_label(self.status.as_deref())
    }

    pub fn documents(&self) -> Vec<DocumentLink> {
        document_links(&self.raw)
    }
}

// =============================================================================
// Display helpers
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentLink {
    pub label: String,
    pub url: String,
}

/// Known document fields first, then every other top-level http(s) string
/// field labelled from its key. A URL is listed at most once.
pub fn document_links(raw: &Value) -> Vec<DocumentLink> {
    let mut links: Vec<DocumentLink> = KNOWN_DOCUMENTS
        .iter()
        .filter_map(|(label, pointers)| {
            first_present(raw, pointers)
                .filter(|v| is_truthy(v))
                .and_then(value_to_string)
                .map(|url| DocumentLink {
                    label: label.to_string(),
                    url,
                })
        })
        .collect();

    let Some(object) = raw.as_object() else {
        return links;
    };

    for (key, value) in object {
        let Some(url) = value.as_str().map(str::trim) else {
            continue;
        };
        if !HTTP_URL.is_match(url) || links.iter().any(|l| l.url == url) {
            continue;
        }
        links.push(DocumentLink {
            label: document_label(key),
            url: url.to_string(),
        });
    }

    links
}

/// `extraDocumentUrl` → `Extra Document`, `tax_certificate_url` → `Tax certificate`.
pub fn document_label(key: &str) -> String {
    let stripped = strip_suffix_ignore_case(key, "url");
    let stripped = strip_suffix_ignore_case(stripped, "_url");
    let spaced = stripped.replace(['_', '-'], " ");
    let spaced = CAMEL_BOUNDARY.replace_all(&spaced, "$1 $2");
    let label = spaced.trim();

    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => DEFAULT_DOCUMENT_LABEL.to_string(),
    }
}

fn strip_suffix_ignore_case<'a>(value: &'a str, suffix: &str) -> &'a str {
    let split = value.len().wrapping_sub(suffix.len());
    match value.get(split..) {
        Some(tail) if value.len() >= suffix.len() && tail.eq_ignore_ascii_case(suffix) => {
            &value[..split]
        }
        _ => value,
    }
}

/// Turkish vehicle label; unknown types are shown as sent, missing as `-`.
pub fn translate_vehicle_type(vehicle_type: Option<&str>) -> String {
    let Some(raw) = vehicle_type.filter(|v| !v.is_empty()) else {
        return MISSING.to_string();
    };
    match raw.trim().to_lowercase().as_str() {
        "motorcycle" => "Motosiklet",
        "minivan" => "Minivan",
        "panelvan" => "Panelvan",
        "pickup" => "Kamyonet",
        "truck" => "Kamyon",
        _ => raw,
    }
    .to_string()
}

/// Badge label for a raw status value; anything unrecognized is pending.
pub fn status_label(status: Option<&str>) -> &'static str {
    status
        .map(str::to_lowercase)
        .and_then(|s| ReviewStatus::parse(&s))
        .unwrap_or_default()
        .label()
}

/// Formats an upstream timestamp in Istanbul time as `dd.mm.yyyy HH:MM:SS`.
///
/// Missing values render as `-`. Timestamps without an offset are taken as
/// UTC. Unparseable input is returned unchanged.
pub fn format_timestamp_tr(timestamp: Option<&str>) -> String {
    let Some(raw) = timestamp.filter(|t| !t.is_empty()) else {
        return MISSING.to_string();
    };
    let Some(istanbul) = FixedOffset::east_opt(ISTANBUL_OFFSET_SECS) else {
        return raw.to_string();
    };
    match parse_timestamp(raw) {
        Some(instant) => instant
            .with_timezone(&istanbul)
            .format("%d.%m.%Y %H:%M:%S")
            .to_string(),
        None => raw.to_string(),
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
