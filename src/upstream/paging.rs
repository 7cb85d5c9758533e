// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Query parameters and pagination bounds.

use url::form_urlencoded;

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 200;
pub const DEFAULT_OFFSET: i64 = 0;

/// Ordered query parameters. Duplicate keys are preserved as received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw (undecoded) query string.
    pub fn parse(raw: Option<&str>) -> Self {
        let pairs = raw
            .map(|q| {
                form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        Self(pairs)
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replaces the first value for `key` and drops any duplicates, or
    /// appends the pair when the key is absent.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter().position(|(k, _)| k == key) {
            Some(first) => {
                self.0[first].1 = value;
                let mut index = 0;
                self.0.retain(|(k, _)| {
                    let keep = k != key || index == first;
                    index += 1;
                    keep
                });
            }
            None => self.0.push((key.to_string(), value)),
        }
    }

    pub fn append(&mut self, key: &str, value: impl Into<String>) {
        self.0.push((key.to_string(), value.into()));
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Percent-encoded `a=1&b=2` form.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

/// Clamps `limit` into `[1, 200]` and `offset` into `[0, ∞)`.
///
/// Absent, blank or non-numeric values fall back to the defaults (50 / 0).
/// A parameter is only rewritten when its normalized value differs from what
/// was sent; an absent parameter equal to its default stays absent. Applying
/// this twice yields the same parameters as applying it once.
pub fn normalize_paging(params: &mut QueryParams) {
    let limit_raw = params.get("limit").map(str::to_string);
    let offset_raw = params.get("offset").map(str::to_string);

    let limit = numeric(limit_raw.as_deref(), DEFAULT_LIMIT)
        .map(|v| v.clamp(1, MAX_LIMIT))
        .unwrap_or(DEFAULT_LIMIT);
    let offset = numeric(offset_raw.as_deref(), DEFAULT_OFFSET)
        .map(|v| v.max(0))
        .unwrap_or(DEFAULT_OFFSET);

    if differs(limit, limit_raw.as_deref(), DEFAULT_LIMIT) {
        params.set("limit", limit.to_string());
    }
    if differs(offset, offset_raw.as_deref(), DEFAULT_OFFSET) {
        params.set("offset", offset.to_string());
    }
}

/// Floored numeric value of a raw parameter; `None` when non-finite.
/// Empty (or absent) raw values take the default, whitespace-only ones read as 0.
fn numeric(raw: Option<&str>, default: i64) -> Option<i64> {
    let value = match raw {
        None | Some("") => default as f64,
        Some(text) if text.trim().is_empty() => 0.0,
        Some(text) => text.trim().parse::<f64>().ok()?,
    };
    if !value.is_finite() {
        return None;
    }
    Some(value.floor().clamp(i64::MIN as f64, i64::MAX as f64) as i64)
}

fn differs(normalized: i64, raw: Option<&str>, default: i64) -> bool {
    match raw {
        Some(raw) => raw != normalized.to_string(),
        None => normalized != default,
    }
}
