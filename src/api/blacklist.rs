// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
};
use utoipa::IntoParams;

use crate::{
    auth::Session,
    error::{ApiError, ErrorBody},
    models::BlacklistEntry,
    state::AppState,
    upstream::{QueryParams, UpstreamRequest, UpstreamResponse},
    validation::{parse_body, validate_blacklist, validate_contact_lookup},
};

#[utoipa::path(
    post,
    path = "/api/support/applications/blacklist",
    request_body = BlacklistEntry,
    tag = "Blacklist",
    responses(
        (status = 200, description = "Upstream answer, relayed unmodified"),
        (status = 400, description = "A field failed validation", body = ErrorBody),
        (status = 401, description = "No operator session", body = ErrorBody)
    )
)]
pub async fn enroll(
    State(state): State<AppState>,
    session: Session,
    body: Bytes,
) -> Result<UpstreamResponse, ApiError> {
    let entry = validate_blacklist(&parse_body(&body)?)?;

    let request =
        UpstreamRequest::post(["support", "applications", "blacklist"]).with_json(&entry)?;
    Ok(state.gateway.forward(&session, request).await?)
}

/// Documented lookup parameters. A repeated key keeps its first value.
#[derive(Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BlacklistCheckQuery {
    /// Contact email to look up.
    pub email: Option<String>,
    /// Contact phone to look up.
    pub phone: Option<String>,
}

/// Asks upstream whether a contact is blacklisted. At least one of
/// `email` / `phone` must be non-blank; only non-blank values are forwarded.
#[utoipa::path(
    get,
    path = "/api/support/applications/blacklist/check",
    params(BlacklistCheckQuery),
    tag = "Blacklist",
    responses(
        (status = 200, description = "Upstream answer, relayed unmodified"),
        (status = 400, description = "Neither email nor phone given", body = ErrorBody),
        (status = 401, description = "No operator session", body = ErrorBody)
    )
)]
pub async fn check(
    State(state): State<AppState>,
    session: Session,
    RawQuery(raw): RawQuery,
) -> Result<UpstreamResponse, ApiError> {
    let params = QueryParams::parse(raw.as_deref());
    let lookup = validate_contact_lookup(params.get("email"), params.get("phone"))?;

    let mut query = QueryParams::new();
    if let Some(email) = lookup.email {
        query.append("email", email);
    }
    if let Some(phone) = lookup.phone {
        query.append("phone", phone);
    }

    let request = UpstreamRequest::get(["support", "applications", "blacklist", "check"])
        .with_query(query);
    Ok(state.gateway.forward(&session, request).await?)
}
