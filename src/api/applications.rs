// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::extract::{rejection::PathRejection, Path, RawQuery, State};
use tracing::debug;

use crate::{
    auth::Session,
    error::{ApiError, ErrorBody},
    models::{ApplicationType, ListKind},
    state::AppState,
    upstream::{normalize_paging, QueryParams, UpstreamRequest, UpstreamResponse},
    validation::ValidationError,
};

const APPLICATIONS: [&str; 2] = ["support", "applications"];

/// Fetches one application record. The query string is passed through as-is.
#[utoipa::path(
    get,
    path = "/api/support/applications/{application_type}/{application_id}",
    params(
        ("application_type" = String, Path, description = "dealer_form, corporate_form or carrier_application"),
        ("application_id" = String, Path, description = "Application identifier")
    ),
    tag = "Applications",
    responses(
        (status = 200, description = "Upstream record, relayed unmodified"),
        (status = 400, description = "Unknown application type", body = ErrorBody),
        (status = 401, description = "No operator session", body = ErrorBody)
    )
)]
pub async fn get_detail(
    State(state): State<AppState>,
    session: Session,
    path: Result<Path<(String, String)>, PathRejection>,
    RawQuery(query): RawQuery,
) -> Result<UpstreamResponse, ApiError> {
    let Path((application_type, application_id)) = path.map_err(|rejection| {
        debug!(%rejection, "Undecodable detail path");
        ValidationError::ApplicationId
    })?;
    let application_type = ApplicationType::parse(&application_type)
        .ok_or(ValidationError::ApplicationType)?;
    if application_id.trim().is_empty() {
        return Err(ValidationError::ApplicationId.into());
    }

    let path = APPLICATIONS
        .iter()
        .map(|s| s.to_string())
        .chain([application_type.as_str().to_string(), application_id]);
    let request = UpstreamRequest::get(path).with_query(QueryParams::parse(query.as_deref()));

    Ok(state.gateway.forward(&session, request).await?)
}

async fn forward_list(
    state: &AppState,
    session: &Session,
    kind: ListKind,
    query: Option<String>,
) -> Result<UpstreamResponse, ApiError> {
    let mut params = QueryParams::parse(query.as_deref());
    normalize_paging(&mut params);

    let path = APPLICATIONS.into_iter().chain([kind.path_segment()]);
    let request = UpstreamRequest::get(path).with_query(params);
    Ok(state.gateway.forward(session, request).await?)
}

#[utoipa::path(
    get,
    path = "/api/support/applications/dealer-forms",
    params(ListParams),
    tag = "Applications",
    responses(
        (status = 200, description = "Upstream page, relayed unmodified"),
        (status = 401, description = "No operator session", body = ErrorBody)
    )
)]
pub async fn list_dealer_forms(
    State(state): State<AppState>,
    session: Session,
    RawQuery(query): RawQuery,
) -> Result<UpstreamResponse, ApiError> {
    forward_list(&state, &session, ListKind::DealerForms, query).await
}

#[utoipa::path(
    get,
    path = "/api/support/applications/corporate-forms",
    params(ListParams),
    tag = "Applications",
    responses(
        (status = 200, description = "Upstream page, relayed unmodified"),
        (status = 401, description = "No operator session", body = ErrorBody)
    )
)]
pub async fn list_corporate_forms(
    State(state): State<AppState>,
    session: Session,
    RawQuery(query): RawQuery,
) -> Result<UpstreamResponse, ApiError> {
    forward_list(&state, &session, ListKind::CorporateForms, query).await
}

#[utoipa::path(
    get,
    path = "/api/support/applications/carrier-applications",
    params(ListParams),
    tag = "Applications",
    responses(
        (status = 200, description = "Upstream page, relayed unmodified"),
        (status = 401, description = "No operator session", body = ErrorBody)
    )
)]
pub async fn list_carrier_applications(
    State(state): State<AppState>,
    session: Session,
    RawQuery(query): RawQuery,
) -> Result<UpstreamResponse, ApiError> {
    forward_list(&state, &session, ListKind::CarrierApplications, query).await
}

/// Documented list parameters. Anything else is passed through upstream.
#[derive(utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Page size, clamped to 1..=200. Defaults to 50.
    pub limit: Option<i64>,
    /// Rows to skip, at least 0. Defaults to 0.
    pub offset: Option<i64>,
    /// Review status filter.
    pub status: Option<String>,
    /// Free-text search.
    pub search: Option<String>,
}
