// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{body::Bytes, extract::State};

use crate::{
    auth::Session,
    error::{ApiError, ErrorBody},
    models::ReviewSubmission,
    state::AppState,
    upstream::{UpstreamRequest, UpstreamResponse},
    validation::{parse_body, validate_review},
};

/// Records a call review.
///
/// The display-form duration is converted to seconds and the id is sent as a
/// string. Invalid fields are rejected locally, one at a time, in the order
/// type, id, status, duration.
#[utoipa::path(
    post,
    path = "/api/support/applications/review",
    request_body = ReviewSubmission,
    tag = "Review",
    responses(
        (status = 200, description = "Upstream answer, relayed unmodified"),
        (status = 400, description = "A field failed validation", body = ErrorBody),
        (status = 401, description = "No operator session", body = ErrorBody)
    )
)]
pub async fn submit_review(
    State(state): State<AppState>,
    session: Session,
    body: Bytes,
) -> Result<UpstreamResponse, ApiError> {
    let review = validate_review(&parse_body(&body)?)?;

    let request = UpstreamRequest::post(["support", "applications", "review"]).with_json(&review)?;
    Ok(state.gateway.forward(&session, request).await?)
}
