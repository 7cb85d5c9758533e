// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::ErrorBody,
    models::{ApplicationType, BlacklistEntry, ReviewStatus, ReviewSubmission},
    state::AppState,
};

pub mod applications;
pub mod blacklist;
pub mod health;
pub mod review;

pub fn router(state: AppState) -> Router {
    let support_routes = Router::new()
        .route(
            "/applications/dealer-forms",
            get(applications::list_dealer_forms),
        )
        .route(
            "/applications/corporate-forms",
            get(applications::list_corporate_forms),
        )
        .route(
            "/applications/carrier-applications",
            get(applications::list_carrier_applications),
        )
        .route("/applications/review", post(review::submit_review))
        .route("/applications/blacklist", post(blacklist::enroll))
        .route("/applications/blacklist/check", get(blacklist::check))
        .route(
            "/applications/{application_type}/{application_id}",
            get(applications::get_detail),
        );

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    Router::new()
        .nest("/api/support", support_routes)
        .merge(health_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        applications::get_detail,
        applications::list_dealer_forms,
        applications::list_corporate_forms,
        applications::list_carrier_applications,
        review::submit_review,
        blacklist::enroll,
        blacklist::check,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            ApplicationType,
            ReviewStatus,
            ReviewSubmission,
            BlacklistEntry,
            ErrorBody,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Applications", description = "Application lists and detail records"),
        (name = "Review", description = "Call review submission"),
        (name = "Blacklist", description = "Contact blacklist enrollment and lookup"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
