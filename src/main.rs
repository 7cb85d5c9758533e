// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum_server::tls_rustls::RustlsConfig;
use support_review_server::{
    api::router, config::AppConfig, state::AppState, telemetry::init_tracing,
};
use tracing::info;

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env().expect("Invalid configuration");
    init_tracing(config.log_format).expect("Failed to initialize tracing");

    let state = AppState::from_config(&config).expect("Failed to build upstream gateway");
    let app = router(state);
    let addr = config.server.socket_addr();

    info!(
        upstream = %config.upstream.base_url,
        timeout_secs = config.upstream.timeout.map(|t| t.as_secs()),
        "Upstream gateway configured"
    );

    match &config.server.tls {
        Some(tls) => {
            // Install the ring crypto provider for rustls (must be done before any TLS operations)
            rustls::crypto::ring::default_provider()
                .install_default()
                .expect("Failed to install rustls crypto provider");

            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key)
                .await
                .expect("Failed to load TLS certificate and key");

            info!(%addr, "Support review server listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .serve(app.into_make_service())
                .await
                .expect("HTTPS server failed");
        }
        None => {
            info!(%addr, "Support review server listening on http (docs at /docs)");
            axum_server::bind(addr)
                .serve(app.into_make_service())
                .await
                .expect("HTTP server failed");
        }
    }
}
