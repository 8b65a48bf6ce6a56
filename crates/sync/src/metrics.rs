// Copyright 2023-, Edge & Node, GraphOps, and Semiotic Labs.
// SPDX-License-Identifier: Apache-2.0

use std::{net::SocketAddr, panic, sync::LazyLock};

use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use futures_util::FutureExt;
use prometheus::{
    register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec, TextEncoder,
};

/// Metric registered in global registry for
/// contract metadata rows written through the upsert mutation
pub static CONTRACTS_UPSERTED: LazyLock<IntCounter> = LazyLock::new(|| {
    register_int_counter!(
        "artblocks_sync_contracts_upserted_total",
        "Contract metadata rows written through the upsert mutation"
    )
    .unwrap()
});

/// Metric registered in global registry for
/// reconcile passes
///
/// Labels: "outcome"
pub static RECONCILE_RUNS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "artblocks_sync_reconcile_runs_total",
        "Reconcile passes by outcome",
        &["outcome"]
    )
    .unwrap()
});

async fn handler_metrics() -> (StatusCode, String) {
    let metric_families = prometheus::gather();
    let encoder = TextEncoder::new();

    match encoder.encode_to_string(&metric_families) {
        Ok(s) => (StatusCode::OK, s),
        Err(e) => {
            tracing::error!("Error encoding metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error encoding metrics: {}", e),
            )
        }
    }
}

async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "404 Not Found")
}

async fn _run_server(port: u16) {
    let app = Router::new()
        .route("/metrics", get(handler_metrics))
        .fallback(handler_404);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind metrics address");
    let server = axum::serve(listener, app.into_make_service());

    tracing::info!("Metrics server listening on {}", addr);

    let res = server.await;

    tracing::debug!("Metrics server stopped");

    if let Err(err) = res {
        panic!("Metrics server error: {:#?}", err);
    };
}

pub async fn run_server(port: u16) {
    // Abort the whole process if the metrics server panics; a spawned
    // task would swallow the panic otherwise.
    let res = panic::AssertUnwindSafe(_run_server(port))
        .catch_unwind()
        .await;
    if res.is_err() {
        std::process::abort();
    }
}
