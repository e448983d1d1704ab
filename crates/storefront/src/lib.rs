//! Filament Shop Storefront library.
//!
//! JSON API for the filament shop: catalog, checkout with stock reservation,
//! order history, customer profiles, and admin catalog management.
//!
//! The binary in `main.rs` wires configuration, tracing and `PostgreSQL`
//! around [`app`]; tests drive [`app`] over an in-memory store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, body::Body, http::Request};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the full application router with its middleware stack.
pub fn app(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            path = %request.uri().path(),
            request_id = tracing::field::Empty,
        )
    });

    routes::routes()
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::record_request_id))
        .layer(trace)
        .layer(middleware::propagate_request_id_layer())
        .layer(middleware::set_request_id_layer())
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
