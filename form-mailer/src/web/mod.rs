//! Web server module for the contact form endpoint.
//!
//! This module provides:
//! - `POST /mail`: validate and relay a contact form submission
//! - `OPTIONS /` and `OPTIONS /mail`: CORS preflight
//!
//! Every response carries `Access-Control-Allow-Origin: *` and
//! `X-Content-Type-Options: nosniff`.

pub mod handlers;
pub mod idle;
pub mod referer;
pub mod server;

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    routing::{options, post},
    Router,
};
use tower_http::{
    set_header::SetResponseHeaderLayer, timeout::TimeoutLayer, trace::TraceLayer,
};

pub use handlers::{preflight, send_mail, AppState, Relay, StatusResponse};
pub use referer::{check_referer, RefererCheck};
pub use server::{serve, shutdown_signal, ConnectionTimeouts, SHUTDOWN_GRACE_PERIOD};

/// Upper bound on reading, handling and answering a single request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Largest accepted `POST /mail` body; larger ones are answered with 500.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the router with all routes and response layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/mail", post(send_mail).options(preflight))
        .route("/", options(preflight))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
