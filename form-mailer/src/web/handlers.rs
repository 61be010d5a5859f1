//! Endpoint handlers.
//!
//! `POST /mail` runs one linear pipeline:
//! 1. Refuse if no configuration was loaded
//! 2. Check the Referer against the allow-list
//! 3. Decode the JSON body
//! 4. Swallow honeypot submissions
//! 5. Relay through the mail provider

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::mail::{ContactMessage, MailSender, OutgoingMail};
use crate::web::referer::{check_referer, referer_from_headers, RefererCheck};

/// Loaded configuration together with the client built from it.
pub struct Relay {
    pub config: Config,
    pub mailer: Arc<dyn MailSender>,
}

/// Shared application state.
///
/// `relay` is `None` when no configuration source succeeded at startup.
#[derive(Clone)]
pub struct AppState {
    relay: Option<Arc<Relay>>,
}

impl AppState {
    pub fn new(config: Config, mailer: Arc<dyn MailSender>) -> Self {
        Self {
            relay: Some(Arc::new(Relay { config, mailer })),
        }
    }

    /// State for a server that could not load configuration.
    pub fn unconfigured() -> Self {
        Self { relay: None }
    }

    pub fn is_configured(&self) -> bool {
        self.relay.is_some()
    }
}

/// `{"status":"ok"}` body shared by both routes.
#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

fn ok() -> Response {
    Json(StatusResponse { status: "ok" }).into_response()
}

/// Plain-text response carrying only the status' reason phrase.
fn status_text(status: StatusCode) -> Response {
    (status, status.canonical_reason().unwrap_or_default()).into_response()
}

/// Contact form endpoint.
pub async fn send_mail(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let Some(relay) = state.relay.as_deref() else {
        error!("mail_unconfigured");
        return status_text(StatusCode::INTERNAL_SERVER_ERROR);
    };

    let referer = referer_from_headers(&headers);
    match check_referer(&relay.config.referers, referer) {
        RefererCheck::Allowed => {}
        RefererCheck::Unrestricted => warn!("mail_referers_not_configured"),
        RefererCheck::Rejected => {
            warn!(referer = %referer, "mail_referer_rejected");
            return status_text(StatusCode::FORBIDDEN);
        }
    }

    // Oversized or unreadable bodies land here instead of axum's 413/400.
    let body = match body {
        Ok(body) => body,
        Err(e) => {
            error!(error = %e, status = %e.status(), "mail_body_unreadable");
            return status_text(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let message = match ContactMessage::from_json(&body) {
        Ok(message) => message,
        Err(e) => {
            error!(error = %e, body_length = body.len(), "mail_decode_failed");
            return status_text(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    if message.is_spam() {
        info!(email = %message.email, "mail_honeypot_filled");
        return ok();
    }

    let mail = OutgoingMail::from_contact(&message, &relay.config.to_address);
    match relay.mailer.send(&mail).await {
        Ok(receipt) => {
            info!(id = %receipt.id, response = %receipt.response, "mail_sent");
            ok()
        }
        Err(e) => {
            error!(error = %e, sender = %mail.sender, "mail_send_failed");
            status_text(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// CORS preflight.
pub async fn preflight() -> impl IntoResponse {
    (
        [
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST"),
        ],
        Json(StatusResponse { status: "ok" }),
    )
}
