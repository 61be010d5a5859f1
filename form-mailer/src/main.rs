//! Form Mailer - relays contact form submissions through Mailgun.
//!
//! Credentials come from the `.config` JSON file or, failing that, from
//! `MGDOMAIN`, `MGPRIVATEKEY`, `MGPUBLICKEY`, `TOADDRESS` and `REFERERS`.
//! Without them the server still starts but refuses to send mail.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use form_mailer::web::{serve, shutdown_signal, ConnectionTimeouts, SHUTDOWN_GRACE_PERIOD};
use form_mailer::{config, router, AppState, MailgunMailer, ServerSettings};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("web_server_starting");

    let settings = match ServerSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "server_settings_invalid");
            return Err(e).context("Failed to read server settings");
        }
    };

    let state = match config::load(&settings.config_sources()) {
        Some(config) => {
            let mailer = MailgunMailer::with_base_url(
                settings.mailgun_api_base.clone(),
                config.domain.clone(),
                config.private_api_key.clone(),
            );
            AppState::new(config, Arc::new(mailer))
        }
        None => AppState::unconfigured(),
    };

    info!(
        port = settings.port,
        config_path = %settings.config_path.display(),
        mailgun_api_base = %settings.mailgun_api_base,
        mail_enabled = state.is_configured(),
        "settings_loaded"
    );

    let app = router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    serve(
        listener,
        app,
        ConnectionTimeouts::default(),
        shutdown_signal(),
        SHUTDOWN_GRACE_PERIOD,
    )
    .await;

    info!("web_server_shutdown_complete");

    Ok(())
}
