use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use form_mailer::web::{serve, ConnectionTimeouts, SHUTDOWN_GRACE_PERIOD};
use form_mailer::{router, AppState, Config, MailSender, OutgoingMail, SendError, SendReceipt};
use tokio::net::TcpListener;

/// Records every mail it is asked to send instead of delivering it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailSender for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<SendReceipt, SendError> {
        self.sent.lock().unwrap().push(mail.clone());

        if self.fail {
            return Err(SendError::Rejected {
                status: 400,
                body: r#"{"message":"'from' parameter is not a valid address"}"#.to_string(),
            });
        }

        Ok(SendReceipt {
            id: "<20240101.1@mg.example.com>".to_string(),
            response: "Queued. Thank you.".to_string(),
        })
    }
}

pub struct TestApp {
    pub address: String,
    pub mailer: Arc<RecordingMailer>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn post_mail(&self, body: &str, referer: Option<&str>) -> reqwest::Response {
        let mut request = self
            .client
            .post(format!("{}/mail", &self.address))
            .header("Content-Type", "application/json")
            .body(body.to_string());

        if let Some(referer) = referer {
            request = request.header("Referer", referer);
        }

        request.send().await.expect("Failed to execute request.")
    }
}

pub fn test_config(referers: &[&str]) -> Config {
    Config {
        domain: "mg.example.com".to_string(),
        private_api_key: "key-test".to_string(),
        public_validation_key: "pubkey-test".to_string(),
        to_address: "inbox@example.com".to_string(),
        referers: referers.iter().map(|s| s.to_string()).collect(),
    }
}

/// Spawn the app with the given config (or none) on a random port.
pub async fn spawn_app_with(config: Option<Config>, mailer: RecordingMailer) -> TestApp {
    let mailer = Arc::new(mailer);
    let state = match config {
        Some(config) => AppState::new(config, mailer.clone()),
        None => AppState::unconfigured(),
    };

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    // We retrieve the port assigned to us by the OS
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(serve(
        listener,
        router(state),
        ConnectionTimeouts::default(),
        std::future::pending(),
        SHUTDOWN_GRACE_PERIOD,
    ));

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        mailer,
        client: reqwest::Client::new(),
    }
}

pub async fn spawn_app(referers: &[&str]) -> TestApp {
    spawn_app_with(Some(test_config(referers)), RecordingMailer::default()).await
}
