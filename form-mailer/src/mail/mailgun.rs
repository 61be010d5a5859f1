//! Mailgun HTTP API client.
//!
//! Sends through `POST {base}/{domain}/messages` with basic auth
//! `api:{private key}`.
//! Reference: https://documentation.mailgun.com/docs/mailgun/api-reference/openapi-final/tag/Messages/

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info};

use super::{MailSender, OutgoingMail, SendError, SendReceipt};

/// Body of a successful Mailgun send.
#[derive(Debug, Deserialize)]
struct MailgunResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    message: String,
}

/// Mailgun client bound to one sending domain.
#[derive(Clone)]
pub struct MailgunMailer {
    client: Client,
    base_url: String,
    domain: String,
    api_key: String,
}

impl MailgunMailer {
    /// Create a client against an API base such as
    /// [`DEFAULT_MAILGUN_API_BASE`](crate::config::DEFAULT_MAILGUN_API_BASE) or the EU region.
    pub fn with_base_url(
        base_url: impl Into<String>,
        domain: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            domain: domain.into(),
            api_key: api_key.into(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/{}/messages", self.base_url, self.domain)
    }
}

#[async_trait]
impl MailSender for MailgunMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<SendReceipt, SendError> {
        let url = self.messages_url();
        let form = [
            ("from", mail.sender.as_str()),
            ("to", mail.recipient.as_str()),
            ("subject", mail.subject.as_str()),
            ("text", mail.body.as_str()),
        ];

        info!(
            domain = %self.domain,
            recipient = %mail.recipient,
            body_length = mail.body.len(),
            "mailgun_send_starting"
        );

        let resp = self
            .client
            .post(&url)
            .basic_auth("api", Some(&self.api_key))
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                error!(domain = %self.domain, error = %e, "mailgun_send_transport_error");
                SendError::Transport(e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(
                domain = %self.domain,
                status_code = status.as_u16(),
                response = %body,
                "mailgun_send_rejected"
            );
            return Err(SendError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MailgunResponse = resp.json().await.map_err(SendError::InvalidResponse)?;

        Ok(SendReceipt {
            id: parsed.id,
            response: parsed.message,
        })
    }
}
