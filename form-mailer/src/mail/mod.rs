//! Outbound mail.
//!
//! The web layer only ever talks to [`MailSender`]; the Mailgun client is one
//! implementation and tests plug in their own.
//!
//! ## Flow
//!
//! ```text
//! ContactMessage → OutgoingMail → MailSender::send() → SendReceipt
//! ```

pub mod mailgun;
pub mod message;

use async_trait::async_trait;
use thiserror::Error;

pub use mailgun::MailgunMailer;
pub use message::ContactMessage;

/// A single email ready to hand to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub sender: String,
    pub subject: String,
    pub body: String,
    pub recipient: String,
}

impl OutgoingMail {
    /// Build the relayed email for a contact form submission.
    ///
    /// The visitor's address is the sender and their name is the subject.
    pub fn from_contact(message: &ContactMessage, recipient: &str) -> Self {
        Self {
            sender: message.email.clone(),
            subject: message.name.clone(),
            body: message.message.clone(),
            recipient: recipient.to_string(),
        }
    }
}

/// What the provider told us after accepting a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    /// Provider-assigned message id
    pub id: String,
    /// Provider's response text
    pub response: String,
}

/// Failure to hand a message to the provider.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("request to mail provider failed")]
    Transport(#[source] reqwest::Error),

    #[error("mail provider rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("mail provider response could not be decoded")]
    InvalidResponse(#[source] reqwest::Error),
}

/// Anything that can deliver an [`OutgoingMail`].
///
/// One attempt per call; implementations do not retry.
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<SendReceipt, SendError>;
}
