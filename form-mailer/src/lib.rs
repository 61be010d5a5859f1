//! Form Mailer - contact form to Mailgun relay.
//!
//! This library provides the pieces wired together by the `form-mailer`
//! binary:
//! - `config`: provider credentials (file, then environment) and server settings
//! - `mail`: the contact message, the `MailSender` seam and the Mailgun client
//! - `web`: the router, handlers and graceful shutdown
//!
//! ## Request Flow
//!
//! ```text
//! POST /mail → referer check → JSON decode → honeypot → MailSender::send()
//! ```

pub mod config;
pub mod mail;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigError, ConfigSource, ServerSettings};
pub use mail::{ContactMessage, MailSender, MailgunMailer, OutgoingMail, SendError, SendReceipt};
pub use web::{router, AppState};
