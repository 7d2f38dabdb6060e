//! Mail provider client
//!
//! The Notification Service boundary: a [`Mailer`] sends one rendered
//! message. Production uses the provider's HTTP API; tests substitute
//! their own implementation.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::core::config::MailConfig;

/// One rendered e-mail
#[derive(Debug, Clone)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mail delivery errors - never fatal to the order flow
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail provider unreachable: {0}")]
    Transport(String),

    #[error("Mail provider rejected the message: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError>;
}

/// Reqwest-backed mailer for the provider's HTTP API
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    config: MailConfig,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

impl HttpMailer {
    pub fn new(config: MailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        let resp = self
            .client
            .post(format!("{}/messages", self.config.api_url))
            .bearer_auth(&self.config.api_key)
            .json(&SendRequest {
                from: &self.config.from_address,
                to: &message.to,
                subject: &message.subject,
                text: &message.body,
            })
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(MailError::Rejected(resp.status().to_string()));
        }

        Ok(())
    }
}
