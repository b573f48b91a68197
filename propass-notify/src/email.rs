//! HTTP email API sender.
//!
//! Posts to a Resend-style transactional email API. Template rendering
//! stays minimal on purpose: the message body is the activation link
//! plus a one-line blurb per template kind; layout belongs to the
//! provider-side template, not to this service.

use crate::error::{NotifyError, NotifyResult};
use crate::{NotificationSender, TemplateKind};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Email sender configuration.
#[derive(Debug, Clone)]
pub struct EmailSenderConfig {
    /// API key for the email provider.
    pub api_key: String,
    /// Base URL of the email API (e.g. `https://api.resend.com`).
    pub api_base_url: String,
    /// From address for activation emails.
    pub from_address: String,
    /// Base URL of the client app; the activation link is built as
    /// `{app_base_url}/activate?token={token}`.
    pub app_base_url: String,
}

/// HTTP email API client.
pub struct EmailSender {
    config: EmailSenderConfig,
    client: Client,
}

#[derive(Serialize)]
struct OutboundEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: String,
}

impl EmailSender {
    /// Creates a new sender.
    pub fn new(config: EmailSenderConfig) -> NotifyResult<Self> {
        if config.api_key.is_empty() || config.app_base_url.is_empty() {
            return Err(NotifyError::Config(
                "email API key and app base URL must be set".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self { config, client })
    }

    fn activation_link(&self, token: &str) -> String {
        format!(
            "{}/activate?token={token}",
            self.config.app_base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl NotificationSender for EmailSender {
    async fn send(
        &self,
        recipient: &str,
        token: &str,
        kind: TemplateKind,
    ) -> NotifyResult<bool> {
        let link = self.activation_link(token);
        let (subject, blurb) = match kind {
            TemplateKind::Purchase => (
                "Activate your Pro features",
                "Thanks for your purchase! Click the link below to activate Pro on this device.",
            ),
            TemplateKind::Resend => (
                "Your new activation link",
                "Here is the fresh activation link you requested.",
            ),
        };
        let html = format!(
            "<p>{blurb}</p><p><a href=\"{link}\">{link}</a></p>\
             <p>The link works on every device you use and expires in 7 days.</p>"
        );

        let url = format!(
            "{}/emails",
            self.config.api_base_url.trim_end_matches('/')
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&OutboundEmail {
                from: &self.config.from_address,
                to: [recipient],
                subject,
                html,
            })
            .send()
            .await?;

        if response.status().is_success() {
            debug!(recipient, "activation email accepted");
            Ok(true)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(recipient, %status, body, "activation email rejected");
            // A rejection is an outcome, not a transport fault: the
            // caller decides what to do with the orphaned token.
            Ok(false)
        }
    }
}
