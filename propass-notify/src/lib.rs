//! Activation email delivery for ProPass.
//!
//! The engine treats delivery as fire-and-forget, but the boolean
//! outcome matters: a token whose activation email never reached the
//! customer is unreachable and must be discarded by the caller.

mod email;
mod error;

pub use email::{EmailSender, EmailSenderConfig};
pub use error::{NotifyError, NotifyResult};

use async_trait::async_trait;

/// Which message template to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Post-purchase activation email (webhook-minted token).
    Purchase,
    /// Re-requested activation email (resend-minted token).
    Resend,
}

/// Outbound notification seam.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Delivers an activation message carrying `token` to `recipient`.
    /// Returns `Ok(true)` when the provider accepted the message.
    async fn send(&self, recipient: &str, token: &str, kind: TemplateKind)
        -> NotifyResult<bool>;
}

/// Sender that accepts everything without doing anything. Used by
/// tests and local runs without an email provider configured.
#[derive(Debug, Default)]
pub struct NullSender;

#[async_trait]
impl NotificationSender for NullSender {
    async fn send(
        &self,
        recipient: &str,
        _token: &str,
        _kind: TemplateKind,
    ) -> NotifyResult<bool> {
        tracing::debug!(recipient, "null sender: dropping activation email");
        Ok(true)
    }
}
