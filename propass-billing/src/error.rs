//! Billing error types.

use thiserror::Error;

/// Result type for billing operations.
pub type BillingResult<T> = Result<T, BillingError>;

/// Errors that can occur talking to the payment provider.
#[derive(Debug, Error)]
pub enum BillingError {
    #[error("rate limited by payment provider")]
    RateLimited {
        /// Seconds to wait before retrying, when the provider said so.
        retry_after_secs: Option<u64>,
    },

    #[error("connection to payment provider failed: {0}")]
    Connection(String),

    #[error("payment provider API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("webhook signature invalid: {0}")]
    SignatureInvalid(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid billing configuration: {0}")]
    Config(String),
}

impl BillingError {
    /// Returns true if this error represents a 429 rate-limit response.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, BillingError::RateLimited { .. })
    }

    /// Returns true for faults that say nothing about the subscription
    /// itself (rate limits, connectivity). Callers must not treat these
    /// as evidence of an inactive subscription.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BillingError::RateLimited { .. } | BillingError::Connection(_)
        )
    }
}

impl From<reqwest::Error> for BillingError {
    fn from(err: reqwest::Error) -> Self {
        if err.status().is_some_and(|s| s.as_u16() == 429) {
            BillingError::RateLimited {
                retry_after_secs: None,
            }
        } else {
            BillingError::Connection(err.to_string())
        }
    }
}
