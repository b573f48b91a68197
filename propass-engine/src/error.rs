//! Entitlement error taxonomy.
//!
//! Every fault an endpoint can report goes through this one enum, so
//! status codes and downgrade semantics stay consistent across the
//! whole HTTP surface. No raw upstream error detail leaks past it.

use propass_billing::{BillingError, SubscriptionStatus};
use propass_store::StoreError;
use thiserror::Error;

/// Result type for engine operations.
pub type EntitlementResult<T> = Result<T, EntitlementError>;

/// Faults of the token lifecycle operations.
#[derive(Debug, Error)]
pub enum EntitlementError {
    /// Malformed request input (bad email, etc.).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No token supplied where one is required.
    #[error("no token provided")]
    MissingToken,

    /// The payment provider has no customer for this email.
    #[error("no customer found for this email")]
    CustomerNotFound,

    /// The customer exists but has no subscriptions at all.
    #[error("no subscription found for this customer")]
    NoSubscription,

    /// The customer's most recent subscription is not active.
    #[error("subscription is {}", status.label())]
    SubscriptionNotActive { status: SubscriptionStatus },

    /// No token record in the store (never minted, or expired).
    #[error("token not found or expired")]
    TokenNotFound,

    /// A stored token record that cannot be decoded.
    #[error("stored token record is corrupt")]
    CorruptRecord,

    /// The activation email could not be delivered; the freshly minted
    /// token has been deleted.
    #[error("activation email could not be sent")]
    NotificationFailed,

    /// The payment provider rate-limited us.
    #[error("payment provider rate limited the request")]
    RateLimited,

    /// The payment provider was unreachable.
    #[error("could not reach payment provider: {0}")]
    UpstreamConnection(String),

    /// Key-value store fault.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Anything else.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EntitlementError {
    /// HTTP status this fault maps to.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidInput(_) | Self::MissingToken => 400,
            Self::CustomerNotFound | Self::NoSubscription | Self::TokenNotFound => 404,
            // By design not an HTTP error: the caller must branch on
            // the embedded status.
            Self::SubscriptionNotActive { .. } => 200,
            Self::RateLimited => 429,
            Self::UpstreamConnection(_) => 503,
            Self::CorruptRecord
            | Self::NotificationFailed
            | Self::Store(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Whether a revalidation caller should drop the device's cached
    /// entitlement when this fault occurs.
    ///
    /// Confirmed-inactive and confirmed-missing states downgrade;
    /// transient infrastructure faults and generic server faults never
    /// do, so a provider outage cannot revoke access.
    #[must_use]
    pub fn should_downgrade(&self) -> bool {
        match self {
            Self::InvalidInput(_)
            | Self::MissingToken
            | Self::CustomerNotFound
            | Self::NoSubscription
            | Self::SubscriptionNotActive { .. }
            | Self::TokenNotFound
            | Self::CorruptRecord => true,
            Self::RateLimited
            | Self::UpstreamConnection(_)
            | Self::NotificationFailed
            | Self::Store(_)
            | Self::Internal(_) => false,
        }
    }
}

impl From<BillingError> for EntitlementError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::RateLimited { .. } => Self::RateLimited,
            BillingError::Connection(msg) => Self::UpstreamConnection(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}
