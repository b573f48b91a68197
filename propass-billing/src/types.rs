//! Subscription oracle data types.

use serde::{Deserialize, Serialize};

/// A customer known to the payment provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Provider customer identifier.
    pub id: String,
    /// Customer email, as stored by the provider.
    pub email: Option<String>,
}

/// Subscription status as reported by the payment provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    Canceled,
    PastDue,
    Unpaid,
    Incomplete,
    IncompleteExpired,
    Paused,
    /// Any status this build does not know about.
    #[serde(other)]
    Unknown,
}

impl SubscriptionStatus {
    /// Human-readable label used in user-facing messages.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Trialing => "trialing",
            Self::Canceled => "cancelled",
            Self::PastDue => "past due",
            Self::Unpaid => "unpaid",
            Self::Incomplete => "incomplete",
            Self::IncompleteExpired => "incomplete",
            Self::Paused => "paused",
            Self::Unknown => "inactive",
        }
    }
}

/// A subscription as reported by the payment provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    /// Provider subscription identifier.
    pub id: String,
    /// Current status.
    pub status: SubscriptionStatus,
    /// End of the current billing period (seconds since epoch).
    pub current_period_end: i64,
    /// Creation time (seconds since epoch). Used to pick the most
    /// recent subscription when none is active.
    pub created: i64,
    /// Plan display name, when the provider has one.
    pub plan_name: Option<String>,
}

impl Subscription {
    /// Returns true if this subscription entitles the customer right
    /// now: status active and billing period end strictly in the
    /// future.
    #[must_use]
    pub fn is_entitled(&self, now_epoch_secs: i64) -> bool {
        self.status == SubscriptionStatus::Active && self.current_period_end > now_epoch_secs
    }
}
