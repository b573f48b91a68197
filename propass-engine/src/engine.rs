//! The token lifecycle engine.

use crate::error::{EntitlementError, EntitlementResult};
use crate::token::{
    decode_record, generate_token, last_validated_key, subscribed_key, token_key, TokenOrigin,
    TokenRecord, TOKEN_TTL_SECS,
};
use propass_billing::{Subscription, SubscriptionOracle, SubscriptionStatus};
use propass_notify::{NotificationSender, TemplateKind};
use propass_store::KeyValueStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Subscription facts reported back to callers.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDetails {
    pub subscription_id: String,
    pub status: SubscriptionStatus,
    pub current_period_end: i64,
    pub plan_name: Option<String>,
}

impl From<&Subscription> for SubscriptionDetails {
    fn from(sub: &Subscription) -> Self {
        Self {
            subscription_id: sub.id.clone(),
            status: sub.status,
            current_period_end: sub.current_period_end,
            plan_name: sub.plan_name.clone(),
        }
    }
}

/// Outcome of a successful mint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Minted {
    /// The freshly minted 48-hex-char token.
    pub token: String,
    /// The subscription it was minted against.
    pub details: SubscriptionDetails,
}

/// Outcome of a successful redemption.
#[derive(Debug, Clone)]
pub struct Redemption {
    /// The stored record the token resolved to.
    pub record: TokenRecord,
}

/// Outcome of a revalidation that reached a verdict.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Revalidation {
    /// Whether the subscription is currently active.
    pub active: bool,
    /// Whether the caller should drop its cached entitlement.
    pub should_downgrade: bool,
    /// Facts about the subscription the verdict is based on.
    pub details: Option<SubscriptionDetails>,
}

/// Resolution of "does this email have a qualifying subscription".
enum Resolved {
    /// An active subscription with a future period end.
    Entitled(Subscription),
    /// Subscriptions exist, but none qualifies; carries the most
    /// recent one for status classification.
    Inactive(Subscription),
}

/// The core engine. Construct once at process start with injected
/// clients and share across requests; it holds no per-request state.
pub struct EntitlementEngine {
    store: Arc<dyn KeyValueStore>,
    oracle: Arc<dyn SubscriptionOracle>,
    sender: Arc<dyn NotificationSender>,
}

impl EntitlementEngine {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        oracle: Arc<dyn SubscriptionOracle>,
        sender: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            store,
            oracle,
            sender,
        }
    }

    /// Mints an activation token for `email`.
    ///
    /// Verifies the subscription with the oracle, persists the token
    /// record with a 7-day TTL, then either sends the activation email
    /// (webhook/resend origins; delivery failure deletes the orphaned
    /// token) or immediately flags the device entitled (direct-verify).
    pub async fn mint(&self, email: &str, origin: TokenOrigin) -> EntitlementResult<Minted> {
        let email = normalize_email(email)?;
        let (customer_id, resolved) = self.resolve_subscription(&email).await?;
        let subscription = match resolved {
            Resolved::Entitled(sub) => sub,
            Resolved::Inactive(sub) => {
                return Err(EntitlementError::SubscriptionNotActive { status: sub.status });
            }
        };

        let token = generate_token();
        let record = TokenRecord {
            email: email.clone(),
            used: false,
            subscription_id: subscription.id.clone(),
            customer_id,
            origin,
            created_at: chrono::Utc::now().timestamp_millis(),
        };
        let serialized = serde_json::to_string(&record)
            .map_err(|e| EntitlementError::Internal(e.to_string()))?;
        self.store
            .set(&token_key(&token), &serialized, Some(TOKEN_TTL_SECS))
            .await?;

        match origin {
            TokenOrigin::Webhook | TokenOrigin::Resend => {
                let kind = if origin == TokenOrigin::Webhook {
                    TemplateKind::Purchase
                } else {
                    TemplateKind::Resend
                };
                let delivered = match self.sender.send(&email, &token, kind).await {
                    Ok(delivered) => delivered,
                    Err(e) => {
                        warn!(email, error = %e, "activation email send failed");
                        false
                    }
                };
                if !delivered {
                    // No dangling unreachable token may survive.
                    self.store.delete(&token_key(&token)).await?;
                    return Err(EntitlementError::NotificationFailed);
                }
            }
            TokenOrigin::DirectVerify => {
                // No email round-trip: this device is entitled now.
                self.store
                    .set(&subscribed_key(&token), "true", None)
                    .await?;
            }
        }

        info!(email, ?origin, "minted activation token");
        Ok(Minted {
            token,
            details: SubscriptionDetails::from(&subscription),
        })
    }

    /// Redeems an activation token.
    ///
    /// Read-only and repeatable: the same token redeems identically on
    /// the 1st and the 5th call, from any device. The legacy `used`
    /// flag is neither checked nor set.
    pub async fn redeem(&self, token: &str) -> EntitlementResult<Redemption> {
        let token = token.trim();
        if token.is_empty() {
            return Err(EntitlementError::MissingToken);
        }
        let raw = self
            .store
            .get(&token_key(token))
            .await?
            .ok_or(EntitlementError::TokenNotFound)?;
        let record = decode_record(&raw)?;
        Ok(Redemption { record })
    }

    /// Re-checks the token's subscription against the oracle and
    /// refreshes the cached entitlement flag.
    ///
    /// Confirmed-inactive returns `active: false, should_downgrade:
    /// true` without touching the stored flag (the client enforces the
    /// downgrade). Transient provider faults surface as errors whose
    /// [`EntitlementError::should_downgrade`] is false.
    pub async fn revalidate(&self, token: &str) -> EntitlementResult<Revalidation> {
        let token = token.trim();
        if token.is_empty() {
            return Err(EntitlementError::MissingToken);
        }
        let raw = self
            .store
            .get(&token_key(token))
            .await?
            .ok_or(EntitlementError::TokenNotFound)?;
        let record = decode_record(&raw)?;

        let (_, resolved) = self.resolve_subscription(&record.email).await?;
        match resolved {
            Resolved::Entitled(sub) => {
                self.store
                    .set(&subscribed_key(token), "true", None)
                    .await?;
                let now_ms = chrono::Utc::now().timestamp_millis();
                self.store
                    .set(&last_validated_key(token), &now_ms.to_string(), None)
                    .await?;
                info!(email = record.email, "revalidation confirmed active");
                Ok(Revalidation {
                    active: true,
                    should_downgrade: false,
                    details: Some(SubscriptionDetails::from(&sub)),
                })
            }
            Resolved::Inactive(sub) => {
                info!(
                    email = record.email,
                    status = sub.status.label(),
                    "revalidation found inactive subscription"
                );
                Ok(Revalidation {
                    active: false,
                    should_downgrade: true,
                    details: Some(SubscriptionDetails::from(&sub)),
                })
            }
        }
    }

    /// Reads the cached entitlement flag. No oracle call.
    pub async fn probe(&self, token: &str) -> EntitlementResult<bool> {
        let token = token.trim();
        if token.is_empty() {
            return Err(EntitlementError::MissingToken);
        }
        let value = self.store.get(&subscribed_key(token)).await?;
        Ok(value.as_deref() == Some("true"))
    }

    /// Oracle resolution shared by mint and revalidate: find the
    /// customer, then pick an active subscription whose billing period
    /// end is strictly in the future.
    async fn resolve_subscription(
        &self,
        email: &str,
    ) -> EntitlementResult<(String, Resolved)> {
        let customer = self
            .oracle
            .find_customer_by_email(email)
            .await?
            .ok_or(EntitlementError::CustomerNotFound)?;

        let subscriptions = self.oracle.list_subscriptions(&customer.id, None).await?;
        let now = chrono::Utc::now().timestamp();
        if let Some(active) = subscriptions.iter().find(|s| s.is_entitled(now)) {
            return Ok((customer.id, Resolved::Entitled(active.clone())));
        }
        match subscriptions.iter().max_by_key(|s| s.created) {
            Some(most_recent) => Ok((customer.id, Resolved::Inactive(most_recent.clone()))),
            None => Err(EntitlementError::NoSubscription),
        }
    }
}

/// Normalizes and syntactically validates an email address.
fn normalize_email(email: &str) -> EntitlementResult<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(EntitlementError::InvalidInput(
            "email is required".to_string(),
        ));
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
                && !domain.contains('@')
        }
        None => false,
    };
    if !valid {
        return Err(EntitlementError::InvalidInput(
            "email address is not valid".to_string(),
        ));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::normalize_email;

    #[test]
    fn email_normalized_to_lowercase_trimmed() {
        assert_eq!(
            normalize_email("  Driver@Example.COM ").unwrap(),
            "driver@example.com"
        );
    }

    #[test]
    fn email_rejects_malformed() {
        for bad in ["", "   ", "plain", "@example.com", "a@", "a@nodot", "a b@x.co", "a@b@c.co"] {
            assert!(normalize_email(bad).is_err(), "accepted {bad:?}");
        }
    }
}
