//! Subscription oracle for ProPass.
//!
//! Wraps the payment provider behind a narrow trait: find a customer
//! by email, list their subscriptions. The provider remains the source
//! of truth for entitlement; everything downstream is a cache.
//!
//! Also hosts webhook signature verification, since the shared secret
//! and the signing scheme belong to the same provider account.

mod error;
mod stripe;
mod types;
pub mod webhook;

pub use error::{BillingError, BillingResult};
pub use stripe::{StripeClient, StripeConfig};
pub use types::{Customer, Subscription, SubscriptionStatus};

use async_trait::async_trait;

/// Read-only view of the payment provider's subscription state.
#[async_trait]
pub trait SubscriptionOracle: Send + Sync {
    /// Resolves a customer by email. `Ok(None)` means the provider has
    /// no such customer.
    async fn find_customer_by_email(&self, email: &str) -> BillingResult<Option<Customer>>;

    /// Lists the customer's subscriptions, optionally filtered by
    /// status. `None` lists all of them.
    async fn list_subscriptions(
        &self,
        customer_id: &str,
        status: Option<SubscriptionStatus>,
    ) -> BillingResult<Vec<Subscription>>;
}
