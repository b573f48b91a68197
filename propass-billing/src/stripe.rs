//! Stripe REST client implementing the subscription oracle.
//!
//! Only the two read paths the engine needs are wired up: customer
//! lookup by email and subscription listing. The API base URL is part
//! of the configuration so tests can point the client at a mock
//! server.

use crate::error::{BillingError, BillingResult};
use crate::types::{Customer, Subscription, SubscriptionStatus};
use crate::SubscriptionOracle;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Stripe client configuration.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Secret API key (`sk_...`).
    pub secret_key: String,
    /// Base URL for the Stripe API (e.g. `https://api.stripe.com`).
    pub api_base_url: String,
}

impl StripeConfig {
    /// Configuration against the production Stripe API.
    #[must_use]
    pub fn new(secret_key: String) -> Self {
        Self {
            secret_key,
            api_base_url: "https://api.stripe.com".to_string(),
        }
    }
}

/// Stripe REST client.
pub struct StripeClient {
    config: StripeConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ListEnvelope<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct WireCustomer {
    id: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireSubscription {
    id: String,
    status: SubscriptionStatus,
    current_period_end: i64,
    created: i64,
    items: Option<WireItems>,
}

#[derive(Debug, Deserialize)]
struct WireItems {
    data: Vec<WireItem>,
}

#[derive(Debug, Deserialize)]
struct WireItem {
    price: Option<WirePrice>,
}

#[derive(Debug, Deserialize)]
struct WirePrice {
    nickname: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

impl StripeClient {
    /// Creates a new client.
    pub fn new(config: StripeConfig) -> BillingResult<Self> {
        if config.secret_key.is_empty() {
            return Err(BillingError::Config(
                "stripe secret key must be set".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| BillingError::Config(e.to_string()))?;
        Ok(Self { config, client })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> BillingResult<T> {
        let url = format!("{}{}", self.config.api_base_url.trim_end_matches('/'), path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .bearer_auth(&self.config.secret_key)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(BillingError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            let message = response
                .json::<ApiErrorEnvelope>()
                .await
                .ok()
                .and_then(|e| e.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| "unknown provider error".to_string());
            return Err(BillingError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl SubscriptionOracle for StripeClient {
    async fn find_customer_by_email(&self, email: &str) -> BillingResult<Option<Customer>> {
        debug!(email, "stripe customer lookup");
        let envelope: ListEnvelope<WireCustomer> = self
            .get_json("/v1/customers", &[("email", email), ("limit", "1")])
            .await?;
        Ok(envelope.data.into_iter().next().map(|c| Customer {
            id: c.id,
            email: c.email,
        }))
    }

    async fn list_subscriptions(
        &self,
        customer_id: &str,
        status: Option<SubscriptionStatus>,
    ) -> BillingResult<Vec<Subscription>> {
        let status_filter = match status {
            Some(SubscriptionStatus::Active) => "active",
            Some(SubscriptionStatus::Trialing) => "trialing",
            Some(SubscriptionStatus::Canceled) => "canceled",
            Some(SubscriptionStatus::PastDue) => "past_due",
            Some(SubscriptionStatus::Unpaid) => "unpaid",
            Some(SubscriptionStatus::Incomplete) => "incomplete",
            Some(SubscriptionStatus::IncompleteExpired) => "incomplete_expired",
            Some(SubscriptionStatus::Paused) => "paused",
            Some(SubscriptionStatus::Unknown) | None => "all",
        };
        let envelope: ListEnvelope<WireSubscription> = self
            .get_json(
                "/v1/subscriptions",
                &[("customer", customer_id), ("status", status_filter)],
            )
            .await?;
        Ok(envelope
            .data
            .into_iter()
            .map(|s| {
                let plan_name = s
                    .items
                    .and_then(|items| items.data.into_iter().next())
                    .and_then(|item| item.price)
                    .and_then(|price| price.nickname);
                Subscription {
                    id: s.id,
                    status: s.status,
                    current_period_end: s.current_period_end,
                    created: s.created,
                    plan_name,
                }
            })
            .collect())
    }
}
