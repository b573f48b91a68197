//! Shared fixtures: an in-memory store, a scriptable oracle, and a
//! recording sender.

use async_trait::async_trait;
use propass_billing::{
    BillingError, BillingResult, Customer, Subscription, SubscriptionOracle, SubscriptionStatus,
};
use propass_engine::EntitlementEngine;
use propass_notify::{NotificationSender, NotifyResult, TemplateKind};
use propass_store::MemoryStore;
use std::sync::{Arc, Mutex};

pub const EMAIL: &str = "driver@example.com";
pub const CUSTOMER_ID: &str = "cus_test_1";

/// What the fake oracle should do on every call.
#[derive(Clone)]
pub enum OracleScript {
    /// Customer exists with these subscriptions.
    Customer(Vec<Subscription>),
    /// No customer for any email.
    NoCustomer,
    /// Every call fails with a 429.
    RateLimited,
    /// Every call fails with a connection error.
    Unreachable,
}

pub struct FakeOracle {
    script: OracleScript,
}

impl FakeOracle {
    pub fn new(script: OracleScript) -> Arc<Self> {
        Arc::new(Self { script })
    }

    fn fail(&self) -> Option<BillingError> {
        match &self.script {
            OracleScript::RateLimited => Some(BillingError::RateLimited {
                retry_after_secs: Some(30),
            }),
            OracleScript::Unreachable => {
                Some(BillingError::Connection("connection refused".to_string()))
            }
            _ => None,
        }
    }
}

#[async_trait]
impl SubscriptionOracle for FakeOracle {
    async fn find_customer_by_email(&self, email: &str) -> BillingResult<Option<Customer>> {
        if let Some(err) = self.fail() {
            return Err(err);
        }
        match &self.script {
            OracleScript::Customer(_) => Ok(Some(Customer {
                id: CUSTOMER_ID.to_string(),
                email: Some(email.to_string()),
            })),
            _ => Ok(None),
        }
    }

    async fn list_subscriptions(
        &self,
        _customer_id: &str,
        _status: Option<SubscriptionStatus>,
    ) -> BillingResult<Vec<Subscription>> {
        if let Some(err) = self.fail() {
            return Err(err);
        }
        match &self.script {
            OracleScript::Customer(subs) => Ok(subs.clone()),
            _ => Ok(Vec::new()),
        }
    }
}

/// Sender that records every send and answers with a fixed outcome.
pub struct FakeSender {
    pub deliver: bool,
    pub sent: Mutex<Vec<(String, String, TemplateKind)>>,
}

impl FakeSender {
    pub fn delivering() -> Arc<Self> {
        Arc::new(Self {
            deliver: true,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            deliver: false,
            sent: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl NotificationSender for FakeSender {
    async fn send(
        &self,
        recipient: &str,
        token: &str,
        kind: TemplateKind,
    ) -> NotifyResult<bool> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), token.to_string(), kind));
        Ok(self.deliver)
    }
}

/// Subscription active with its period end `days_out` days from now.
pub fn active_sub(days_out: i64) -> Subscription {
    let now = chrono::Utc::now().timestamp();
    Subscription {
        id: "sub_active_1".to_string(),
        status: SubscriptionStatus::Active,
        current_period_end: now + days_out * 24 * 60 * 60,
        created: now - 60,
        plan_name: Some("Pro Monthly".to_string()),
    }
}

pub fn canceled_sub() -> Subscription {
    let now = chrono::Utc::now().timestamp();
    Subscription {
        id: "sub_canceled_1".to_string(),
        status: SubscriptionStatus::Canceled,
        current_period_end: now - 24 * 60 * 60,
        created: now - 120,
        plan_name: Some("Pro Monthly".to_string()),
    }
}

pub struct Harness {
    pub engine: EntitlementEngine,
    pub store: Arc<MemoryStore>,
    pub sender: Arc<FakeSender>,
}

pub fn harness(script: OracleScript, sender: Arc<FakeSender>) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let engine = EntitlementEngine::new(
        store.clone(),
        FakeOracle::new(script),
        sender.clone(),
    );
    Harness {
        engine,
        store,
        sender,
    }
}
