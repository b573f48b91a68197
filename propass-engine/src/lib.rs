//! Activation token lifecycle engine for ProPass.
//!
//! This crate is the core of the service: it bridges the payment
//! provider's subscription state to a client device's local
//! pro-entitlement check via single-use-per-device activation tokens.
//!
//! Lifecycle:
//! - **mint** — verify the paid subscription with the oracle, generate
//!   a 48-hex-char token, persist it with a 7-day TTL, and either email
//!   it out or (direct-verify) flag the device entitled immediately
//! - **redeem** — look a token up and report validity; deliberately
//!   non-consuming, so one activation link works on every device
//! - **revalidate** — re-check the subscription with the oracle and
//!   refresh the cached entitlement flag, distinguishing
//!   confirmed-inactive (downgrade) from transient provider faults
//!   (never downgrade)
//! - **probe** — cheap read of the cached entitlement flag
//!
//! # Design Principles
//!
//! - **The oracle is the source of truth**: every cached flag is a
//!   snapshot as of the last successful validation
//! - **Per-key atomicity only**: no invariant spans multiple store
//!   keys, so no transactions are needed
//! - **Transient faults never punish the user**: a rate-limited or
//!   unreachable provider must not revoke access

mod engine;
mod error;
mod token;

pub use engine::{EntitlementEngine, Minted, Redemption, Revalidation, SubscriptionDetails};
pub use error::{EntitlementError, EntitlementResult};
pub use token::{
    decode_record, generate_token, last_validated_key, subscribed_key, token_key, TokenOrigin,
    TokenRecord, TOKEN_BYTES, TOKEN_TTL_SECS,
};
