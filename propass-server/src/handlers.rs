//! Route handlers.

use crate::response::{failure, revalidation_failure};
use crate::AppState;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use propass_billing::webhook;
use propass_engine::TokenOrigin;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

#[derive(Deserialize)]
pub struct EmailRequest {
    email: Option<String>,
}

#[derive(Deserialize)]
pub struct TokenRequest {
    token: Option<String>,
}

#[derive(Deserialize)]
pub struct TokenQuery {
    token: Option<String>,
}

// Provider webhook event, reduced to the fields we read.
#[derive(Deserialize)]
struct WebhookEvent {
    #[serde(rename = "type")]
    kind: String,
    data: Option<EventData>,
}

#[derive(Deserialize)]
struct EventData {
    object: Option<EventObject>,
}

#[derive(Deserialize)]
struct EventObject {
    customer_details: Option<CustomerDetails>,
    customer_email: Option<String>,
}

#[derive(Deserialize)]
struct CustomerDetails {
    email: Option<String>,
}

impl WebhookEvent {
    fn customer_email(&self) -> Option<&str> {
        let object = self.data.as_ref()?.object.as_ref()?;
        object
            .customer_details
            .as_ref()
            .and_then(|d| d.email.as_deref())
            .or(object.customer_email.as_deref())
    }
}

const MINTING_EVENTS: [&str; 2] = ["checkout.session.completed", "invoice.paid"];

pub async fn health() -> Response {
    Json(json!({
        "service": "propass-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
    .into_response()
}

/// Provider webhook. Signature is verified over the raw body before
/// anything else happens; unknown event kinds are acknowledged so the
/// provider stops retrying them.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(signature) = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
    else {
        return bad_signature("missing signature header");
    };
    if let Err(err) = webhook::verify_signature(&body, signature, &state.webhook_secret) {
        warn!(error = %err, "webhook signature rejected");
        return bad_signature("invalid signature");
    }

    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(err) => {
            warn!(error = %err, "webhook payload not parseable");
            return bad_signature("malformed event payload");
        }
    };

    if !MINTING_EVENTS.contains(&event.kind.as_str()) {
        return received();
    }
    let Some(email) = event.customer_email() else {
        warn!(kind = event.kind, "minting event without customer email");
        return received();
    };

    match state.engine.mint(email, TokenOrigin::Webhook).await {
        Ok(_) => received(),
        // Retryable faults get a 5xx so the provider redelivers.
        Err(err) if err.http_status() >= 500 => {
            warn!(error = %err, "webhook mint failed, asking for redelivery");
            failure(&err)
        }
        Err(err) => {
            warn!(error = %err, "webhook mint failed permanently");
            received()
        }
    }
}

pub async fn resend(
    State(state): State<AppState>,
    Json(request): Json<EmailRequest>,
) -> Response {
    let email = request.email.unwrap_or_default();
    match state.engine.mint(&email, TokenOrigin::Resend).await {
        Ok(minted) => {
            info!("resend mint succeeded");
            Json(json!({
                "success": true,
                "message": "Activation link sent. Check your email.",
                "details": minted.details,
            }))
            .into_response()
        }
        Err(err) => failure(&err),
    }
}

pub async fn verify_email(
    State(state): State<AppState>,
    Json(request): Json<EmailRequest>,
) -> Response {
    let email = request.email.unwrap_or_default();
    match state.engine.mint(&email, TokenOrigin::DirectVerify).await {
        Ok(minted) => Json(json!({
            "success": true,
            "token": minted.token,
            "message": "Subscription verified. Pro features unlocked.",
            "details": minted.details,
        }))
        .into_response(),
        Err(err) => failure(&err),
    }
}

pub async fn verify_token(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> Response {
    let token = request.token.unwrap_or_default();
    match state.engine.redeem(&token).await {
        Ok(_) => Json(json!({
            "success": true,
            "message": "Token valid. Pro features unlocked on this device.",
        }))
        .into_response(),
        Err(err) => failure(&err),
    }
}

pub async fn validate_subscription_get(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Response {
    revalidate(state, query.token.unwrap_or_default()).await
}

pub async fn validate_subscription_post(
    State(state): State<AppState>,
    request: Option<Json<TokenRequest>>,
) -> Response {
    let token = request
        .and_then(|Json(r)| r.token)
        .unwrap_or_default();
    revalidate(state, token).await
}

async fn revalidate(state: AppState, token: String) -> Response {
    match state.engine.revalidate(&token).await {
        Ok(outcome) => {
            let message = if outcome.active {
                "Subscription active.".to_string()
            } else {
                let status = outcome
                    .details
                    .as_ref()
                    .map(|d| d.status.label())
                    .unwrap_or("inactive");
                format!("Subscription is {status}.")
            };
            Json(json!({
                "success": true,
                "active": outcome.active,
                "shouldDowngrade": outcome.should_downgrade,
                "details": outcome.details,
                "message": message,
            }))
            .into_response()
        }
        Err(err) => revalidation_failure(&err),
    }
}

pub async fn check_subscription(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Response {
    let token = query.token.unwrap_or_default();
    match state.engine.probe(&token).await {
        Ok(active) => Json(json!({ "success": true, "active": active })).into_response(),
        Err(err) => failure(&err),
    }
}

fn received() -> Response {
    Json(json!({ "received": true })).into_response()
}

fn bad_signature(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "message": message })),
    )
        .into_response()
}
