//! Webhook signature verification.
//!
//! Provider webhook requests carry a signature header of the form
//! `t=<unix-seconds>,v1=<hex hmac>[,v1=...]`. The HMAC-SHA256 is
//! computed over `"{t}.{raw body}"` with the shared endpoint secret.
//! Verification must happen over the raw request body, before any
//! state mutation.

use crate::error::{BillingError, BillingResult};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted age of a signed webhook, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Verifies a webhook signature header against the raw request body.
///
/// # Errors
///
/// Returns [`BillingError::SignatureInvalid`] when the header is
/// malformed, the timestamp is outside the tolerance window, or no
/// `v1` candidate matches.
pub fn verify_signature(payload: &[u8], header: &str, secret: &str) -> BillingResult<()> {
    verify_signature_at(payload, header, secret, chrono::Utc::now().timestamp())
}

/// Verification with an explicit clock, for tests.
pub fn verify_signature_at(
    payload: &[u8],
    header: &str,
    secret: &str,
    now_epoch_secs: i64,
) -> BillingResult<()> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<Vec<u8>> = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => {
                timestamp = value.parse().ok();
            }
            "v1" => {
                if let Ok(bytes) = hex::decode(value) {
                    candidates.push(bytes);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| BillingError::SignatureInvalid("missing timestamp".to_string()))?;
    if candidates.is_empty() {
        return Err(BillingError::SignatureInvalid(
            "no v1 signature present".to_string(),
        ));
    }
    if (now_epoch_secs - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(BillingError::SignatureInvalid(
            "timestamp outside tolerance".to_string(),
        ));
    }

    for candidate in candidates {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| BillingError::SignatureInvalid(e.to_string()))?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        // verify_slice is constant-time.
        if mac.verify_slice(&candidate).is_ok() {
            return Ok(());
        }
    }

    Err(BillingError::SignatureInvalid(
        "signature mismatch".to_string(),
    ))
}

/// Builds a signature header for `payload` at `timestamp`. Test
/// support for exercising the verifier and the webhook endpoint.
#[must_use]
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    let signature = hex::encode(mac.finalize().into_bytes());
    format!("t={timestamp},v1={signature}")
}
