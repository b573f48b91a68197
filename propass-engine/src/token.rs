//! Token record data model, key derivation, and token generation.

use crate::error::{EntitlementError, EntitlementResult};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Token record lifetime: 7 days.
pub const TOKEN_TTL_SECS: u64 = 604_800;

/// Random bytes per token (hex-encoded to 48 characters).
pub const TOKEN_BYTES: usize = 24;

/// How a token came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenOrigin {
    /// Minted by a provider webhook after checkout.
    Webhook,
    /// Minted by an explicit "resend my link" request.
    Resend,
    /// Minted by the in-app verify flow; no email round-trip.
    DirectVerify,
}

/// The persisted token record. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    /// Owning email, lower-cased and trimmed.
    pub email: String,
    /// Legacy flag: written `false` at mint, never read or enforced.
    /// Redemption is intentionally non-consuming so one activation
    /// link works across all of a customer's devices.
    #[serde(default)]
    pub used: bool,
    /// Provider subscription the token was minted against.
    pub subscription_id: String,
    /// Provider customer identifier.
    pub customer_id: String,
    /// How the token was created.
    pub origin: TokenOrigin,
    /// Mint time, milliseconds since epoch.
    pub created_at: i64,
}

/// Store key for a token record.
#[must_use]
pub fn token_key(token: &str) -> String {
    format!("token:{token}")
}

/// Store key for the device entitlement flag.
#[must_use]
pub fn subscribed_key(token: &str) -> String {
    format!("user:{token}:isSubscribed")
}

/// Store key for the last successful revalidation timestamp.
#[must_use]
pub fn last_validated_key(token: &str) -> String {
    format!("user:{token}:lastValidated")
}

/// Generates a cryptographically random activation token.
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Decodes a stored token record.
///
/// The store returns either the record's JSON text directly or a
/// doubly-encoded JSON string containing that text, depending on how
/// the value was written. Both forms normalize here; nothing past this
/// function sees the ambiguity.
///
/// # Errors
///
/// Returns [`EntitlementError::CorruptRecord`] when neither form
/// decodes into a well-formed record.
pub fn decode_record(raw: &str) -> EntitlementResult<TokenRecord> {
    if let Ok(record) = serde_json::from_str::<TokenRecord>(raw) {
        return Ok(record);
    }
    if let Ok(inner) = serde_json::from_str::<String>(raw) {
        if let Ok(record) = serde_json::from_str::<TokenRecord>(&inner) {
            return Ok(record);
        }
    }
    Err(EntitlementError::CorruptRecord)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> TokenRecord {
        TokenRecord {
            email: "driver@example.com".to_string(),
            used: false,
            subscription_id: "sub_1".to_string(),
            customer_id: "cus_1".to_string(),
            origin: TokenOrigin::Webhook,
            created_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn token_is_48_hex_chars() {
        let token = generate_token();
        assert_eq!(token.len(), 48);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());
    }

    #[test]
    fn keys_embed_token() {
        assert_eq!(token_key("abc"), "token:abc");
        assert_eq!(subscribed_key("abc"), "user:abc:isSubscribed");
        assert_eq!(last_validated_key("abc"), "user:abc:lastValidated");
    }

    #[test]
    fn wire_names_are_camel_case() {
        let json = serde_json::to_value(record()).unwrap();
        assert!(json.get("subscriptionId").is_some());
        assert!(json.get("customerId").is_some());
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["origin"], "webhook");
    }

    #[test]
    fn decode_direct_json() {
        let raw = serde_json::to_string(&record()).unwrap();
        assert_eq!(decode_record(&raw).unwrap(), record());
    }

    #[test]
    fn decode_double_encoded_json() {
        let inner = serde_json::to_string(&record()).unwrap();
        let raw = serde_json::to_string(&inner).unwrap();
        assert_eq!(decode_record(&raw).unwrap(), record());
    }

    #[test]
    fn decode_missing_email_is_corrupt() {
        let raw = r#"{"subscriptionId":"sub_1","customerId":"cus_1","origin":"resend","createdAt":0}"#;
        assert!(matches!(
            decode_record(raw),
            Err(EntitlementError::CorruptRecord)
        ));
    }

    #[test]
    fn decode_garbage_is_corrupt() {
        assert!(decode_record("not json").is_err());
        assert!(decode_record("\"still not a record\"").is_err());
    }

    #[test]
    fn missing_used_defaults_false() {
        let raw = r#"{"email":"a@b.co","subscriptionId":"s","customerId":"c","origin":"direct-verify","createdAt":1}"#;
        let record = decode_record(raw).unwrap();
        assert!(!record.used);
        assert_eq!(record.origin, TokenOrigin::DirectVerify);
    }
}
