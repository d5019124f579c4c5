//! Identity provider webhooks.
//!
//! Deliveries are signed svix-style: HMAC-SHA256 over `"{id}.{timestamp}.{body}"`
//! keyed with the base64 part of a `whsec_` secret, sent as one or more
//! space-separated `v1,<base64 signature>` entries.

use anyhow::Context;
use axum::{
    extract::State,
    http::HeaderMap,
    Json,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::Sha256;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

/// Maximum accepted distance between the delivery timestamp and now.
const TOLERANCE_SECS: i64 = 5 * 60;

/// Verifies identity provider deliveries. Built once at startup from the
/// `whsec_` secret and kept in `AppState`.
#[derive(Clone)]
pub struct WebhookVerifier {
    key: Vec<u8>,
}

impl WebhookVerifier {
    pub fn new(secret: &str) -> anyhow::Result<Self> {
        let encoded = secret.strip_prefix("whsec_").unwrap_or(secret);
        let key = STANDARD
            .decode(encoded)
            .context("IDENTITY_WEBHOOK_SECRET is not a base64 whsec_ secret")?;
        Ok(Self { key })
    }

    fn mac(&self, msg_id: &str, timestamp: &str, body: &[u8]) -> Result<Hmac<Sha256>, AppError> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid webhook key: {e}")))?;
        mac.update(msg_id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(body);
        Ok(mac)
    }

    /// Produces a `v1,<signature>` header value for the given delivery.
    pub fn sign(&self, msg_id: &str, timestamp: i64, body: &[u8]) -> Result<String, AppError> {
        let mac = self.mac(msg_id, &timestamp.to_string(), body)?;
        Ok(format!("v1,{}", STANDARD.encode(mac.finalize().into_bytes())))
    }

    /// Checks the signature headers against `body`, with `now` as unix seconds.
    pub fn verify(&self, headers: &HeaderMap, body: &[u8], now: i64) -> Result<(), AppError> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| AppError::InvalidToken(format!("Missing {name} header")))
        };
        let msg_id = header("svix-id")?;
        let timestamp = header("svix-timestamp")?;
        let signatures = header("svix-signature")?;

        let sent_at: i64 = timestamp
            .parse()
            .map_err(|_| AppError::InvalidToken("Invalid webhook timestamp".to_string()))?;
        if (now - sent_at).abs() > TOLERANCE_SECS {
            return Err(AppError::InvalidToken(
                "Webhook timestamp outside tolerance".to_string(),
            ));
        }

        let mac = self.mac(msg_id, timestamp, body)?;
        let matched = signatures
            .split_whitespace()
            .filter_map(|entry| entry.strip_prefix("v1,"))
            .filter_map(|sig| STANDARD.decode(sig).ok())
            .any(|sig| mac.clone().verify_slice(&sig).is_ok());

        if matched {
            Ok(())
        } else {
            Err(AppError::InvalidToken(
                "Webhook signature verification failed".to_string(),
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
struct WebhookEvent {
    #[serde(rename = "type")]
    kind: String,
    data: UserPayload,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UserPayload {
    id: String,
    first_name: Option<String>,
    last_name: Option<String>,
    email_addresses: Vec<EmailAddress>,
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmailAddress {
    email_address: String,
}

impl UserPayload {
    fn into_user(self) -> User {
        let name = [self.first_name, self.last_name]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        User {
            id: self.id,
            name,
            email: self
                .email_addresses
                .into_iter()
                .next()
                .map(|e| e.email_address)
                .unwrap_or_default(),
            image: self.image_url.unwrap_or_default(),
            resume: None,
        }
    }
}

/// POST /webhooks
pub async fn handle_identity_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    if let Err(e) = state.webhooks.verify(&headers, &body, Utc::now().timestamp()) {
        warn!("Rejected identity webhook: {e}");
        return Err(e);
    }

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("Invalid webhook payload: {e}")))?;
    if event.data.id.is_empty() {
        return Err(AppError::Validation("Webhook payload has no user id".to_string()));
    }

    match event.kind.as_str() {
        "user.created" | "user.updated" => {
            let user = state.store.upsert_user(event.data.into_user()).await?;
            info!("Synced user {} from {}", user.id, event.kind);
        }
        "user.deleted" => {
            let removed = state.store.delete_user(&event.data.id).await?;
            info!(removed, "Deleted user {}", event.data.id);
        }
        other => debug!("Ignoring identity webhook event {other}"),
    }

    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "whsec_dGVzdC13ZWJob29rLXNlY3JldA==";

    fn signed_headers(verifier: &WebhookVerifier, body: &[u8], ts: i64) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("svix-id", HeaderValue::from_static("msg_1"));
        headers.insert("svix-timestamp", HeaderValue::from_str(&ts.to_string()).unwrap());
        let sig = verifier.sign("msg_1", ts, body).unwrap();
        headers.insert(
            "svix-signature",
            HeaderValue::from_str(&format!("v1,bm90LXRoaXMtb25l {sig}")).unwrap(),
        );
        headers
    }

    #[test]
    fn test_valid_signature_among_several_is_accepted() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let body = br#"{"type":"user.deleted","data":{"id":"user_1"}}"#;
        let headers = signed_headers(&verifier, body, 1_700_000_000);
        assert!(verifier.verify(&headers, body, 1_700_000_010).is_ok());
    }

    #[test]
    fn test_tampered_body_is_rejected() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let body = br#"{"type":"user.deleted","data":{"id":"user_1"}}"#;
        let headers = signed_headers(&verifier, body, 1_700_000_000);
        let tampered = br#"{"type":"user.deleted","data":{"id":"user_2"}}"#;
        assert!(matches!(
            verifier.verify(&headers, tampered, 1_700_000_000),
            Err(AppError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_stale_timestamp_is_rejected() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let body = b"{}";
        let headers = signed_headers(&verifier, body, 1_700_000_000);
        assert!(verifier
            .verify(&headers, body, 1_700_000_000 + TOLERANCE_SECS + 1)
            .is_err());
    }

    #[test]
    fn test_secret_that_is_not_base64_fails_at_startup() {
        assert!(WebhookVerifier::new("whsec_not base64!").is_err());
    }

    #[test]
    fn test_missing_headers_are_rejected() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        assert!(verifier.verify(&HeaderMap::new(), b"{}", 0).is_err());
    }

    #[test]
    fn test_payload_maps_to_user() {
        let payload: UserPayload = serde_json::from_value(json!({
            "id": "user_9",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email_addresses": [{ "email_address": "ada@mail.test" }, { "email_address": "alt@mail.test" }],
            "image_url": "https://img.test/ada.png"
        }))
        .unwrap();
        let user = payload.into_user();
        assert_eq!(user.id, "user_9");
        assert_eq!(user.name, "Ada Lovelace");
        assert_eq!(user.email, "ada@mail.test");
        assert_eq!(user.image, "https://img.test/ada.png");
        assert_eq!(user.resume, None);
    }
}
