//! Generic JSON webhook sink: tagged event envelope, optional HMAC-SHA256
//! signature sent as `X-Signature-256: sha256=<hex>`, retry on 5xx/timeout
//! with linear backoff, and fan-out to multiple endpoints.

use crate::sink::{event_type_for, NotificationSink};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use smart_money_core::types::Alert;
use smart_money_core::{Error, Result};
use std::time::Duration;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

const MAX_RETRIES: u32 = 3;
const BACKOFF_STEP: Duration = Duration::from_millis(500);

pub struct GenericWebhookSink {
    http: reqwest::Client,
    endpoints: Vec<String>,
    secret: Option<String>,
}

impl GenericWebhookSink {
    pub fn new(endpoints: Vec<String>, secret: Option<String>) -> Self {
        Self { http: reqwest::Client::new(), endpoints, secret }
    }

    fn envelope(&self, alert: &Alert) -> serde_json::Value {
        serde_json::json!({
            "event_type": event_type_for(alert),
            "alert": alert,
        })
    }

    /// Returns the `sha256=<hex>` digest convention, not the bare hex.
    fn sign(&self, body: &str) -> Option<String> {
        let secret = self.secret.as_ref()?;
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
        mac.update(body.as_bytes());
        Some(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
    }

    async fn post_with_retry(&self, endpoint: &str, body: &str, signature: Option<&str>) -> bool {
        for attempt in 0..=MAX_RETRIES {
            let mut request = self.http.post(endpoint).header("Content-Type", "application/json").body(body.to_string());
            if let Some(signature) = signature {
                request = request.header("X-Signature-256", signature);
            }

            match request.send().await {
                Ok(response) if response.status().is_success() => return true,
                Ok(response) if response.status().is_client_error() => {
                    warn!(endpoint, status = %response.status(), "webhook rejected by client error, not retrying");
                    return false;
                }
                Ok(response) => {
                    warn!(endpoint, status = %response.status(), attempt, "webhook server error, will retry");
                }
                Err(err) => {
                    warn!(endpoint, %err, attempt, "webhook request failed, will retry");
                }
            }

            if attempt < MAX_RETRIES {
                tokio::time::sleep(BACKOFF_STEP * (attempt + 1)).await;
            }
        }
        false
    }
}

#[async_trait]
impl NotificationSink for GenericWebhookSink {
    fn name(&self) -> &str {
        "generic_webhook"
    }

    async fn send(&self, alert: &Alert) -> Result<bool> {
        if self.endpoints.is_empty() {
            return Err(Error::SinkDelivery("no webhook endpoints configured".to_string()));
        }

        let body = serde_json::to_string(&self.envelope(alert))?;
        let signature = self.sign(&body);

        let mut any_succeeded = false;
        for endpoint in &self.endpoints {
            if self.post_with_retry(endpoint, &body, signature.as_deref()).await {
                any_succeeded = true;
            }
        }
        Ok(any_succeeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_deterministic_for_the_same_secret_and_body() {
        let sink = GenericWebhookSink::new(vec!["https://example.invalid".to_string()], Some("secret".to_string()));
        let a = sink.sign("payload");
        let b = sink.sign("payload");
        assert_eq!(a, b);
        assert!(a.is_some());
    }

    #[test]
    fn no_secret_means_no_signature() {
        let sink = GenericWebhookSink::new(vec!["https://example.invalid".to_string()], None);
        assert!(sink.sign("payload").is_none());
    }

    #[test]
    fn different_bodies_produce_different_signatures() {
        let sink = GenericWebhookSink::new(vec!["https://example.invalid".to_string()], Some("secret".to_string()));
        assert_ne!(sink.sign("payload-a"), sink.sign("payload-b"));
    }
}
