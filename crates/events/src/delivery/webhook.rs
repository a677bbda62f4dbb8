//! Webhook delivery with exponential-backoff retry.
//!
//! [`WebhookDelivery`] sends a JSON-encoded [`AlertEvent`] to an external
//! URL via HTTP POST. Failed attempts are retried up to three times with
//! exponential backoff (1 s, 2 s, 4 s).

use std::time::Duration;

use crate::bus::AlertEvent;

/// Retry delays in seconds (exponential backoff: 1s, 2s, 4s).
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for webhook delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// WebhookConfig
// ---------------------------------------------------------------------------

/// Configuration for the webhook delivery service.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Endpoint that receives every alert as a JSON POST.
    pub url: String,
}

impl WebhookConfig {
    /// Load configuration from the `ALERT_WEBHOOK_URL` environment
    /// variable. Returns `None` when unset, signalling that the webhook
    /// channel should be skipped.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("ALERT_WEBHOOK_URL").ok()?;
        Some(Self { url })
    }
}

// ---------------------------------------------------------------------------
// WebhookDelivery
// ---------------------------------------------------------------------------

/// Delivers alert events to an external webhook endpoint.
pub struct WebhookDelivery {
    client: reqwest::Client,
    config: WebhookConfig,
}

impl WebhookDelivery {
    /// Create a new delivery service with a pre-configured HTTP client.
    pub fn new(config: WebhookConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, config }
    }

    /// Deliver an alert to the configured URL with retry.
    ///
    /// Retries up to 3 times with exponential backoff before giving up.
    /// Returns `Ok(())` on the first successful attempt.
    pub async fn deliver(&self, event: &AlertEvent) -> Result<(), WebhookError> {
        let payload = serde_json::json!({
            "alert_id": event.alert_id,
            "alert_type": event.alert_type,
            "severity": event.severity,
            "message": event.message,
            "sensor_id": event.sensor_id,
            "site_id": event.site_id,
            "trigger_value": event.trigger_value,
            "threshold_value": event.threshold_value,
            "timestamp": event.timestamp,
        });

        for (attempt, delay_secs) in RETRY_DELAYS_SECS.iter().enumerate() {
            match self.try_send(&payload).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        url = %self.config.url,
                        error = %e,
                        "Webhook delivery attempt failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_secs(*delay_secs)).await;
                }
            }
        }

        // Final attempt after the last backoff.
        match self.try_send(&payload).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::error!(
                    url = %self.config.url,
                    error = %e,
                    "Webhook delivery failed after all retries"
                );
                Err(e)
            }
        }
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(&self, payload: &serde_json::Value) -> Result<(), WebhookError> {
        let response = self.client.post(&self.config.url).json(payload).send().await?;
        if !response.status().is_success() {
            return Err(WebhookError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
