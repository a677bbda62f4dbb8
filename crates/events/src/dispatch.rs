//! Alert notification dispatcher.
//!
//! [`NotificationDispatcher`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! broadcast channel and fans each [`AlertEvent`] out to the channels its
//! rule requested. It runs as a long-lived background task and shuts down
//! gracefully when the bus sender is dropped.
//!
//! Delivery is best-effort: a failed channel is logged and the remaining
//! channels still run. Once any channel succeeds, the alert row is stamped
//! `notification_sent`.

use storewatch_db::repositories::AlertRepo;
use storewatch_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::AlertEvent;
use crate::delivery::email::{EmailConfig, EmailDelivery};
use crate::delivery::webhook::{WebhookConfig, WebhookDelivery};

/// Background service that delivers alert notifications.
pub struct NotificationDispatcher {
    pool: DbPool,
    email: Option<EmailDelivery>,
    webhook: Option<WebhookDelivery>,
}

impl NotificationDispatcher {
    /// Build a dispatcher with whichever channels the environment
    /// configures. Unconfigured channels are logged once and skipped at
    /// dispatch time.
    pub fn from_env(pool: DbPool) -> Self {
        let email = EmailConfig::from_env().map(EmailDelivery::new);
        if email.is_none() {
            tracing::info!("SMTP not configured, email notifications disabled");
        }
        let webhook = WebhookConfig::from_env().map(WebhookDelivery::new);
        if webhook.is_none() {
            tracing::info!("ALERT_WEBHOOK_URL not set, webhook notifications disabled");
        }
        Self {
            pool,
            email,
            webhook,
        }
    }

    /// Run the dispatch loop.
    ///
    /// Receives events from the bus via the provided `receiver` and
    /// dispatches each one. The loop exits when the channel is closed
    /// (i.e. the [`EventBus`](crate::bus::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<AlertEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.dispatch(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Notification dispatcher lagged, some alerts were not delivered"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification dispatcher shutting down");
                    break;
                }
            }
        }
    }

    /// Fan one event out to its requested channels.
    async fn dispatch(&self, event: &AlertEvent) {
        let mut delivered = 0usize;

        for channel in &event.channels {
            match channel.as_str() {
                "email" => {
                    let Some(email) = &self.email else {
                        tracing::debug!(
                            alert_id = event.alert_id,
                            "Email channel requested but not configured"
                        );
                        continue;
                    };
                    match email.deliver(event).await {
                        Ok(()) => delivered += 1,
                        Err(e) => tracing::error!(
                            alert_id = event.alert_id,
                            error = %e,
                            "Email delivery failed"
                        ),
                    }
                }
                "webhook" => {
                    let Some(webhook) = &self.webhook else {
                        tracing::debug!(
                            alert_id = event.alert_id,
                            "Webhook channel requested but not configured"
                        );
                        continue;
                    };
                    match webhook.deliver(event).await {
                        Ok(()) => delivered += 1,
                        Err(e) => tracing::error!(
                            alert_id = event.alert_id,
                            error = %e,
                            "Webhook delivery failed"
                        ),
                    }
                }
                other => {
                    tracing::warn!(
                        alert_id = event.alert_id,
                        channel = other,
                        "Unknown notification channel, skipping"
                    );
                }
            }
        }

        if delivered > 0 {
            if let Err(e) = AlertRepo::mark_notification_sent(&self.pool, event.alert_id).await {
                tracing::error!(
                    alert_id = event.alert_id,
                    error = %e,
                    "Failed to record notification delivery"
                );
            }
        }
    }
}
