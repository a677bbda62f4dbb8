//! Storewatch alert event bus and notification infrastructure.
//!
//! This crate decouples alert creation from notification delivery:
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`AlertEvent`]: the envelope published for every freshly created
//!   alert.
//! - [`NotificationDispatcher`]: background service that fans each event
//!   out to its configured channels and records delivery on the alert row.
//! - [`delivery`]: the external channels (email, webhook).
//!
//! Delivery failures never propagate back into ingestion; the dispatcher
//! logs and moves on.

pub mod bus;
pub mod delivery;
pub mod dispatch;

pub use bus::{channel_names, AlertEvent, EventBus};
pub use delivery::email::{EmailConfig, EmailDelivery};
pub use delivery::webhook::{WebhookConfig, WebhookDelivery};
pub use dispatch::NotificationDispatcher;
