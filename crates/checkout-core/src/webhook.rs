//! # Webhook Events
//!
//! Authentication and dispatch of asynchronous provider notifications.
//!
//! An event reaches a [`WebhookHandler`] only when its signature verified, or
//! when no signing secret is configured at all (degraded mode). A failed
//! verification never dispatches anything.

use crate::error::{PaymentError, PaymentResult};
use crate::provider::PaymentProvider;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const PAYMENT_SUCCEEDED: &str = "payment_intent.succeeded";
pub const PAYMENT_FAILED: &str = "payment_intent.payment_failed";

/// A webhook event that passed authentication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event ID from provider (evt_...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Declared event type, e.g. `payment_intent.succeeded`
    #[serde(rename = "type")]
    pub event_type: String,

    /// Opaque event payload
    #[serde(default)]
    pub data: serde_json::Value,

    /// Creation time (unix seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub livemode: Option<bool>,
}

impl WebhookEvent {
    pub fn new(event_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            id: None,
            event_type: event_type.into(),
            data,
            created: None,
            livemode: None,
        }
    }

    /// Parse an event from a raw body
    pub fn from_slice(payload: &[u8]) -> PaymentResult<Self> {
        serde_json::from_slice(payload)
            .map_err(|e| PaymentError::MalformedPayload(format!("Failed to parse webhook: {}", e)))
    }

    /// Classify the declared type
    pub fn kind(&self) -> WebhookEventType {
        WebhookEventType::from(self.event_type.as_str())
    }

    /// The object the event is about (`data.object`), if any
    pub fn object(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        self.data.get("object").and_then(|o| o.as_object())
    }

    /// Payment intent ID, when the event object is a payment intent
    pub fn payment_intent_id(&self) -> Option<&str> {
        self.object()
            .and_then(|o| o.get("id"))
            .and_then(|v| v.as_str())
    }

    /// Amount on the event object (smallest currency unit)
    pub fn amount(&self) -> Option<i64> {
        self.object()
            .and_then(|o| o.get("amount"))
            .and_then(|v| v.as_i64())
    }
}

/// Webhook event types we act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEventType {
    /// Funds captured
    PaymentSucceeded,
    /// Payment attempt failed
    PaymentFailed,
    /// Anything else (acknowledged, not acted on)
    Unknown(String),
}

impl From<&str> for WebhookEventType {
    fn from(event_type: &str) -> Self {
        match event_type {
            PAYMENT_SUCCEEDED => WebhookEventType::PaymentSucceeded,
            PAYMENT_FAILED => WebhookEventType::PaymentFailed,
            other => WebhookEventType::Unknown(other.to_string()),
        }
    }
}

/// What dispatch did with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookOutcome {
    Fulfilled,
    PaymentFailed,
    Ignored,
}

/// Webhook event handler trait
///
/// Implement this trait to react to payment events. Handlers cannot fail:
/// once an event is authenticated it is acknowledged to the provider.
#[allow(unused_variables)]
pub trait WebhookHandler: Send + Sync {
    /// Called when a payment succeeds
    fn on_payment_succeeded(&self, event: &WebhookEvent) {
        info!(
            payment_intent = ?event.payment_intent_id(),
            amount = ?event.amount(),
            "💰 Payment received"
        );
    }

    /// Called when a payment fails
    fn on_payment_failed(&self, event: &WebhookEvent) {
        warn!(
            payment_intent = ?event.payment_intent_id(),
            "❌ Payment failed"
        );
    }

    /// Called for unknown/unhandled events
    fn on_unknown_event(&self, event: &WebhookEvent) {
        debug!(event_type = %event.event_type, "Unhandled webhook event");
    }
}

/// Default webhook handler (just logs events)
pub struct LoggingWebhookHandler;

impl WebhookHandler for LoggingWebhookHandler {}

/// Dispatch a webhook event to the appropriate handler method
pub fn dispatch_webhook_event(handler: &dyn WebhookHandler, event: &WebhookEvent) -> WebhookOutcome {
    match event.kind() {
        WebhookEventType::PaymentSucceeded => {
            handler.on_payment_succeeded(event);
            WebhookOutcome::Fulfilled
        }
        WebhookEventType::PaymentFailed => {
            handler.on_payment_failed(event);
            WebhookOutcome::PaymentFailed
        }
        WebhookEventType::Unknown(_) => {
            handler.on_unknown_event(event);
            WebhookOutcome::Ignored
        }
    }
}

/// Turn a raw webhook request into an event that may be acted upon.
///
/// With a non-empty `secret` the provider verifies `signature` over the exact
/// `payload` bytes. Without one the body is trusted as-is; this is insecure
/// and only meant for local development.
pub fn authenticate_event(
    provider: &dyn PaymentProvider,
    payload: &[u8],
    signature: Option<&str>,
    secret: Option<&str>,
) -> PaymentResult<WebhookEvent> {
    match secret.filter(|s| !s.is_empty()) {
        Some(secret) => {
            let signature = signature.ok_or_else(|| {
                PaymentError::SignatureInvalid("Missing signature header".to_string())
            })?;
            provider.verify_webhook(payload, signature, secret)
        }
        None => {
            warn!("Webhook signing secret not configured - accepting unverified event");
            WebhookEvent::from_slice(payload)
        }
    }
}
