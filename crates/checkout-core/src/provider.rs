//! # Payment Provider Trait
//!
//! The narrow seam between the HTTP layer and the payment provider's API.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  PaymentProvider (trait)                    │
//! │  ├── create_payment_intent()                                │
//! │  ├── list_products() / list_prices()                        │
//! │  └── verify_webhook()                                       │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!              ┌─────────────┴─────────────┐
//!              │                           │
//!      ┌───────┴───────┐           ┌───────┴───────┐
//!      │StripeProvider │           │  test fakes   │
//!      └───────────────┘           └───────────────┘
//! ```

use crate::error::PaymentResult;
use crate::product::Currency;
use crate::webhook::WebhookEvent;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Catalog listings never ask the provider for more than this many entries.
pub const CATALOG_LIST_LIMIT: u32 = 3;

/// Parameters for creating a payment intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentRequest {
    /// Amount in smallest currency unit
    pub amount: i64,
    /// Currency
    pub currency: Currency,
    /// Payment method types enabled for the intent (e.g. `sepa_debit`)
    pub payment_method_types: Vec<String>,
}

/// A payment intent as created by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Provider ID (pi_...)
    pub id: String,
    /// Secret the browser uses to confirm the intent
    pub client_secret: String,
    /// Amount in smallest currency unit
    pub amount: i64,
    /// Lowercase currency code as echoed by the provider
    pub currency: String,
    /// Provider status (e.g. `requires_payment_method`)
    #[serde(default)]
    pub status: Option<String>,
}

/// A page of provider objects, relayed to clients as received
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderList {
    #[serde(default = "default_list_object")]
    pub object: String,
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

fn default_list_object() -> String {
    "list".to_string()
}

impl ProviderList {
    /// Build a list from objects (used by fakes and tests)
    pub fn from_data(data: Vec<serde_json::Value>) -> Self {
        Self {
            object: default_list_object(),
            data,
            has_more: false,
            url: None,
        }
    }
}

/// Capabilities the checkout server needs from a payment provider.
///
/// Implementations must be safe to share between concurrent requests.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a payment intent for an amount computed by the server.
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> PaymentResult<PaymentIntent>;

    /// List catalog products, at most `limit` entries.
    async fn list_products(&self, limit: u32) -> PaymentResult<ProviderList>;

    /// List catalog prices, at most `limit` entries.
    async fn list_prices(&self, limit: u32) -> PaymentResult<ProviderList>;

    /// Verify a webhook signature and parse the event.
    ///
    /// # Arguments
    /// * `payload` - Raw webhook body bytes, exactly as received
    /// * `signature` - Signature header from the request
    /// * `secret` - Shared webhook signing secret
    fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
        secret: &str,
    ) -> PaymentResult<WebhookEvent>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared payment provider (dynamic dispatch)
pub type BoxedPaymentProvider = Arc<dyn PaymentProvider>;
