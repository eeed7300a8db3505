//! # Stripe Provider
//!
//! `PaymentProvider` implementation backed by the Stripe REST API.

use crate::config::StripeConfig;
use crate::signature::{construct_event, DEFAULT_TOLERANCE_SECS};
use async_trait::async_trait;
use checkout_core::{
    PaymentError, PaymentIntent, PaymentIntentRequest, PaymentProvider, PaymentResult,
    ProviderList, WebhookEvent,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

const PROVIDER: &str = "stripe";

/// Stripe-backed payment provider
pub struct StripeProvider {
    config: StripeConfig,
    client: Client,
}

impl StripeProvider {
    /// Create a new Stripe provider
    pub fn new(config: StripeConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PaymentError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.config.api_base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
    }

    /// Send a request and decode a successful body, mapping Stripe errors
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> PaymentResult<T> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(PaymentError::ProviderError {
                    provider: PROVIDER.to_string(),
                    message: error_response.error.describe(),
                });
            }

            return Err(PaymentError::ProviderError {
                provider: PROVIDER.to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })
    }

    async fn list(&self, resource: &str, limit: u32) -> PaymentResult<ProviderList> {
        let request = self
            .client
            .get(self.url(resource))
            .query(&[("limit", limit.to_string())]);

        let list: ProviderList = self.send(request).await?;
        debug!("Listed {} Stripe {}", list.data.len(), resource);
        Ok(list)
    }
}

/// Form body for `POST /v1/payment_intents`
fn payment_intent_form(request: &PaymentIntentRequest) -> Vec<(String, String)> {
    let mut form_params = vec![
        ("amount".to_string(), request.amount.to_string()),
        ("currency".to_string(), request.currency.as_str().to_string()),
    ];

    for (i, method) in request.payment_method_types.iter().enumerate() {
        form_params.push((format!("payment_method_types[{}]", i), method.clone()));
    }

    form_params
}

#[async_trait]
impl PaymentProvider for StripeProvider {
    #[instrument(skip(self, request), fields(amount = request.amount, currency = %request.currency))]
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> PaymentResult<PaymentIntent> {
        if request.amount <= 0 {
            return Err(PaymentError::InvalidRequest(
                "Payment amount must be positive".to_string(),
            ));
        }

        let form_params = payment_intent_form(request);
        let http_request = self
            .client
            .post(self.url("payment_intents"))
            .form(&form_params);

        let intent: PaymentIntent = self.send(http_request).await?;

        info!(
            "Created Stripe payment intent: id={}, amount={}",
            intent.id, intent.amount
        );

        Ok(intent)
    }

    #[instrument(skip(self))]
    async fn list_products(&self, limit: u32) -> PaymentResult<ProviderList> {
        self.list("products", limit).await
    }

    #[instrument(skip(self))]
    async fn list_prices(&self, limit: u32) -> PaymentResult<ProviderList> {
        self.list("prices", limit).await
    }

    #[instrument(skip(self, payload, signature, secret))]
    fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
        secret: &str,
    ) -> PaymentResult<WebhookEvent> {
        construct_event(payload, signature, secret, DEFAULT_TOLERANCE_SECS)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    error_type: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl StripeError {
    fn describe(&self) -> String {
        let message = self.message.as_deref().unwrap_or("unknown error");
        match (&self.error_type, &self.code) {
            (Some(t), Some(c)) => format!("{} ({}/{})", message, t, c),
            (Some(t), None) => format!("{} ({})", message, t),
            _ => message.to_string(),
        }
    }
}
