//! # Request Handlers
//!
//! Axum request handlers for the checkout API.
//! Everything except the webhook is a thin pass-through to the payment provider.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use checkout_core::{
    authenticate_event, dispatch_webhook_event, price_cart, CartItem, PaymentError,
    PaymentIntentRequest, ProviderList, WebhookOutcome, CATALOG_LIST_LIMIT,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

pub const SIGNATURE_HEADER: &str = "stripe-signature";

// =============================================================================
// Request/Response Types
// =============================================================================

/// Publishable configuration for the browser
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub public_key: String,
    /// Default amount, as a string in the smallest currency unit
    pub amount: String,
    pub currency: String,
}

/// Create payment intent request
#[derive(Debug, Default, Deserialize)]
pub struct CreatePaymentIntentRequest {
    /// Items to purchase
    #[serde(default)]
    pub items: Vec<CartItem>,
}

/// Create payment intent response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentResponse {
    pub public_key: String,
    pub client_secret: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductsResponse {
    pub products: ProviderList,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PricesResponse {
    pub prices: ProviderList,
}

/// Webhook acknowledgment
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub received: bool,
    pub outcome: WebhookOutcome,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Log and convert. Provider-side failures are ours to look at, the rest are
/// the caller's.
fn payment_error_to_response(context: &str, err: PaymentError) -> ApiError {
    if err.is_upstream() {
        error!("{}: {}", context, err);
    } else {
        warn!("{}: {}", context, err);
    }

    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "sepa-checkout",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Publishable key and default amount for the checkout page
pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    let config = &state.config;
    Json(ConfigResponse {
        public_key: config.stripe.publishable_key.clone(),
        amount: config.amount.to_string(),
        currency: config.currency.as_str().to_string(),
    })
}

/// Up to three products, straight from the provider
#[instrument(skip(state), fields(provider = state.provider.provider_name()))]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<ProductsResponse>, ApiError> {
    let products = state
        .provider
        .list_products(CATALOG_LIST_LIMIT)
        .await
        .map_err(|e| payment_error_to_response("Failed to list products", e))?;

    Ok(Json(ProductsResponse { products }))
}

/// Up to three prices, straight from the provider
#[instrument(skip(state), fields(provider = state.provider.provider_name()))]
pub async fn list_prices(State(state): State<AppState>) -> Result<Json<PricesResponse>, ApiError> {
    let prices = state
        .provider
        .list_prices(CATALOG_LIST_LIMIT)
        .await
        .map_err(|e| payment_error_to_response("Failed to list prices", e))?;

    Ok(Json(PricesResponse { prices }))
}

/// Create a payment intent for the cart, priced on the server
#[instrument(
    skip(state, request),
    fields(items = request.items.len(), provider = state.provider.provider_name())
)]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(request): Json<CreatePaymentIntentRequest>,
) -> Result<Json<CreatePaymentIntentResponse>, ApiError> {
    let config = &state.config;

    if state.catalog.is_empty() {
        warn!(
            "No price table configured, charging the configured AMOUNT ({}) regardless of items",
            config.default_price().display()
        );
    }

    let price = price_cart(
        &request.items,
        &state.catalog,
        config.currency,
        &config.default_price(),
    )
    .map_err(|e| payment_error_to_response("Rejected cart", e))?;

    info!("Creating payment intent: total={}", price.display());

    let intent = state
        .provider
        .create_payment_intent(&PaymentIntentRequest {
            amount: price.amount,
            currency: price.currency,
            payment_method_types: config.payment_method_types.clone(),
        })
        .await
        .map_err(|e| payment_error_to_response("Failed to create payment intent", e))?;

    info!("Created payment intent: {}", intent.id);

    Ok(Json(CreatePaymentIntentResponse {
        public_key: config.stripe.publishable_key.clone(),
        client_secret: intent.client_secret,
    }))
}

/// Receive an asynchronous provider event
#[instrument(skip(state, headers, body), fields(provider = state.provider.provider_name()))]
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let event = authenticate_event(
        state.provider.as_ref(),
        &body,
        signature,
        state.config.webhook_secret(),
    )
    .map_err(|e| payment_error_to_response("⚠️  Webhook verification failed", e))?;

    info!(
        "Received webhook: type={}, id={:?}",
        event.event_type, event.id
    );

    let outcome = dispatch_webhook_event(state.webhook_handler.as_ref(), &event);

    Ok(Json(WebhookResponse {
        received: true,
        outcome,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let body = serde_json::to_value(ErrorResponse::new("Test error", 400)).unwrap();
        assert_eq!(body, serde_json::json!({"error": "Test error", "code": 400}));
    }

    #[test]
    fn test_payment_error_conversion() {
        let (status, _json) = payment_error_to_response(
            "webhook",
            PaymentError::SignatureInvalid("mismatch".to_string()),
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, Json(body)) = payment_error_to_response(
            "prices",
            PaymentError::NetworkError("connection reset".to_string()),
        );
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.code, 503);
    }

    #[test]
    fn test_config_response_shape() {
        let body = serde_json::to_value(ConfigResponse {
            public_key: "pk_test".into(),
            amount: "1000".into(),
            currency: "usd".into(),
        })
        .unwrap();

        assert_eq!(
            body,
            serde_json::json!({"publicKey": "pk_test", "amount": "1000", "currency": "usd"})
        );
    }

    #[test]
    fn test_create_request_without_items() {
        let request: CreatePaymentIntentRequest = serde_json::from_str("{}").unwrap();
        assert!(request.items.is_empty());
    }
}
