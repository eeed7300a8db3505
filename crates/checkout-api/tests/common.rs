//! Common test utilities for checkout-api integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::json;
use tempfile::TempDir;

use checkout_api::{create_router, AppConfig, AppState};
use checkout_core::{
    Currency, PaymentError, PaymentIntent, PaymentIntentRequest, PaymentProvider, PaymentResult,
    ProductCatalog, ProviderList, WebhookEvent, WebhookHandler,
};
use checkout_stripe::{construct_event, StripeConfig, DEFAULT_TOLERANCE_SECS};

/// In-memory stand-in for Stripe.
///
/// Webhook verification uses the real Stripe signature scheme so that
/// end-to-end tests exercise it.
#[derive(Default)]
pub struct FakeProvider {
    pub intents: Mutex<Vec<PaymentIntentRequest>>,
    pub list_limits: Mutex<Vec<u32>>,
    pub fail_upstream: bool,
}

impl FakeProvider {
    pub fn failing() -> Self {
        Self {
            fail_upstream: true,
            ..Self::default()
        }
    }

    fn upstream_check(&self) -> PaymentResult<()> {
        if self.fail_upstream {
            return Err(PaymentError::ProviderError {
                provider: "fake".to_string(),
                message: "Invalid API Key provided".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentProvider for FakeProvider {
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> PaymentResult<PaymentIntent> {
        self.upstream_check()?;
        let mut intents = self.intents.lock().unwrap();
        intents.push(request.clone());
        let n = intents.len();

        Ok(PaymentIntent {
            id: format!("pi_fake_{}", n),
            client_secret: format!("pi_fake_{}_secret", n),
            amount: request.amount,
            currency: request.currency.as_str().to_string(),
            status: Some("requires_payment_method".to_string()),
        })
    }

    async fn list_products(&self, limit: u32) -> PaymentResult<ProviderList> {
        self.upstream_check()?;
        self.list_limits.lock().unwrap().push(limit);
        Ok(ProviderList::from_data(vec![
            json!({"id": "prod_1", "name": "Photo Subscription"}),
            json!({"id": "prod_2", "name": "Print Pack"}),
        ]))
    }

    async fn list_prices(&self, limit: u32) -> PaymentResult<ProviderList> {
        self.upstream_check()?;
        self.list_limits.lock().unwrap().push(limit);
        Ok(ProviderList::from_data(vec![
            json!({"id": "price_1", "unit_amount": 1400, "currency": "eur"}),
        ]))
    }

    fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
        secret: &str,
    ) -> PaymentResult<WebhookEvent> {
        construct_event(payload, signature, secret, DEFAULT_TOLERANCE_SECS)
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

/// Counts the signals dispatch emits
#[derive(Default)]
pub struct RecordingHandler {
    pub fulfilled: AtomicUsize,
    pub failed: AtomicUsize,
    pub ignored: AtomicUsize,
}

impl RecordingHandler {
    pub fn fulfilled(&self) -> usize {
        self.fulfilled.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn ignored(&self) -> usize {
        self.ignored.load(Ordering::SeqCst)
    }
}

impl WebhookHandler for RecordingHandler {
    fn on_payment_succeeded(&self, _event: &WebhookEvent) {
        self.fulfilled.fetch_add(1, Ordering::SeqCst);
    }

    fn on_payment_failed(&self, _event: &WebhookEvent) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    fn on_unknown_event(&self, _event: &WebhookEvent) {
        self.ignored.fetch_add(1, Ordering::SeqCst);
    }
}

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    pub provider: Arc<FakeProvider>,
    pub handler: Arc<RecordingHandler>,
    /// Static directory (kept alive for test duration).
    pub static_dir: TempDir,
}

/// Builder for harness variations
pub struct HarnessBuilder {
    webhook_secret: Option<String>,
    catalog: ProductCatalog,
    provider: FakeProvider,
    amount: i64,
    currency: Currency,
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self {
            webhook_secret: None,
            catalog: ProductCatalog::new(),
            provider: FakeProvider::default(),
            amount: 1000,
            currency: Currency::USD,
        }
    }
}

impl HarnessBuilder {
    pub fn webhook_secret(mut self, secret: &str) -> Self {
        self.webhook_secret = Some(secret.to_string());
        self
    }

    pub fn catalog(mut self, catalog: ProductCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn provider(mut self, provider: FakeProvider) -> Self {
        self.provider = provider;
        self
    }

    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn build(self) -> TestHarness {
        let static_dir = TempDir::new().expect("Failed to create temp directory");
        std::fs::write(
            static_dir.path().join("index.html"),
            "<!DOCTYPE html><title>Checkout</title>",
        )
        .expect("Failed to write index.html");

        let config = AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            environment: "test".into(),
            static_dir: static_dir.path().to_path_buf(),
            catalog_path: None,
            amount: self.amount,
            currency: self.currency,
            payment_method_types: vec!["sepa_debit".into()],
            stripe: StripeConfig::new("sk_test_fake", "pk_test", self.webhook_secret),
        };

        let provider = Arc::new(self.provider);
        let handler = Arc::new(RecordingHandler::default());

        let state = AppState::new(config, self.catalog, provider.clone(), handler.clone());
        let server = TestServer::new(create_router(state)).expect("Failed to create test server");

        TestHarness {
            server,
            provider,
            handler,
            static_dir,
        }
    }
}

impl TestHarness {
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder::default()
    }

    pub fn new() -> Self {
        Self::builder().build()
    }
}
