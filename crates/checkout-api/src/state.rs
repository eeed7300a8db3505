//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the immutable configuration, the server-side price table,
//! the payment provider and the webhook handler.

use checkout_core::{
    BoxedPaymentProvider, Currency, LoggingWebhookHandler, PaymentError, Price, ProductCatalog,
    WebhookHandler,
};
use checkout_stripe::{StripeConfig, StripeProvider};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_PORT: u16 = 4242;
pub const DEFAULT_PAYMENT_METHOD: &str = "sepa_debit";

/// Application configuration, loaded once at start-up
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Directory holding `index.html` and other static assets
    pub static_dir: PathBuf,
    /// Optional TOML price table
    pub catalog_path: Option<PathBuf>,
    /// Default charge in smallest currency unit (`AMOUNT`)
    pub amount: i64,
    /// Charge currency (`CURRENCY`)
    pub currency: Currency,
    /// Payment method types enabled on created intents
    pub payment_method_types: Vec<String>,
    /// Stripe keys and webhook secret
    pub stripe: StripeConfig,
}

impl AppConfig {
    /// Load from `.env` and environment variables
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PaymentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let stripe = StripeConfig::from_lookup(&lookup)?;

        let amount_raw = lookup("AMOUNT")
            .ok_or_else(|| PaymentError::Configuration("AMOUNT not set".to_string()))?;
        let amount: i64 = amount_raw.trim().parse().map_err(|_| {
            PaymentError::Configuration(format!(
                "AMOUNT must be an integer in the smallest currency unit, got {:?}",
                amount_raw
            ))
        })?;
        if amount <= 0 {
            return Err(PaymentError::Configuration(
                "AMOUNT must be positive".to_string(),
            ));
        }

        let currency: Currency = lookup("CURRENCY")
            .ok_or_else(|| PaymentError::Configuration("CURRENCY not set".to_string()))?
            .parse()
            .map_err(|e| PaymentError::Configuration(format!("CURRENCY: {}", e)))?;

        let port = match lookup("PORT") {
            Some(p) => p
                .trim()
                .parse()
                .map_err(|_| PaymentError::Configuration(format!("Invalid PORT: {:?}", p)))?,
            None => DEFAULT_PORT,
        };

        let payment_method_types: Vec<String> = lookup("PAYMENT_METHOD_TYPES")
            .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if payment_method_types.is_empty() {
            return Err(PaymentError::Configuration(
                "PAYMENT_METHOD_TYPES must name at least one method".to_string(),
            ));
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static")),
            catalog_path: lookup("PRODUCT_CATALOG")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            amount,
            currency,
            payment_method_types,
            stripe,
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, PaymentError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| PaymentError::Configuration(format!("Invalid socket address: {}", e)))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// The configured default charge
    pub fn default_price(&self) -> Price {
        Price::from_cents(self.amount, self.currency)
    }

    /// Webhook signing secret, if webhooks are authenticated
    pub fn webhook_secret(&self) -> Option<&str> {
        self.stripe.webhook_secret.as_deref()
    }

    /// Path of the checkout page
    pub fn index_path(&self) -> PathBuf {
        self.static_dir.join("index.html")
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: Arc<AppConfig>,
    /// Server-side price table
    pub catalog: Arc<ProductCatalog>,
    /// Payment provider
    pub provider: BoxedPaymentProvider,
    /// Reacts to authenticated webhook events
    pub webhook_handler: Arc<dyn WebhookHandler>,
}

impl AppState {
    /// Create state from the environment with the Stripe provider
    pub fn from_env() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        let catalog = load_product_catalog(config.catalog_path.as_deref())?;

        let provider = StripeProvider::new(config.stripe.clone())
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;

        Ok(Self::new(
            config,
            catalog,
            Arc::new(provider),
            Arc::new(LoggingWebhookHandler),
        ))
    }

    /// Assemble state from parts (tests plug in fakes here)
    pub fn new(
        config: AppConfig,
        catalog: ProductCatalog,
        provider: BoxedPaymentProvider,
        webhook_handler: Arc<dyn WebhookHandler>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            provider,
            webhook_handler,
        }
    }
}

/// Load the price table, or an empty one when none is configured
pub fn load_product_catalog(path: Option<&std::path::Path>) -> anyhow::Result<ProductCatalog> {
    let Some(path) = path else {
        tracing::warn!("No PRODUCT_CATALOG configured, every cart is charged AMOUNT");
        return Ok(ProductCatalog::new());
    };

    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    let catalog = ProductCatalog::from_toml(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;

    tracing::info!("Loaded {} products from {}", catalog.products.len(), path.display());
    Ok(catalog)
}
