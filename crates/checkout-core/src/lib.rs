//! # checkout-core
//!
//! Core types and traits for the SEPA checkout server.
//!
//! This crate provides:
//! - `PaymentProvider` trait, the seam to the payment provider's API
//! - `Product` and `ProductCatalog`, the server-side price table
//! - `CartItem`, `Order` and `price_cart` for server-side amount calculation
//! - `WebhookEvent`, `authenticate_event` and `dispatch_webhook_event`
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use checkout_core::{authenticate_event, dispatch_webhook_event, LoggingWebhookHandler};
//!
//! // Verify (or, without a secret, trust) the raw body, then react to it
//! let event = authenticate_event(provider.as_ref(), &body, signature, secret)?;
//! dispatch_webhook_event(&LoggingWebhookHandler, &event);
//! ```

pub mod error;
pub mod order;
pub mod product;
pub mod provider;
pub mod webhook;

// Re-exports for convenience
pub use error::{PaymentError, PaymentResult};
pub use order::{price_cart, CartItem, LineItem, Order};
pub use product::{Currency, Price, Product, ProductCatalog};
pub use provider::{
    BoxedPaymentProvider, PaymentIntent, PaymentIntentRequest, PaymentProvider, ProviderList,
    CATALOG_LIST_LIMIT,
};
pub use webhook::{
    authenticate_event, dispatch_webhook_event, LoggingWebhookHandler, WebhookEvent,
    WebhookEventType, WebhookHandler, WebhookOutcome,
};
