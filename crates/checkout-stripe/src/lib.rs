//! # checkout-stripe
//!
//! Stripe adapter for the SEPA checkout server.
//!
//! This crate provides:
//!
//! 1. **StripeProvider** - `PaymentProvider` over the Stripe REST API
//!    - Payment Intents (SEPA Direct Debit by default)
//!    - Product and price listings
//! 2. **signature** - `Stripe-Signature` header verification
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use checkout_stripe::{StripeConfig, StripeProvider};
//! use checkout_core::{Currency, PaymentIntentRequest, PaymentProvider};
//!
//! let provider = StripeProvider::new(StripeConfig::from_env()?)?;
//!
//! let intent = provider
//!     .create_payment_intent(&PaymentIntentRequest {
//!         amount: 1099,
//!         currency: Currency::EUR,
//!         payment_method_types: vec!["sepa_debit".into()],
//!     })
//!     .await?;
//!
//! // Hand intent.client_secret to the browser
//! ```
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! let event = provider.verify_webhook(&body, signature, "whsec_...")?;
//! dispatch_webhook_event(&LoggingWebhookHandler, &event);
//! ```

pub mod client;
pub mod config;
pub mod signature;

// Re-exports
pub use client::StripeProvider;
pub use config::StripeConfig;
pub use signature::{construct_event, generate_test_header, DEFAULT_TOLERANCE_SECS};
