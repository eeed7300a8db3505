//! # checkout-api
//!
//! HTTP API layer for the SEPA checkout server.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Config and catalog endpoints passed through to the payment provider
//! - Server-priced payment intent creation
//! - Webhook verification and dispatch
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Checkout page |
//! | GET | `/config` | Publishable key, amount, currency |
//! | GET | `/allProduct` | List products |
//! | GET | `/allPrices` | List prices |
//! | POST | `/create-payment-intent` | Create payment intent |
//! | POST | `/webhook` | Stripe webhook |
//! | GET | `/health` | Health check |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
