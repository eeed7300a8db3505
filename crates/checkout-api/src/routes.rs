//! # Routes
//!
//! Axum router configuration for the checkout API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET  /                       - Checkout page (`STATIC_DIR/index.html`)
/// - GET  /config                 - Publishable key, amount, currency
/// - GET  /allProduct             - Up to 3 provider products
/// - GET  /allPrices              - Up to 3 provider prices
/// - POST /create-payment-intent  - Create a payment intent
/// - POST /webhook                - Provider webhook (raw body)
/// - GET  /health                 - Health check
///
/// Anything else is looked up in `STATIC_DIR`.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_files = ServeDir::new(&state.config.static_dir);
    let index = ServeFile::new(state.config.index_path());

    Router::new()
        .route("/health", get(handlers::health))
        .route_service("/", index)
        .route("/config", get(handlers::get_config))
        .route("/allProduct", get(handlers::list_products))
        .route("/allPrices", get(handlers::list_prices))
        .route("/create-payment-intent", post(handlers::create_payment_intent))
        // Must receive the body untouched for signature checks
        .route("/webhook", post(handlers::webhook))
        .fallback_service(static_files)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}
