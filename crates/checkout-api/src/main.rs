//! # SEPA Checkout
//!
//! Checkout server for Stripe payment intents.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables (or put them in .env)
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_PUBLISHABLE_KEY=pk_test_...
//! export STRIPE_WEBHOOK_SECRET=whsec_...
//! export AMOUNT=1099
//! export CURRENCY=eur
//! export STATIC_DIR=./client
//!
//! # Run the server
//! sepa-checkout
//! ```

use checkout_api::{routes, state::AppState};
use tracing::{info, warn};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let state = AppState::from_env()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Static assets: {}", state.config.static_dir.display());
    info!("Priced products: {}", state.catalog.products.len());
    info!("Payment methods: {:?}", state.config.payment_method_types);
    info!(
        "Stripe mode: {}",
        if state.config.stripe.is_test_mode() { "test" } else { "live" }
    );
    if !state.config.stripe.verifies_webhooks() {
        warn!("Webhook signing secret not set, /webhook accepts unverified events");
    }

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🚀 Checkout server listening on http://{}", addr);

    if !is_prod {
        info!("🔧 Config:   GET  http://{}/config", addr);
        info!("💳 Intent:   POST http://{}/create-payment-intent", addr);
        info!("🔔 Webhook:  POST http://{}/webhook", addr);
    }

    axum::serve(listener, app).await?;

    Ok(())
}

/// `RUST_LOG` filters (default `info`); `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }
}
