//! Ravenkart payments service entrypoint
//!
//! Wires configuration, the PostgreSQL pool, the PayTR gateway adapter and
//! the HTTP router together, then serves until SIGINT/SIGTERM.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method};
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ravenkart_payments::adapters::http::{app_router, BillingAppState};
use ravenkart_payments::adapters::paytr::{PaytrGatewayAdapter, PaytrGatewayConfig};
use ravenkart_payments::adapters::postgres::{
    PostgresPaymentRepository, PostgresSubscriptionRepository, PostgresWebhookEventRepository,
};
use ravenkart_payments::application::CheckoutSettings;
use ravenkart_payments::config::AppConfig;
use ravenkart_payments::domain::billing::PaytrSignatureVerifier;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .idle_timeout(config.database.idle_timeout())
        .max_lifetime(config.database.max_lifetime())
        .connect(&config.database.url)
        .await?;
    tracing::info!("PostgreSQL connection pool established");

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let paytr = &config.paytr;
    let verifier = Arc::new(PaytrSignatureVerifier::new(
        paytr.merchant_id.clone(),
        paytr.merchant_key.clone(),
        paytr.merchant_salt.clone(),
    ));
    let gateway = Arc::new(PaytrGatewayAdapter::new(
        PaytrGatewayConfig::new(paytr.merchant_id.clone())
            .with_base_url(paytr.base_url.clone())
            .with_timeout(paytr.timeout()),
    ));

    let state = BillingAppState {
        payments: Arc::new(PostgresPaymentRepository::new(pool.clone())),
        webhook_events: Arc::new(PostgresWebhookEventRepository::new(pool.clone())),
        subscriptions: Arc::new(PostgresSubscriptionRepository::new(pool.clone())),
        gateway,
        verifier,
        checkout: CheckoutSettings {
            currency: paytr.currency.clone(),
            test_mode: paytr.test_mode,
        },
    };

    // Last layer added runs first, so the request id is set before tracing
    // and propagated back out on the response.
    let mut app = app_router()
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )));
    if let Some(cors) = build_cors_layer(&config.server.cors_origins_list()) {
        app = app.layer(cors);
    }
    let app = app
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    let addr = config.server.socket_addr();
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        test_mode = config.paytr.test_mode,
        "Ravenkart payments service listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Initialize tracing from the configured log filter.
///
/// Production gets JSON lines for the log pipeline; everything else gets
/// the human-readable formatter. `RUST_LOG` overrides the configured filter.
fn init_tracing(config: &AppConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Build a CORS layer from the configured origins, if any.
fn build_cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }

    let layer = if origins.len() == 1 && origins[0] == "*" {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(parsed)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any)
    };

    Some(layer)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
