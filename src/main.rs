//! Trimline Server - Barber Shop Booking Platform
//!
//! A Rust REST API server for barber-shop scheduling.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trimline_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("trimline_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Trimline Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(
        repository,
        config.auth.clone(),
        config.booking.clone(),
        config.payment.clone(),
    )
    .expect("Failed to create services");

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Periodic no-show sweep alongside the admin endpoint
    spawn_no_show_sweep(state.clone());

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Run the no-show sweep every few minutes in the background
///
/// The sweep is idempotent, so overlapping runs (or the admin endpoint firing
/// at the same time) are harmless.
fn spawn_no_show_sweep(state: AppState) {
    let grace = state.config.booking.grace_period_minutes.max(1) as u64;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(grace * 60));
        loop {
            ticker.tick().await;
            match state.services.lifecycle.run_no_show_sweep(Utc::now()).await {
                Ok(report) if report.marked > 0 => {
                    tracing::info!(marked = report.marked, "background no-show sweep marked appointments");
                }
                Ok(_) => {}
                Err(e) => tracing::error!("background no-show sweep failed: {}", e),
            }
        }
    });
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/register", post(api::auth::register))
        .route("/auth/me", get(api::auth::me))
        // Shops & catalog
        .route("/shops", get(api::shops::list_shops))
        .route("/shops", post(api::shops::create_shop))
        .route("/shops/:id", get(api::shops::get_shop))
        .route("/shops/:id/barbers", get(api::shops::list_barbers))
        .route("/shops/:id/barbers", post(api::shops::create_barber))
        .route("/shops/:id/services", get(api::shops::list_services))
        .route("/shops/:id/services", post(api::shops::create_service))
        .route("/shops/:shop_id/services/:id", delete(api::shops::delete_service))
        // Barbers
        .route("/barbers/:id", put(api::shops::update_barber))
        .route("/barbers/:id/availability", get(api::availability::list_rules))
        .route("/barbers/:id/availability", post(api::availability::create_rule))
        .route("/barbers/:barber_id/availability/:id", delete(api::availability::delete_rule))
        .route("/barbers/:id/slots", get(api::availability::get_slots))
        .route("/barbers/:id/appointments", get(api::appointments::barber_appointments))
        // Appointments
        .route("/appointments", post(api::appointments::create_appointment))
        .route("/appointments/:id", get(api::appointments::get_appointment))
        .route("/appointments/:id/cancel", post(api::appointments::cancel_appointment))
        .route("/appointments/:id/complete", post(api::appointments::complete_appointment))
        .route("/appointments/:id/no-show", post(api::appointments::mark_no_show))
        .route("/appointments/:id/payment-intent", post(api::payments::create_payment_intent))
        .route("/customers/me/appointments", get(api::appointments::my_appointments))
        // Payments
        .route("/payments/webhook", post(api::payments::webhook))
        // Admin
        .route("/admin/no-show-sweep", post(api::admin::run_no_show_sweep))
        .route("/admin/customers/:id/no-show", get(api::admin::get_no_show_flag))
        .route("/admin/customers/:id/no-show-reset", post(api::admin::reset_no_show_flag))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
