//! Tradepost backend server
//!
//! REST API for the digital-resource marketplace: accounts and sessions,
//! the resource catalog, orders and payments, settlement, and the admin
//! console endpoints.

use axum::http::{HeaderValue, Method};
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};

use tradepost_server::admin::AdminService;
use tradepost_server::auth::AuthService;
use tradepost_server::config::Config;
use tradepost_server::db;
use tradepost_server::email::EmailService;
use tradepost_server::middleware::{self, RateLimiter};
use tradepost_server::orders::{expiry_sweeper, OrderService};
use tradepost_server::payments::PaymentService;
use tradepost_server::resources::{FileStore, ResourceService};
use tradepost_server::routes;
use tradepost_server::settings::{CredentialCipher, SettingsService};
use tradepost_server::state::AppState;
use tradepost_server::users::UserService;

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .init();

    // Database pool and migrations
    let db_pool = match db::create_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database connection failed: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = db::run_migrations(&db_pool).await {
        tracing::error!("Migrations failed: {}", e);
        std::process::exit(1);
    }

    // File storage for uploaded resources
    let store = FileStore::new(&config.storage_dir);
    if let Err(e) = store.ensure_root().await {
        tracing::error!("Storage directory unavailable: {}", e);
        std::process::exit(1);
    }

    // Outbound email
    let email_service = match EmailService::new(
        config.smtp_host.as_deref(),
        config.smtp_username.as_deref(),
        config.smtp_password.as_deref(),
        &config.smtp_from,
    ) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("SMTP configuration invalid: {}", e);
            std::process::exit(1);
        }
    };

    // Services
    let auth_service = Arc::new(AuthService::new(
        db_pool.clone(),
        email_service.clone(),
        config.jwt_secret.clone(),
        config.jwt_access_token_ttl_seconds,
        config.jwt_refresh_token_ttl_days,
        config.email_code_ttl_seconds,
    ));

    let user_service = Arc::new(UserService::new(
        db_pool.clone(),
        email_service.clone(),
        config.email_code_ttl_seconds,
    ));

    let resource_service = Arc::new(ResourceService::new(db_pool.clone(), store));

    let order_service = Arc::new(OrderService::new(db_pool.clone(), config.order_ttl_minutes));

    let settings_service = Arc::new(SettingsService::new(
        db_pool.clone(),
        CredentialCipher::new(&config.credential_key),
    ));

    let payment_service = Arc::new(PaymentService::new(
        db_pool.clone(),
        settings_service.clone(),
        order_service.clone(),
    ));

    let admin_service = Arc::new(AdminService::new(db_pool.clone()));

    let app_state = AppState {
        db_pool: db_pool.clone(),
        config: Arc::new(config.clone()),
        auth_service,
        user_service,
        resource_service,
        order_service: order_service.clone(),
        payment_service,
        settings_service,
        admin_service,
    };

    // Expired-order sweeper
    {
        let order_service = order_service.clone();
        let pool = db_pool.clone();
        tokio::spawn(async move {
            tracing::info!("Expiry sweeper task started");
            expiry_sweeper(order_service, pool).await;
            tracing::error!("Expiry sweeper task exited unexpectedly");
        });
    }

    // Rate limiter with periodic bucket cleanup
    let rate_limiter = RateLimiter::new(config.rate_limit_rps);
    {
        let limiter = rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(300));
            loop {
                interval.tick().await;
                limiter.cleanup(Duration::from_secs(600)).await;
            }
        });
    }

    // Clone db_pool for health check
    let health_db_pool = db_pool.clone();

    // Create the app router
    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(move || health_check(health_db_pool.clone())))
        .merge(routes::auth_routes())
        .merge(routes::user_routes())
        .merge(routes::resource_routes())
        .merge(routes::order_routes())
        .merge(routes::payment_routes())
        .merge(routes::config_routes())
        .merge(routes::webhook_routes())
        .merge(routes::admin_routes())
        .with_state(app_state)
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(axum::middleware::from_fn(middleware::request_tracing))
        .layer(axum::middleware::from_fn_with_state(
            rate_limiter.clone(),
            middleware::rate_limit,
        ))
        .layer(configure_cors(&config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check at http://{}/health", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Serve with graceful shutdown
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {}", e);
    }

    tracing::info!("Server shutdown complete");
}

async fn root() -> &'static str {
    "Tradepost API Server"
}

/// Health check response
#[derive(serde::Serialize)]
struct HealthResponse {
    status: String,
    database: String,
    version: String,
}

/// Health check endpoint
async fn health_check(pool: sqlx::PgPool) -> axum::Json<HealthResponse> {
    let db_status = match sqlx::query("SELECT 1").execute(&pool).await {
        Ok(_) => "connected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    let status = if db_status == "connected" {
        "healthy"
    } else {
        "unhealthy"
    };

    axum::Json(HealthResponse {
        status: status.to_string(),
        database: db_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn configure_cors(config: &Config) -> CorsLayer {
    let allowed_origins = config.cors_allowed_origins.clone().unwrap_or_default();

    if allowed_origins.is_empty() {
        tracing::warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (permissive)");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
