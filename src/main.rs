use aquaclean::{
    app_state::AppState,
    auth::{hash_password, AuthKeys},
    config::AppConfig,
    db, routes,
    services::{otp::OtpStore, payments::RazorpayClient, queue::NotificationQueue},
};
use axum::http::HeaderValue;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusBuilder;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing aquaclean server");

    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);
    routes::metrics::describe();

    tracing::info!("Connecting to PostgreSQL database");
    let db_pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Running database migrations");
    db::run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");

    if let Err(e) = seed_bootstrap_admin(&db_pool, &config).await {
        tracing::error!(error = %e, "Failed to seed bootstrap admin");
    }

    tracing::info!("Connecting to Redis");
    let otp = OtpStore::new(&config.redis_url).expect("Failed to initialize OTP store");
    let notifications =
        NotificationQueue::new(&config.redis_url).expect("Failed to initialize notification queue");

    if config.razorpay_key_id.is_empty() || config.razorpay_key_secret.is_empty() {
        tracing::warn!("Razorpay keys not set, online payments are disabled");
    }
    let payments = RazorpayClient::new(
        config.razorpay_key_id.clone(),
        config.razorpay_key_secret.clone(),
    );
    let auth = AuthKeys::new(&config.jwt_secret, config.jwt_expiration_hours);

    let state = AppState::new(db_pool, auth, otp, notifications, payments, config.settings());

    let app = routes::router(state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors_layer(&config))
        .layer(RequestBodyLimitLayer::new(2 * 1024 * 1024));

    tracing::info!("Starting aquaclean on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    match config.allowed_origins() {
        None => CorsLayer::permissive(),
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| match o.parse() {
                    Ok(v) => Some(v),
                    Err(_) => {
                        tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// Create the first admin from the environment when none exists yet.
async fn seed_bootstrap_admin(
    pool: &PgPool,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let (Some(email), Some(password)) = (
        config.bootstrap_admin_email.as_deref(),
        config.bootstrap_admin_password.as_deref(),
    ) else {
        return Ok(());
    };

    if db::users::count_admins(pool).await? > 0 {
        return Ok(());
    }

    let password_hash = hash_password(password)?;
    let admin = db::users::create_admin(pool, email, "Administrator", "admin", &password_hash).await?;
    tracing::info!(admin_id = %admin.id, "Bootstrap admin created");
    Ok(())
}
