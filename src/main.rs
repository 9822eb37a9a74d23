use axum::http::HeaderValue;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use tally_api::config;
use tally_api::database::manager::DatabaseManager;
use tally_api::handlers;
use tally_api::jobs;
use tally_api::middleware::jwt_auth_middleware;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting Tally API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        tracing::error!("JWT_SECRET is not configured");
        std::process::exit(1);
    }

    if config.database.run_migrations {
        // The pool is lazy; a database that is down at boot only degrades /health
        if let Err(e) = DatabaseManager::run_migrations().await {
            tracing::warn!("migrations not applied at startup: {}", e);
        }
    }

    if config.jobs.overdue_sweep_enabled {
        match DatabaseManager::pool().await {
            Ok(pool) => {
                // Token dropped on purpose; the sweep runs for the process lifetime
                let _sweep = jobs::overdue::start(pool);
            }
            Err(e) => tracing::warn!("overdue sweep not started: {}", e),
        }
    }

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("TALLY_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(4000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Tally API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .route("/ping", get(handlers::public::ping::ping))
        // Public auth routes
        .merge(auth_public_routes())
        // Protected API
        .merge(protected_routes())
        // Global middleware
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn auth_public_routes() -> Router {
    use handlers::public::auth;

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
}

fn protected_routes() -> Router {
    use handlers::protected::{auth, debts};

    Router::new()
        .route("/api/auth/me", get(auth::me))
        .route(
            "/api/debts",
            get(debts::debt_list).post(debts::debt_create),
        )
        .route("/api/debts/filter", get(debts::debt_filter))
        // Static segment registered alongside /:debt_id; axum routes it first
        .route("/api/debts/paid", delete(debts::paid_debts_delete))
        .route(
            "/api/debts/:debt_id",
            get(debts::debt_get)
                .put(debts::debt_update)
                .delete(debts::debt_delete),
        )
        .route("/api/debts/:debt_id/paid", patch(debts::debt_mark_paid))
        .layer(axum::middleware::from_fn(jwt_auth_middleware))
}

fn cors_layer() -> CorsLayer {
    let api = &config::config().api;

    if !api.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = api
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Tally API",
            "version": version,
            "description": "Debt-tracking backend API built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "ping": "/ping (public)",
                "health": "/health (public)",
                "auth": "/auth/register, /auth/login, /auth/forgot-password, /auth/reset-password (public)",
                "me": "/api/auth/me (protected)",
                "debts": "/api/debts[/:debt_id] (protected)",
                "filter": "/api/debts/filter (protected)",
                "paid": "/api/debts/:debt_id/paid, /api/debts/paid?mode=creditor|debtor (protected)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
