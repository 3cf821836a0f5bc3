//! # Merch shop admin backend
//!
//! Backend for the internal rewards/merch shop admin panel. Two jobs:
//!
//! - **Points reconciliation** (`POST /api/ispring-rewards`): takes the
//!   rows of an uploaded award sheet, matches each row to an LMS directory
//!   user by email and posts one gamification award per match, reporting a
//!   per-row outcome list back to the caller.
//! - **Catalog/orders proxy** (`/api/products`, `/api/orders`): thin CRUD
//!   over the hosted store the shop frontend also uses.
//!
//! All persistence, auth and business rules live upstream; this process
//! holds no state beyond one shared HTTP client and the startup
//! configuration.

use std::{sync::Arc, time::Duration};

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{delete, get, post},
    Router,
};
use signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

pub mod award;
pub mod config;
pub mod directory;
pub mod error;
pub mod reconcile;
pub mod routes;
pub mod state;
pub mod store;

use config::Config;
use routes::{
    add_product_handler, delete_product_handler, orders_handler, products_handler, rewards_handler,
};
use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/ispring-rewards", post(rewards_handler))
        .route("/api/products", get(products_handler).post(add_product_handler))
        .route("/api/products/{id}", delete(delete_product_handler))
        .route("/api/orders", get(orders_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = Config::load().expect("Environment misconfigured!");
    let state = AppState::new(config);

    info!("Starting server...");

    let app = router(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
