//! HTTP layer - axum router, extractors and handlers
//!
//! This module exposes the core operations as the JSON API consumed by the
//! storefront and the admin panel. It is the only part of the crate that knows
//! about HTTP; everything below it works on plain Rust types.

/// Session token and admin token extractors
pub mod auth;
/// Request handlers grouped by resource
pub mod handlers;
/// Error responses and the JSON body extractor
pub mod response;


use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{error, info};

use crate::{config::AppConfig, errors::Result, images::ImageStore};
use handlers::{cart, medicines, orders, users};

/// Largest accepted request body; image uploads are the biggest payloads.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Shared data available to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Database connection for all database operations
    pub database: Arc<DatabaseConnection>,
    /// Loaded application configuration
    pub config: Arc<AppConfig>,
    /// Catalog image storage
    pub images: ImageStore,
}

impl AppState {
    /// Creates the shared state; the image store is built from the configuration.
    #[must_use]
    pub fn new(database: DatabaseConnection, config: AppConfig) -> Self {
        let images = ImageStore::from_config(&config.images);
        Self {
            database: Arc::new(database),
            config: Arc::new(config),
            images,
        }
    }
}

/// Catalog reads are mounted under both the user and the admin prefix.
fn catalog_read_routes() -> Router<AppState> {
    Router::new()
        .route("/listMedicines", get(medicines::list_medicines))
        .route("/singleMedicine", post(medicines::get_medicine))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(users::register))
        .route("/add", post(cart::add_to_cart))
        .route("/increase", post(cart::increase_quantity))
        .route("/decrease", post(cart::decrease_quantity))
        .route("/remove", post(cart::remove_from_cart))
        .route("/get-cart", post(cart::get_cart))
        .route("/clear-cart", post(cart::clear_cart))
        .route("/create", post(orders::create_order))
        .route("/listOrders", get(orders::list_orders))
        .merge(catalog_read_routes())
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/addMedicine", post(medicines::add_medicine))
        .route("/removeMedicne", post(medicines::remove_medicine))
        .route("/removeMedicine", post(medicines::remove_medicine))
        .merge(catalog_read_routes())
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static(auth::USER_TOKEN_HEADER),
            HeaderName::from_static(auth::ADMIN_TOKEN_HEADER),
        ])
        .max_age(Duration::from_secs(60 * 60));

    if config.server.cors_allow_any_origin {
        cors.allow_origin(Any)
    } else {
        cors
    }
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let images = ServeDir::new(state.images.directory());
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(|| async { "API WORKING" }))
        .nest("/api/user", user_routes())
        .nest("/api/admin", admin_routes())
        .nest_service("/images", images)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl+C or SIGTERM.
///
/// # Errors
/// Returns an error if the image directory cannot be created, the address cannot
/// be bound, or the server fails.
pub async fn serve(state: AppState) -> Result<()> {
    state.images.ensure_directory().await?;

    let address = format!(
        "{}:{}",
        state.config.server.host, state.config.server.port
    );
    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;

    let app = router(state);
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install terminate handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
