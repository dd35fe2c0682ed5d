//! # Bank Registry Backend
//!
//! REST service for managing bank records.
//!
//! ## Architecture
//!
//! ```text
//! REST layer (rest.rs)       HTTP verbs/paths -> service calls -> status + JSON
//!     ↓
//! Domain layer (domain.rs)   validation, not-found handling
//!     ↓
//! Storage layer (db.rs)      SQL against the `banks` table, error classification
//! ```
//!
//! Services hold nothing but a pool handle, so [`AppState`] is cheap to clone
//! into every request.

pub mod config;
pub mod db;
pub mod domain;
pub mod rest;

use axum::{
    http::Method,
    middleware,
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::db::{DbConnection, PersistenceResult};
use crate::domain::BankService;

/// Main application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub bank_service: BankService,
    /// Shared secret required in `X-Api-Key`; `None` disables the check
    pub api_secret: Option<String>,
}

impl AppState {
    pub fn new(bank_service: BankService, api_secret: Option<String>) -> Self {
        Self {
            bank_service,
            api_secret,
        }
    }
}

/// Connect the store and build the application state
pub async fn initialize_backend(config: &AppConfig) -> PersistenceResult<AppState> {
    info!("Setting up database");
    let db = DbConnection::connect(&config.database).await?;

    info!("Setting up domain model");
    let bank_service = BankService::new(db);

    if config.api_secret.is_some() {
        info!("API key check enabled");
    }

    Ok(AppState::new(bank_service, config.api_secret.clone()))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/banks",
            get(rest::list_banks)
                .post(rest::create_bank)
                .fallback(rest::method_not_allowed),
        )
        .route(
            "/banks/:id",
            get(rest::get_bank)
                .put(rest::update_bank)
                .patch(rest::update_bank)
                .delete(rest::delete_bank)
                .fallback(rest::method_not_allowed),
        )
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            rest::require_api_key,
        ));

    Router::new()
        .route("/health", get(rest::health))
        .nest("/api", api_routes)
        .fallback(rest::route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(app_state)
}
