//! Todo Server library
//!
//! This module exposes the server components so the router can be built
//! around any open [`todo_store::Persistence`], including in tests.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use config::{LogFormat, ServerConfig};
pub use state::AppState;

/// Creates the application router with all routes configured.
pub fn create_app(state: AppState) -> Router {
    let cors = if state.config.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/items", get(routes::list_items).post(routes::add_item))
        .route(
            "/items/{id}",
            get(routes::get_item)
                .put(routes::update_item)
                .delete(routes::delete_item),
        )
        .route("/health", get(routes::health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initializes tracing with the given log level and format.
pub fn init_tracing(log_level: &str, format: LogFormat) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "todo_server={level},todo_store={level},tower_http=debug",
            level = log_level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }
}
