mod errors;
mod handlers;
mod middleware;
mod state;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

pub use errors::HttpError;
pub use state::HttpState;

pub fn router(state: HttpState) -> Router<()> {
    let api = Router::new()
        .route("/stats/:slug", get(handlers::stats))
        .route("/ingest", post(handlers::ingest))
        .route("/ingest/state", get(handlers::ingest_state))
        .route("/admin/clear", post(handlers::admin_clear))
        .fallback(handlers::not_found)
        .route_layer(axum_middleware::from_fn(middleware::require_local_origin));

    Router::new()
        .nest("/api", api)
        .fallback(handlers::not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests;
