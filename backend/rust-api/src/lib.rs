// Library root - exports for the server binary, the CSV tool and tests

pub mod background;
pub mod config;
pub mod handlers;
pub mod middleware;

pub use config::Config;

use axum::{
    routing::{get, post, put},
    Router,
};
use fieldtrack_core::FieldService;

#[derive(Clone)]
pub struct AppState {
    pub service: FieldService,
}

impl AppState {
    pub fn new(service: FieldService) -> Self {
        Self { service }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/actions/start-shift", post(handlers::start_shift))
        .route("/api/actions/start-visit", post(handlers::start_visit))
        .route("/api/actions/end-shift", post(handlers::end_shift))
        .route("/api/followups/:event_id", put(handlers::amend_followup))
        .route("/api/me/history", get(handlers::my_history))
        .route("/api/me/summary", get(handlers::my_summary))
        .route("/api/me/followups", get(handlers::my_followups))
        .route("/api/me/track", get(handlers::my_track))
        .route("/api/admin/summary", get(handlers::fleet_summary))
        .route("/api/admin/events", get(handlers::all_events))
        .route("/api/admin/pending", get(handlers::pending_staff))
        .layer(axum::middleware::from_fn(middleware::auth::staff_identity))
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
