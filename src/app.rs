use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/scans", get(handlers::list_scans))
        .route("/api/scans/recent", get(handlers::recent_scans))
        .route("/api/scans/:id", delete(handlers::delete_scan))
        .route("/api/detect", post(handlers::detect))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/stats/refresh", post(handlers::refresh_stats))
        .route("/api/analytics", get(handlers::analytics))
        .route("/api/analytics/monthly", get(handlers::monthly))
        .route("/api/reset", post(handlers::reset))
        .route(
            "/api/preferences",
            get(handlers::get_preferences).put(handlers::put_preferences),
        )
        .with_state(state)
}
