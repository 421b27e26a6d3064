//! HTTP surface of the board
//!
//! A small JSON API over the shared board state: the current view, combo
//! selection and manual refresh.

pub mod handlers;
pub mod views;

use crate::application::pipeline::RefreshPipeline;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use handlers::ApiError;
pub use views::{BoardStatus, BoardView};

/// Route paths
pub mod paths {
    pub const HEALTH: &str = "/health";
    pub const BOARD: &str = "/api/board";
    pub const SELECTION: &str = "/api/selection";
    pub const REFRESH: &str = "/api/refresh";
}

pub fn router(pipeline: Arc<RefreshPipeline>) -> Router {
    Router::new()
        .route(paths::HEALTH, get(handlers::health))
        .route(paths::BOARD, get(handlers::board))
        .route(paths::SELECTION, put(handlers::select))
        .route(paths::REFRESH, post(handlers::refresh))
        .layer(TraceLayer::new_for_http())
        .with_state(pipeline)
}
