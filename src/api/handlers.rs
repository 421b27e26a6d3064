use crate::api::views::BoardView;
use crate::application::pipeline::{CycleReport, RefreshPipeline, RefreshTrigger};
use crate::domain::{ComboKey, PipelineError, SelectionError};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument};

/// Errors surfaced by the board API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Refresh(#[from] PipelineError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Selection(SelectionError::UnknownCombo(_)) => StatusCode::NOT_FOUND,
            ApiError::Refresh(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

pub async fn health() -> &'static str {
    "OK"
}

pub async fn board(State(pipeline): State<Arc<RefreshPipeline>>) -> Json<BoardView> {
    Json(BoardView::from(pipeline.board().read()))
}

#[instrument(skip_all, fields(combo = %key))]
pub async fn select(
    State(pipeline): State<Arc<RefreshPipeline>>,
    Json(key): Json<ComboKey>,
) -> Result<Json<BoardView>, ApiError> {
    pipeline.board().select(key)?;
    info!("Combo selected");
    Ok(Json(BoardView::from(pipeline.board().read())))
}

/// Manual refresh; never falls back to demo data
pub async fn refresh(
    State(pipeline): State<Arc<RefreshPipeline>>,
) -> Result<Json<CycleReport>, ApiError> {
    Ok(Json(pipeline.run(RefreshTrigger::Manual).await?))
}
