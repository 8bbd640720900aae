//! Identifier allocation handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::api::state::AppState;
use crate::domain::{ApiResponse, IdBatchResponse, IdResponse, IdType};
use crate::error::{AppError, Result};

/// Largest batch a single request may draw.
const MAX_BATCH: u32 = 1000;

/// Query parameters for batch allocation.
#[derive(Debug, Deserialize)]
pub struct BatchQuery {
    /// Number of IDs to draw (default: 1, max: 1000).
    #[serde(default = "default_count")]
    pub count: u32,
}

const fn default_count() -> u32 {
    1
}

impl BatchQuery {
    fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(AppError::BadRequest("count must be at least 1".to_string()));
        }
        if self.count > MAX_BATCH {
            return Err(AppError::BadRequest(format!(
                "count cannot exceed {MAX_BATCH}"
            )));
        }
        Ok(())
    }
}

/// Draw one identifier.
pub async fn acquire(
    State(state): State<AppState>,
    Path(id_type): Path<u32>,
) -> Result<Json<ApiResponse<IdResponse>>> {
    let id_type = IdType::new(id_type);
    let id = state.cache.acquire(id_type).await?;

    Ok(Json(ApiResponse::success(IdResponse { id_type, id })))
}

/// Draw several identifiers, one acquire at a time.
///
/// If an acquire fails partway, the identifiers already drawn by this
/// request are dropped with the error; they are never handed out again.
pub async fn acquire_batch(
    State(state): State<AppState>,
    Path(id_type): Path<u32>,
    Query(query): Query<BatchQuery>,
) -> Result<Json<ApiResponse<IdBatchResponse>>> {
    query.validate()?;

    let id_type = IdType::new(id_type);
    let mut ids = Vec::with_capacity(query.count as usize);
    for _ in 0..query.count {
        ids.push(state.cache.acquire(id_type).await?);
    }

    Ok(Json(ApiResponse::success(IdBatchResponse { id_type, ids })))
}
