//! Registered type listing.

use axum::{Json, extract::State};

use crate::api::state::AppState;
use crate::domain::{ApiResponse, TypeResponse};
use crate::error::Result;

/// List registered types with the number of identifiers pooled locally.
pub async fn list_types(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<TypeResponse>>>> {
    let registry = state.cache.registry();
    let mut types = Vec::with_capacity(registry.len());

    for (id_type, config) in registry.iter() {
        let pending = state.cache.pending(id_type).await?;
        types.push(TypeResponse::new(id_type, config, pending));
    }

    Ok(Json(ApiResponse::success(types)))
}
