//! Data Transfer Objects for API responses.

use serde::{Deserialize, Serialize};

use super::{DrawPolicy, IdType, TypeConfig};

/// Standard API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Response code (0 = success, non-zero = error).
    pub code: i32,

    /// Human-readable message.
    pub message: String,

    /// Response data (null on error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create a success response.
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            message: "success".to_string(),
            data: Some(data),
        }
    }
}

/// A single allocated identifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IdResponse {
    /// Identifier type the value was drawn for.
    #[serde(rename = "type")]
    pub id_type: IdType,

    /// Allocated identifier.
    pub id: u64,
}

/// Several identifiers of one type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdBatchResponse {
    /// Identifier type the values were drawn for.
    #[serde(rename = "type")]
    pub id_type: IdType,

    /// Allocated identifiers, in draw order.
    pub ids: Vec<u64>,
}

/// A registered type as exposed by the listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeResponse {
    /// Identifier type.
    #[serde(rename = "type")]
    pub id_type: IdType,

    /// Label.
    pub name: String,

    /// First identifier of the range.
    pub range_start: u64,

    /// Last identifier of the range.
    pub range_end: u64,

    /// Identifiers reserved per counter round-trip.
    pub batch_size: u32,

    /// Draw policy.
    pub draw: DrawPolicy,

    /// Identifiers currently pooled in this process.
    pub pending: usize,
}

impl TypeResponse {
    /// Build a listing entry from a registered configuration.
    #[must_use]
    pub fn new(id_type: IdType, config: &TypeConfig, pending: usize) -> Self {
        Self {
            id_type,
            name: config.name.clone(),
            range_start: config.range_start,
            range_end: config.range_end,
            batch_size: config.batch_size,
            draw: config.draw,
            pending,
        }
    }
}
