//! Domain models for IDPool.
//!
//! This module contains the identifier type configuration, the counter state
//! persisted by the file backend, and API contracts.

pub mod config;
pub mod counter;
pub mod dto;

pub use config::{DrawPolicy, IdType, TypeConfig};
pub use counter::CounterState;
pub use dto::{ApiResponse, IdBatchResponse, IdResponse, TypeResponse};
