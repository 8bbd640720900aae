//! Service layer module.
//!
//! Contains the identifier allocation logic: type registry, batch
//! expansion, draw randomness, and the allocation cache tying them to a
//! counter backend.

pub mod cache;
pub mod random;
pub mod range;
pub mod registry;

pub use cache::AllocationCache;
pub use random::{RandSource, SeededRandom, ThreadRandom};
pub use registry::TypeRegistry;
