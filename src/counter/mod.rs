//! Counter service layer.
//!
//! The allocation cache only needs one operation from the outside world:
//! atomically add to a named counter and read back the new value. This
//! module defines that boundary and the backends that satisfy it.

pub mod factory;
pub mod file;
pub mod memory;
pub mod redis;
pub mod traits;

pub use factory::create_counter;
pub use file::FileCounter;
pub use memory::MemoryCounter;
pub use redis::RedisCounter;
pub use traits::CounterClient;
