// Service exports
pub mod cache;
pub mod memory;
pub mod postgres;
pub mod store;
pub mod vision;

pub use cache::{CacheError, CacheKey, StatsCache};
pub use memory::MemoryStore;
pub use postgres::PostgresClient;
pub use store::{StatsStore, StoreError};
pub use vision::{CompletionSource, InferenceError, VisionClient, BREED_PROMPT};
