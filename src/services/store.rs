use crate::models::{BreedCount, BreedRecord, BreedStat};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when reading or writing analysis data
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

/// Persistence for parsed records and per-breed statistics
///
/// `increment_stat` must be a single atomic operation: concurrent calls for the
/// same pair may not lose increments.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Store a parsed record verbatim
    async fn insert_record(&self, record: &BreedRecord) -> Result<Uuid, StoreError>;

    /// Add one to the (breed, breed_group) counter, creating it at 1 if absent
    async fn increment_stat(&self, breed: &str, breed_group: &str) -> Result<BreedStat, StoreError>;

    async fn list_stats(&self) -> Result<Vec<BreedStat>, StoreError>;

    /// Sum of counts per breed, highest first
    async fn totals_by_breed(&self) -> Result<Vec<BreedCount>, StoreError>;

    /// Sum of counts per breed group, highest first
    async fn totals_by_group(&self) -> Result<Vec<BreedCount>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
