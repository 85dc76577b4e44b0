use crate::models::{BreedCount, BreedRecord, BreedStat};
use crate::services::store::{StatsStore, StoreError};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::time::Duration;
use uuid::Uuid;

/// Column that `breed_stats` counts are summed over
#[derive(Debug, Clone, Copy)]
enum Grouping {
    Breed,
    BreedGroup,
}

/// PostgreSQL-backed store for breed records and statistics
///
/// `breed_records` keeps every parsed reply as JSONB; `breed_stats` holds one row
/// per (breed, breed_group) with its running count.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
        )
        .await
    }

    async fn totals(&self, grouping: Grouping) -> Result<Vec<BreedCount>, StoreError> {
        let query = match grouping {
            Grouping::Breed => r#"
                SELECT breed AS id, SUM(count)::BIGINT AS total
                FROM breed_stats
                GROUP BY breed
                ORDER BY total DESC, id
            "#,
            Grouping::BreedGroup => r#"
                SELECT breed_group AS id, SUM(count)::BIGINT AS total
                FROM breed_stats
                GROUP BY breed_group
                ORDER BY total DESC, id
            "#,
        };

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;

        Ok(rows
            .iter()
            .map(|row| BreedCount {
                id: row.get("id"),
                count: row.get("total"),
            })
            .collect())
    }
}

#[async_trait]
impl StatsStore for PostgresClient {
    async fn insert_record(&self, record: &BreedRecord) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();

        sqlx::query("INSERT INTO breed_records (id, data, created_at) VALUES ($1, $2, NOW())")
            .bind(id)
            .bind(Json(record))
            .execute(&self.pool)
            .await?;

        tracing::debug!("Stored breed record {}", id);

        Ok(id)
    }

    /// Uses INSERT ... ON CONFLICT so the increment is one statement.
    async fn increment_stat(&self, breed: &str, breed_group: &str) -> Result<BreedStat, StoreError> {
        let query = r#"
            INSERT INTO breed_stats (breed, breed_group, count, updated_at)
            VALUES ($1, $2, 1, NOW())
            ON CONFLICT (breed, breed_group)
            DO UPDATE SET
                count = breed_stats.count + 1,
                updated_at = EXCLUDED.updated_at
            RETURNING breed, breed_group, count
        "#;

        let row = sqlx::query(query)
            .bind(breed)
            .bind(breed_group)
            .fetch_one(&self.pool)
            .await?;

        let stat = BreedStat {
            breed: row.get("breed"),
            breed_group: row.get("breed_group"),
            count: row.get("count"),
        };

        tracing::debug!("Breed stat {}/{} is now {}", stat.breed, stat.breed_group, stat.count);

        Ok(stat)
    }

    async fn list_stats(&self) -> Result<Vec<BreedStat>, StoreError> {
        let query = r#"
            SELECT breed, breed_group, count
            FROM breed_stats
            ORDER BY count DESC, breed, breed_group
        "#;

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;

        Ok(rows
            .iter()
            .map(|row| BreedStat {
                breed: row.get("breed"),
                breed_group: row.get("breed_group"),
                count: row.get("count"),
            })
            .collect())
    }

    async fn totals_by_breed(&self) -> Result<Vec<BreedCount>, StoreError> {
        self.totals(Grouping::Breed).await
    }

    async fn totals_by_group(&self) -> Result<Vec<BreedCount>, StoreError> {
        self.totals(Grouping::BreedGroup).await
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
