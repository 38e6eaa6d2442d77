use sqlx::SqlitePool;
use tracing::{info, instrument};

use super::{RESTAURANTS_TABLE, REVIEWS_TABLE};
use crate::models::RepositoryResult;

const CREATE_RESTAURANTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS restaurants (
    id          TEXT PRIMARY KEY NOT NULL,
    name        TEXT NOT NULL,
    slug        TEXT NOT NULL UNIQUE,
    body        TEXT,
    address     TEXT NOT NULL,
    image       TEXT NOT NULL,
    lat         REAL NOT NULL,
    lng         REAL NOT NULL,
    created_at  TEXT NOT NULL
)
"#;

const CREATE_REVIEWS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS reviews (
    id                   TEXT PRIMARY KEY NOT NULL,
    restaurant_id        TEXT NOT NULL REFERENCES restaurants (id) ON DELETE CASCADE,
    burger_name          TEXT NOT NULL,
    body                 TEXT,
    taste_rating         INTEGER NOT NULL CHECK (taste_rating BETWEEN 0 AND 4),
    texture_rating       INTEGER NOT NULL CHECK (texture_rating BETWEEN 0 AND 4),
    presentation_rating  INTEGER NOT NULL CHECK (presentation_rating BETWEEN 0 AND 4),
    created_at           TEXT NOT NULL
)
"#;

const CREATE_REVIEWS_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS reviews_restaurant_created_idx
    ON reviews (restaurant_id, created_at DESC)
"#;

/// Creates and inspects the relational schema
pub struct SchemaManager {
    pool: SqlitePool,
}

impl SchemaManager {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn create_restaurants_table(&self) -> RepositoryResult<()> {
        sqlx::query(CREATE_RESTAURANTS_TABLE).execute(&self.pool).await?;
        info!("Table {} ready", RESTAURANTS_TABLE);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn create_reviews_table(&self) -> RepositoryResult<()> {
        sqlx::query(CREATE_REVIEWS_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_REVIEWS_INDEX).execute(&self.pool).await?;
        info!("Table {} ready", REVIEWS_TABLE);
        Ok(())
    }

    /// Create every table, parents first. Safe to call repeatedly.
    #[instrument(skip(self))]
    pub async fn create_all_tables(&self) -> RepositoryResult<Vec<String>> {
        self.create_restaurants_table().await?;
        self.create_reviews_table().await?;

        info!("All tables created");
        Ok(vec![RESTAURANTS_TABLE.to_string(), REVIEWS_TABLE.to_string()])
    }

    #[instrument(skip(self), fields(table_name = %table_name))]
    pub async fn table_exists(&self, table_name: &str) -> RepositoryResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1")
                .bind(table_name)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    #[instrument(skip(self))]
    pub async fn list_tables(&self) -> RepositoryResult<Vec<String>> {
        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tables)
    }
}
