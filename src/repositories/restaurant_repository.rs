use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::instrument;

use super::RESTAURANTS_TABLE;
use crate::models::{Restaurant, RepositoryError, RepositoryResult};
use crate::observability::{DatabaseTracingMiddleware, Metrics};

/// Access to restaurant rows
#[async_trait]
pub trait RestaurantRepository: Send + Sync {
    /// First restaurant whose stored slug equals `slug` exactly
    async fn find_by_slug(&self, slug: &str) -> RepositoryResult<Option<Restaurant>>;
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Restaurant>>;
    /// Every restaurant, in insertion order
    async fn find_all(&self) -> RepositoryResult<Vec<Restaurant>>;
    async fn create(&self, restaurant: Restaurant) -> RepositoryResult<Restaurant>;
    async fn exists(&self, id: &str) -> RepositoryResult<bool>;
    async fn count(&self) -> RepositoryResult<usize>;
}

pub struct SqliteRestaurantRepository {
    pool: SqlitePool,
    tracer: DatabaseTracingMiddleware,
}

impl SqliteRestaurantRepository {
    pub fn new(pool: SqlitePool, metrics: Arc<Metrics>) -> Self {
        Self {
            pool,
            tracer: DatabaseTracingMiddleware::new(metrics),
        }
    }
}

#[async_trait]
impl RestaurantRepository for SqliteRestaurantRepository {
    #[instrument(skip(self))]
    async fn find_by_slug(&self, slug: &str) -> RepositoryResult<Option<Restaurant>> {
        self.tracer
            .trace_operation("find_by_slug", RESTAURANTS_TABLE, async {
                sqlx::query_as::<_, Restaurant>(
                    "SELECT id, name, slug, body, address, image, lat, lng, created_at \
                     FROM restaurants WHERE slug = ?1 ORDER BY rowid LIMIT 1",
                )
                .bind(slug)
                .fetch_optional(&self.pool)
                .await
                .map_err(RepositoryError::from)
            })
            .await
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Restaurant>> {
        self.tracer
            .trace_operation("find_by_id", RESTAURANTS_TABLE, async {
                sqlx::query_as::<_, Restaurant>(
                    "SELECT id, name, slug, body, address, image, lat, lng, created_at \
                     FROM restaurants WHERE id = ?1",
                )
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(RepositoryError::from)
            })
            .await
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> RepositoryResult<Vec<Restaurant>> {
        self.tracer
            .trace_operation("find_all", RESTAURANTS_TABLE, async {
                sqlx::query_as::<_, Restaurant>(
                    "SELECT id, name, slug, body, address, image, lat, lng, created_at \
                     FROM restaurants ORDER BY rowid",
                )
                .fetch_all(&self.pool)
                .await
                .map_err(RepositoryError::from)
            })
            .await
    }

    #[instrument(skip(self, restaurant), fields(slug = %restaurant.slug))]
    async fn create(&self, restaurant: Restaurant) -> RepositoryResult<Restaurant> {
        self.tracer
            .trace_operation("create", RESTAURANTS_TABLE, async {
                sqlx::query(
                    "INSERT INTO restaurants (id, name, slug, body, address, image, lat, lng, created_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                )
                .bind(&restaurant.id)
                .bind(&restaurant.name)
                .bind(&restaurant.slug)
                .bind(&restaurant.body)
                .bind(&restaurant.address)
                .bind(&restaurant.image)
                .bind(restaurant.lat)
                .bind(restaurant.lng)
                .bind(restaurant.created_at)
                .execute(&self.pool)
                .await
                .map(|_| ())
                .map_err(RepositoryError::from)
            })
            .await?;

        Ok(restaurant)
    }

    #[instrument(skip(self))]
    async fn exists(&self, id: &str) -> RepositoryResult<bool> {
        self.tracer
            .trace_operation("exists", RESTAURANTS_TABLE, async {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM restaurants WHERE id = ?1")
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await
                    .map(|count| count > 0)
                    .map_err(RepositoryError::from)
            })
            .await
    }

    #[instrument(skip(self))]
    async fn count(&self) -> RepositoryResult<usize> {
        self.tracer
            .trace_operation("count", RESTAURANTS_TABLE, async {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM restaurants")
                    .fetch_one(&self.pool)
                    .await
                    .map(|count| count.max(0) as usize)
                    .map_err(RepositoryError::from)
            })
            .await
    }
}
