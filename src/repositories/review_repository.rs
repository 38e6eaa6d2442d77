use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::instrument;

use super::REVIEWS_TABLE;
use crate::models::{RatingTotals, RepositoryError, RepositoryResult, Review};
use crate::observability::{DatabaseTracingMiddleware, Metrics};

/// Access to review rows
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Insert a review; fails with `ForeignKeyViolation` when its restaurant does not exist
    async fn create(&self, review: Review) -> RepositoryResult<Review>;
    /// Newest first, at most `limit` rows
    async fn find_recent_by_restaurant(&self, restaurant_id: &str, limit: u32) -> RepositoryResult<Vec<Review>>;
    async fn rating_totals(&self, restaurant_id: &str) -> RepositoryResult<RatingTotals>;
}

pub struct SqliteReviewRepository {
    pool: SqlitePool,
    tracer: DatabaseTracingMiddleware,
}

impl SqliteReviewRepository {
    pub fn new(pool: SqlitePool, metrics: Arc<Metrics>) -> Self {
        Self {
            pool,
            tracer: DatabaseTracingMiddleware::new(metrics),
        }
    }
}

#[async_trait]
impl ReviewRepository for SqliteReviewRepository {
    #[instrument(skip(self, review), fields(restaurant_id = %review.restaurant_id))]
    async fn create(&self, review: Review) -> RepositoryResult<Review> {
        self.tracer
            .trace_operation("create", REVIEWS_TABLE, async {
                sqlx::query(
                    "INSERT INTO reviews (id, restaurant_id, burger_name, body, taste_rating, \
                     texture_rating, presentation_rating, created_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )
                .bind(&review.id)
                .bind(&review.restaurant_id)
                .bind(&review.burger_name)
                .bind(&review.body)
                .bind(i64::from(review.taste_rating))
                .bind(i64::from(review.texture_rating))
                .bind(i64::from(review.presentation_rating))
                .bind(review.created_at)
                .execute(&self.pool)
                .await
                .map(|_| ())
                .map_err(RepositoryError::from)
            })
            .await?;

        Ok(review)
    }

    #[instrument(skip(self))]
    async fn find_recent_by_restaurant(&self, restaurant_id: &str, limit: u32) -> RepositoryResult<Vec<Review>> {
        self.tracer
            .trace_operation("find_recent_by_restaurant", REVIEWS_TABLE, async {
                // rowid breaks ties between reviews stored within the same instant
                sqlx::query_as::<_, Review>(
                    "SELECT id, restaurant_id, burger_name, body, taste_rating, texture_rating, \
                     presentation_rating, created_at \
                     FROM reviews WHERE restaurant_id = ?1 \
                     ORDER BY created_at DESC, rowid DESC LIMIT ?2",
                )
                .bind(restaurant_id)
                .bind(i64::from(limit))
                .fetch_all(&self.pool)
                .await
                .map_err(RepositoryError::from)
            })
            .await
    }

    #[instrument(skip(self))]
    async fn rating_totals(&self, restaurant_id: &str) -> RepositoryResult<RatingTotals> {
        self.tracer
            .trace_operation("rating_totals", REVIEWS_TABLE, async {
                sqlx::query_as::<_, (i64, Option<i64>, Option<i64>, Option<i64>)>(
                    "SELECT COUNT(*), SUM(taste_rating), SUM(texture_rating), SUM(presentation_rating) \
                     FROM reviews WHERE restaurant_id = ?1",
                )
                .bind(restaurant_id)
                .fetch_one(&self.pool)
                .await
                .map(|(count, taste_sum, texture_sum, presentation_sum)| RatingTotals {
                    count,
                    taste_sum: taste_sum.unwrap_or(0),
                    texture_sum: texture_sum.unwrap_or(0),
                    presentation_sum: presentation_sum.unwrap_or(0),
                })
                .map_err(RepositoryError::from)
            })
            .await
    }
}
