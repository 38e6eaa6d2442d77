use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::models::{
    CreateReviewRequest, RepositoryError, Review, ReviewSummary, ServiceError, ServiceResult,
};
use crate::repositories::{RestaurantRepository, ReviewRepository};

/// Number of reviews returned when listing a restaurant's reviews
pub const RECENT_REVIEW_LIMIT: u32 = 5;

/// Service for submitting and listing burger reviews
pub struct ReviewService {
    review_repository: Arc<dyn ReviewRepository>,
    restaurant_repository: Arc<dyn RestaurantRepository>,
}

impl ReviewService {
    pub fn new(
        review_repository: Arc<dyn ReviewRepository>,
        restaurant_repository: Arc<dyn RestaurantRepository>,
    ) -> Self {
        Self {
            review_repository,
            restaurant_repository,
        }
    }

    /// Validate and persist a review
    #[instrument(skip(self, request), fields(restaurant_id = %request.restaurant_id, burger_name = %request.burger_name))]
    pub async fn create(&self, request: CreateReviewRequest) -> ServiceResult<Review> {
        let restaurant_id = request.restaurant_id.clone();
        let review = Review::new(request).map_err(|failure| {
            warn!(error = %failure, "Rejected review");
            ServiceError::from(failure)
        })?;

        match self.review_repository.create(review).await {
            Ok(stored) => {
                info!(review_id = %stored.id, "Review created");
                Ok(stored)
            }
            Err(RepositoryError::ForeignKeyViolation { .. }) => {
                warn!("Review references an unknown restaurant");
                Err(ServiceError::RestaurantNotFound {
                    reference: restaurant_id,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// The most recent reviews of a restaurant, newest first
    #[instrument(skip(self), fields(restaurant_id = %restaurant_id))]
    pub async fn get_reviews_by_restaurant_id(&self, restaurant_id: &str) -> ServiceResult<Vec<ReviewSummary>> {
        if !self.restaurant_repository.exists(restaurant_id).await? {
            return Err(ServiceError::RestaurantNotFound {
                reference: restaurant_id.to_string(),
            });
        }

        let reviews = self
            .review_repository
            .find_recent_by_restaurant(restaurant_id, RECENT_REVIEW_LIMIT)
            .await?;

        info!("Returning {} reviews", reviews.len());
        Ok(reviews.into_iter().map(ReviewSummary::from).collect())
    }
}
