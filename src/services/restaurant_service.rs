use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::models::{
    normalize_slug, rank_by_distance, validate_latitude, validate_longitude, validate_not_blank,
    Coordinates, CreateRestaurantRequest, NearbyRestaurant, RatingSummary, RepositoryError, Restaurant,
    RestaurantDetails, ServiceError, ServiceResult,
};
use crate::repositories::{RestaurantRepository, ReviewRepository};

/// Maximum number of restaurants returned by a proximity search
pub const NEARBY_RESTAURANT_LIMIT: usize = 10;

/// Restaurant lookup: slug resolution with rating aggregates, and proximity ranking
pub struct RestaurantService {
    restaurant_repository: Arc<dyn RestaurantRepository>,
    review_repository: Arc<dyn ReviewRepository>,
}

impl RestaurantService {
    pub fn new(
        restaurant_repository: Arc<dyn RestaurantRepository>,
        review_repository: Arc<dyn ReviewRepository>,
    ) -> Self {
        Self {
            restaurant_repository,
            review_repository,
        }
    }

    /// Resolve a restaurant by slug (case-insensitively) and attach its rating summary
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_by_slug(&self, slug: &str) -> ServiceResult<RestaurantDetails> {
        let normalized = normalize_slug(slug);
        if normalized.is_empty() {
            return Err(ServiceError::RestaurantNotFound {
                reference: slug.to_string(),
            });
        }

        let restaurant = self
            .restaurant_repository
            .find_by_slug(&normalized)
            .await?
            .ok_or_else(|| ServiceError::RestaurantNotFound {
                reference: slug.to_string(),
            })?;

        let totals = self.review_repository.rating_totals(&restaurant.id).await?;
        let summary = RatingSummary::from_totals(&totals);

        info!(restaurant_id = %restaurant.id, review_count = summary.count, "Restaurant resolved");
        Ok(restaurant.into_details(summary))
    }

    /// The nearest restaurants to a coordinate, closest first
    #[instrument(skip(self))]
    pub async fn get_by_distance(&self, lat: f64, lng: f64) -> ServiceResult<Vec<NearbyRestaurant>> {
        validate_latitude(lat)?;
        validate_longitude(lng)?;

        let restaurants = self.restaurant_repository.find_all().await?;
        let candidates = restaurants.len();

        let nearby: Vec<NearbyRestaurant> =
            rank_by_distance(Coordinates::new(lat, lng), restaurants, NEARBY_RESTAURANT_LIMIT)
                .into_iter()
                .map(|(restaurant, distance_km)| restaurant.into_nearby(distance_km))
                .collect();

        info!(candidates, returned = nearby.len(), "Ranked restaurants by distance");
        Ok(nearby)
    }

    /// Register a restaurant; used for seeding
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_restaurant(&self, request: CreateRestaurantRequest) -> ServiceResult<Restaurant> {
        validate_not_blank("name", &request.name)?;
        validate_not_blank("address", &request.address)?;
        if let Some(slug) = &request.slug {
            validate_not_blank("slug", slug)?;
        }
        validate_latitude(request.lat)?;
        validate_longitude(request.lng)?;

        let restaurant = Restaurant::new(request);
        let slug = restaurant.slug.clone();

        match self.restaurant_repository.create(restaurant).await {
            Ok(created) => {
                info!(restaurant_id = %created.id, slug = %created.slug, "Restaurant created");
                Ok(created)
            }
            Err(RepositoryError::Conflict { .. }) => {
                warn!(slug = %slug, "Slug already in use");
                Err(ServiceError::ValidationError {
                    message: format!("slug '{}' is already in use", slug),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Whether a restaurant with this slug is already registered
    pub async fn slug_exists(&self, slug: &str) -> ServiceResult<bool> {
        Ok(self
            .restaurant_repository
            .find_by_slug(&normalize_slug(slug))
            .await?
            .is_some())
    }
}
