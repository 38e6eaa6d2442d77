use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::models::{
    CreateReviewRequest, NearbyRestaurant, RestaurantDetails, Review, ReviewSummary, ServiceError,
};
use crate::observability::BusinessTracingMiddleware;
use crate::services::{RestaurantService, ReviewService};

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<Value>);

/// Shared application state containing all services
#[derive(Clone)]
pub struct ApiState {
    pub restaurant_service: Arc<RestaurantService>,
    pub review_service: Arc<ReviewService>,
    pub business: BusinessTracingMiddleware,
}

/// Query parameters for a proximity search
#[derive(Debug, Deserialize)]
pub struct DistanceQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Create API router with all endpoints
pub fn create_api_router(
    restaurant_service: Arc<RestaurantService>,
    review_service: Arc<ReviewService>,
    business: BusinessTracingMiddleware,
) -> Router {
    let state = ApiState {
        restaurant_service,
        review_service,
        business,
    };

    Router::new()
        .route("/api/restaurants", get(get_restaurants_by_distance))
        .route("/api/restaurants/:slug", get(get_restaurant))
        .route("/api/reviews", post(create_review))
        .route("/api/reviews/:restaurant_id", get(get_reviews))
        .with_state(state)
}

// =============================================================================
// RESTAURANT ENDPOINTS
// =============================================================================

/// Nearest restaurants to `lat`/`lng`, closest first
#[instrument(skip(state, query))]
pub async fn get_restaurants_by_distance(
    State(state): State<ApiState>,
    query: Result<Query<DistanceQuery>, QueryRejection>,
) -> Result<Json<Vec<NearbyRestaurant>>, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        warn!("Invalid query string: {}", rejection);
        bad_request(rejection.body_text())
    })?;

    let (lat, lng) = match (query.lat, query.lng) {
        (Some(lat), Some(lng)) => (lat, lng),
        _ => return Err(bad_request("lat and lng query parameters are required".to_string())),
    };

    let result = state
        .business
        .trace_restaurant_operation("get_by_distance", state.restaurant_service.get_by_distance(lat, lng))
        .await;

    match result {
        Ok(restaurants) => {
            info!("Returning {} nearby restaurants", restaurants.len());
            Ok(Json(restaurants))
        }
        Err(err) => {
            error!("Failed to rank restaurants: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

/// A restaurant and its rating summary
#[instrument(skip(state))]
pub async fn get_restaurant(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
) -> Result<Json<RestaurantDetails>, ApiError> {
    let result = state
        .business
        .trace_restaurant_operation("get_by_slug", state.restaurant_service.get_by_slug(&slug))
        .await;

    result.map(Json).map_err(|err| {
        error!("Failed to get restaurant {}: {}", slug, err);
        service_error_to_response(err)
    })
}

// =============================================================================
// REVIEW ENDPOINTS
// =============================================================================

#[instrument(skip(state, payload))]
pub async fn create_review(
    State(state): State<ApiState>,
    payload: Result<Json<CreateReviewRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Review>), ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Malformed review payload: {}", rejection);
        bad_request(rejection.body_text())
    })?;

    let restaurant_id = request.restaurant_id.clone();
    let result = state
        .business
        .trace_review_operation(
            "create",
            Some(restaurant_id.as_str()),
            state.review_service.create(request),
        )
        .await;

    match result {
        Ok(review) => {
            info!("Created review {} for restaurant {}", review.id, review.restaurant_id);
            Ok((StatusCode::CREATED, Json(review)))
        }
        Err(err) => {
            error!("Failed to create review: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

/// The five most recent reviews of a restaurant
#[instrument(skip(state))]
pub async fn get_reviews(
    State(state): State<ApiState>,
    Path(restaurant_id): Path<String>,
) -> Result<Json<Vec<ReviewSummary>>, ApiError> {
    let result = state
        .business
        .trace_review_operation(
            "get_by_restaurant",
            Some(restaurant_id.as_str()),
            state.review_service.get_reviews_by_restaurant_id(&restaurant_id),
        )
        .await;

    result.map(Json).map_err(|err| {
        error!("Failed to list reviews for {}: {}", restaurant_id, err);
        service_error_to_response(err)
    })
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn bad_request(message: String) -> ApiError {
    error_body(StatusCode::BAD_REQUEST, message, "validation_error")
}

pub(crate) fn error_body(status: StatusCode, message: String, kind: &str) -> ApiError {
    (
        status,
        Json(json!({
            "error": message,
            "kind": kind,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}

/// Convert ServiceError to HTTP response
pub fn service_error_to_response(err: ServiceError) -> ApiError {
    let kind = err.kind();
    let (status, message) = match &err {
        ServiceError::RestaurantNotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        ServiceError::ValidationError { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        ServiceError::StoreUnavailable { source } if source.is_unavailable() => {
            (StatusCode::SERVICE_UNAVAILABLE, "Store unavailable".to_string())
        }
        ServiceError::StoreUnavailable { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
        }
    };

    error_body(status, message, kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RepositoryError;

    #[test]
    fn test_not_found_maps_to_404() {
        let (status, Json(body)) = service_error_to_response(ServiceError::RestaurantNotFound {
            reference: "joes".to_string(),
        });

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "not_found");
        assert!(body["error"].as_str().unwrap().contains("joes"));
        assert!(body["timestamp"].is_string());
    }

    #[test]
    fn test_validation_maps_to_400() {
        let (status, Json(body)) = service_error_to_response(ServiceError::ValidationError {
            message: "burger_name too short".to_string(),
        });

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "validation_error");
    }

    #[test]
    fn test_store_errors_split_between_503_and_500() {
        let (status, Json(body)) = service_error_to_response(ServiceError::from(RepositoryError::Unavailable {
            message: "pool timed out".to_string(),
        }));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["kind"], "store_unavailable");

        let (status, Json(body)) = service_error_to_response(ServiceError::from(RepositoryError::Query {
            message: "syntax error".to_string(),
        }));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }
}
