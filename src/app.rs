use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    middleware,
    routing::get,
    Router,
};
use sqlx::SqlitePool;
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::handlers::{
    create_admin_router, create_api_router, health_check, metrics_handler, request_validation_middleware,
    security_headers_middleware, MAX_REQUEST_SIZE,
};
use crate::observability::{observability_middleware, BusinessTracingMiddleware, Metrics};
use crate::repositories::{SchemaManager, SqliteRestaurantRepository, SqliteReviewRepository};
use crate::services::{RestaurantService, ReviewService};

/// Wire repositories, services and middleware into the HTTP application
pub fn create_app(pool: SqlitePool, metrics: Arc<Metrics>, request_timeout: Duration) -> Router {
    let restaurant_repository = Arc::new(SqliteRestaurantRepository::new(pool.clone(), metrics.clone()));
    let review_repository = Arc::new(SqliteReviewRepository::new(pool.clone(), metrics.clone()));

    let restaurant_service = Arc::new(RestaurantService::new(
        restaurant_repository.clone(),
        review_repository.clone(),
    ));
    let review_service = Arc::new(ReviewService::new(review_repository, restaurant_repository));
    let schema_manager = Arc::new(SchemaManager::new(pool));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(86400));

    let metrics_for_middleware = metrics.clone();

    Router::new()
        .route("/health/status", get(health_check))
        .route("/metrics", get(metrics_handler))
        .with_state(metrics.clone())
        .merge(create_api_router(
            restaurant_service.clone(),
            review_service,
            BusinessTracingMiddleware::new(metrics),
        ))
        .merge(create_admin_router(restaurant_service, schema_manager))
        // Outermost last
        .layer(DefaultBodyLimit::max(MAX_REQUEST_SIZE as usize))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn(request_validation_middleware))
        .layer(cors)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(move |req, next| {
            observability_middleware(metrics_for_middleware.clone(), req, next)
        }))
}
