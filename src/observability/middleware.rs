use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::{future::Future, sync::Arc, time::Instant};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::Metrics;

/// Middleware for request tracing and HTTP metrics
#[instrument(skip_all, fields(
    request_id = %Uuid::new_v4(),
    method = %request.method(),
    uri = %request.uri(),
))]
pub async fn observability_middleware(metrics: Arc<Metrics>, request: Request, next: Next) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();

    // Group by route template so path parameters don't explode label cardinality
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched_path| matched_path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    metrics.increment_in_flight(&method, &endpoint);

    let response = next.run(request).await;

    let duration = start_time.elapsed();
    let status_code = response.status().as_u16();

    metrics.record_http_request(&method, &endpoint, status_code, duration.as_secs_f64());
    metrics.decrement_in_flight(&method, &endpoint);

    if status_code >= 500 {
        error!(
            status_code = status_code,
            duration_ms = duration.as_millis(),
            "Request failed"
        );
    } else if status_code >= 400 {
        warn!(
            status_code = status_code,
            duration_ms = duration.as_millis(),
            "Request rejected"
        );
    } else {
        info!(
            status_code = status_code,
            duration_ms = duration.as_millis(),
            "Request completed"
        );
    }

    response
}

/// Times repository calls and records database metrics
#[derive(Clone)]
pub struct DatabaseTracingMiddleware {
    metrics: Arc<Metrics>,
}

impl DatabaseTracingMiddleware {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self { metrics }
    }

    #[instrument(skip_all, fields(operation = %operation, table = %table))]
    pub async fn trace_operation<F, T, E>(&self, operation: &str, table: &str, future: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let start_time = Instant::now();

        let result = future.await;
        let elapsed = start_time.elapsed();
        self.metrics
            .record_database_operation(operation, table, result.is_ok(), elapsed.as_secs_f64());

        match &result {
            Ok(_) => info!(duration_ms = elapsed.as_millis(), "Database operation completed"),
            Err(error) => error!(
                error = %error,
                duration_ms = elapsed.as_millis(),
                "Database operation failed"
            ),
        }

        result
    }
}

/// Records business-level outcomes for restaurant and review operations
#[derive(Clone)]
pub struct BusinessTracingMiddleware {
    metrics: Arc<Metrics>,
}

impl BusinessTracingMiddleware {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self { metrics }
    }

    #[instrument(skip_all, fields(operation = %operation))]
    pub async fn trace_restaurant_operation<F, T, E>(&self, operation: &str, future: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let start_time = Instant::now();
        let result = future.await;
        self.metrics.record_restaurant_operation(operation, result.is_ok());
        log_outcome("Restaurant", &result, start_time);
        result
    }

    #[instrument(skip_all, fields(operation = %operation, restaurant_id = restaurant_id))]
    pub async fn trace_review_operation<F, T, E>(
        &self,
        operation: &str,
        restaurant_id: Option<&str>,
        future: F,
    ) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let start_time = Instant::now();
        let result = future.await;
        self.metrics.record_review_operation(operation, result.is_ok());
        log_outcome("Review", &result, start_time);
        result
    }
}

fn log_outcome<T, E: std::fmt::Display>(subject: &str, result: &Result<T, E>, start_time: Instant) {
    let duration_ms = start_time.elapsed().as_millis();
    match result {
        Ok(_) => info!(duration_ms = duration_ms, "{} operation completed", subject),
        Err(error) => warn!(
            error = %error,
            duration_ms = duration_ms,
            "{} operation failed",
            subject
        ),
    }
}
