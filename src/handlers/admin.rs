use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::models::{normalize_slug, slug_from_name, CreateRestaurantRequest};
use crate::repositories::SchemaManager;
use crate::services::RestaurantService;

/// Admin state containing services
#[derive(Clone)]
pub struct AdminState {
    pub restaurant_service: Arc<RestaurantService>,
    pub schema_manager: Arc<SchemaManager>,
}

/// Response for seeding operations
#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub message: String,
    pub restaurants_created: usize,
    pub restaurants_skipped: usize,
    pub timestamp: String,
}

/// Response for table setup operations
#[derive(Debug, Serialize)]
pub struct SetupTablesResponse {
    pub message: String,
    pub tables_created: Vec<String>,
    pub timestamp: String,
}

/// Create admin router with database management endpoints
pub fn create_admin_router(
    restaurant_service: Arc<RestaurantService>,
    schema_manager: Arc<SchemaManager>,
) -> Router {
    let state = AdminState {
        restaurant_service,
        schema_manager,
    };

    Router::new()
        .route("/api/admin/setup-tables", post(setup_tables))
        .route("/api/admin/seed", post(seed_database))
        .with_state(state)
}

/// Create the schema if it is missing
#[instrument(skip(state))]
pub async fn setup_tables(
    State(state): State<AdminState>,
) -> Result<Json<SetupTablesResponse>, (StatusCode, Json<Value>)> {
    let timestamp = chrono::Utc::now().to_rfc3339();

    info!("Setting up database tables");

    match state.schema_manager.create_all_tables().await {
        Ok(tables_created) => {
            info!("Tables ready: {:?}", tables_created);

            Ok(Json(SetupTablesResponse {
                message: format!("Successfully created {} tables", tables_created.len()),
                tables_created,
                timestamp,
            }))
        }
        Err(err) => {
            error!("Failed to create tables: {}", err);
            let status = if err.is_unavailable() {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            Err((
                status,
                Json(json!({
                    "error": "Failed to create tables",
                    "message": err.to_string(),
                    "timestamp": timestamp,
                })),
            ))
        }
    }
}

/// Insert the sample restaurants that are not already present
#[instrument(skip(state))]
pub async fn seed_database(
    State(state): State<AdminState>,
) -> Result<Json<SeedResponse>, (StatusCode, Json<Value>)> {
    let timestamp = chrono::Utc::now().to_rfc3339();

    info!("Seeding database with sample restaurants");

    let mut created_count = 0;
    let mut skipped_count = 0;
    let mut errors = Vec::new();

    for request in create_sample_restaurants() {
        let slug = seed_slug(&request);

        match state.restaurant_service.slug_exists(&slug).await {
            Ok(true) => {
                skipped_count += 1;
                continue;
            }
            Ok(false) => {}
            Err(err) => {
                warn!("Failed to check restaurant {}: {}", slug, err);
                errors.push(format!("{}: {}", slug, err));
                continue;
            }
        }

        match state.restaurant_service.create_restaurant(request).await {
            Ok(restaurant) => {
                created_count += 1;
                info!("Seeded restaurant: {}", restaurant.slug);
            }
            Err(err) => {
                warn!("Failed to seed restaurant {}: {}", slug, err);
                errors.push(format!("{}: {}", slug, err));
            }
        }
    }

    if errors.is_empty() || created_count + skipped_count > 0 {
        if !errors.is_empty() {
            warn!("Database seeding completed with {} errors", errors.len());
        }

        Ok(Json(SeedResponse {
            message: format!(
                "Seeded {} restaurants, {} already present, {} errors",
                created_count,
                skipped_count,
                errors.len()
            ),
            restaurants_created: created_count,
            restaurants_skipped: skipped_count,
            timestamp,
        }))
    } else {
        Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Failed to seed database",
                "details": errors,
                "timestamp": timestamp,
            })),
        ))
    }
}

fn seed_slug(request: &CreateRestaurantRequest) -> String {
    match &request.slug {
        Some(slug) => normalize_slug(slug),
        None => slug_from_name(&request.name),
    }
}

fn sample(name: &str, body: &str, address: &str, image: &str, lat: f64, lng: f64) -> CreateRestaurantRequest {
    CreateRestaurantRequest {
        name: name.to_string(),
        slug: None,
        body: Some(body.to_string()),
        address: address.to_string(),
        image: image.to_string(),
        lat,
        lng,
    }
}

/// Sample restaurants spread across a few cities
pub fn create_sample_restaurants() -> Vec<CreateRestaurantRequest> {
    vec![
        sample(
            "Patty Palace",
            "Smashed double patties on toasted potato buns.",
            "12 Market Street, San Francisco, CA",
            "patty-palace.jpg",
            37.7936,
            -122.3958,
        ),
        sample(
            "Grill Theory",
            "Dry-aged chuck, charcoal grill, house pickles.",
            "480 Valencia Street, San Francisco, CA",
            "grill-theory.jpg",
            37.7649,
            -122.4219,
        ),
        sample(
            "Bun Voyage",
            "Regional burgers from around the world.",
            "221 Pike Street, Seattle, WA",
            "bun-voyage.jpg",
            47.6097,
            -122.3405,
        ),
        sample(
            "The Sesame Seed",
            "Classic diner burgers and thick shakes.",
            "75 Lafayette Street, New York, NY",
            "the-sesame-seed.jpg",
            40.7168,
            -74.0021,
        ),
        sample(
            "Brisket and Bun",
            "Brisket blend patties with smoked onions.",
            "1100 Congress Avenue, Austin, TX",
            "brisket-and-bun.jpg",
            30.2747,
            -97.7404,
        ),
        sample(
            "Camden Smash",
            "Late-night smash burgers by the canal.",
            "Camden Lock Place, London",
            "camden-smash.jpg",
            51.5413,
            -0.1466,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_create_sample_restaurants() {
        let samples = create_sample_restaurants();
        let slugs: HashSet<String> = samples.iter().map(seed_slug).collect();

        // Slugs are unique so seeding never trips the unique index
        assert_eq!(slugs.len(), samples.len());
        assert!(slugs.contains("patty-palace"));

        for restaurant in &samples {
            assert!(!restaurant.name.trim().is_empty());
            assert!(!restaurant.address.trim().is_empty());
            assert!((-90.0..=90.0).contains(&restaurant.lat));
            assert!((-180.0..=180.0).contains(&restaurant.lng));
        }
    }

    #[test]
    fn test_seed_response_serialization() {
        let response = SeedResponse {
            message: "Seeded 6 restaurants".to_string(),
            restaurants_created: 6,
            restaurants_skipped: 0,
            timestamp: "2024-01-01T00:00:00Z".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("restaurants_created"));
        assert!(json.contains("restaurants_skipped"));
    }
}
