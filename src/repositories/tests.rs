use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use super::*;
use crate::config::DatabaseConfig;
use crate::models::{CreateRestaurantRequest, CreateReviewRequest, RepositoryError, Restaurant, Review};
use crate::observability::Metrics;

async fn setup_pool() -> SqlitePool {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        ..Default::default()
    };
    let pool = connect(&config).await.unwrap();
    SchemaManager::new(pool.clone()).create_all_tables().await.unwrap();
    pool
}

fn repositories(pool: &SqlitePool) -> (SqliteRestaurantRepository, SqliteReviewRepository, Arc<Metrics>) {
    let metrics = Arc::new(Metrics::new().unwrap());
    (
        SqliteRestaurantRepository::new(pool.clone(), metrics.clone()),
        SqliteReviewRepository::new(pool.clone(), metrics.clone()),
        metrics,
    )
}

fn restaurant(name: &str, slug: &str, lat: f64, lng: f64) -> Restaurant {
    Restaurant::new(CreateRestaurantRequest {
        name: name.to_string(),
        slug: Some(slug.to_string()),
        body: None,
        address: "1 Main St".to_string(),
        image: "burger.jpg".to_string(),
        lat,
        lng,
    })
}

fn review(restaurant_id: &str, burger_name: &str, taste: i64) -> Review {
    Review::new(CreateReviewRequest {
        restaurant_id: restaurant_id.to_string(),
        burger_name: burger_name.to_string(),
        body: Some("Juicy".to_string()),
        taste_rating: taste,
        texture_rating: 2,
        presentation_rating: 1,
    })
    .unwrap()
}

#[tokio::test]
async fn test_schema_manager_is_idempotent() {
    let pool = setup_pool().await;
    let manager = SchemaManager::new(pool);

    let created = manager.create_all_tables().await.unwrap();

    assert_eq!(created, vec!["restaurants".to_string(), "reviews".to_string()]);
    assert!(manager.table_exists("restaurants").await.unwrap());
    assert!(manager.table_exists("reviews").await.unwrap());
    assert!(!manager.table_exists("menus").await.unwrap());
    assert_eq!(manager.list_tables().await.unwrap(), vec!["restaurants", "reviews"]);
}

#[tokio::test]
async fn test_restaurant_create_and_find_by_slug() {
    let pool = setup_pool().await;
    let (restaurants, _, metrics) = repositories(&pool);

    let created = restaurants
        .create(restaurant("Joe's", "joe's", 40.0, -74.0))
        .await
        .unwrap();

    let found = restaurants.find_by_slug("joe's").await.unwrap().unwrap();
    assert_eq!(found, created);

    let by_id = restaurants.find_by_id(&created.id).await.unwrap();
    assert_eq!(by_id, Some(created));

    assert!(restaurants.find_by_slug("Joe's").await.unwrap().is_none());

    let encoded = metrics.encode().unwrap();
    assert!(encoded.contains("find_by_slug"));
}

#[tokio::test]
async fn test_duplicate_slug_is_conflict() {
    let pool = setup_pool().await;
    let (restaurants, _, _) = repositories(&pool);

    restaurants.create(restaurant("Joe's", "joes", 0.0, 0.0)).await.unwrap();
    let err = restaurants
        .create(restaurant("Joe's Again", "joes", 1.0, 1.0))
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::Conflict { .. }));
    assert_eq!(restaurants.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_find_all_keeps_insertion_order() {
    let pool = setup_pool().await;
    let (restaurants, _, _) = repositories(&pool);

    for (index, slug) in ["zeta", "alpha", "mid"].iter().enumerate() {
        restaurants
            .create(restaurant(slug, slug, index as f64, 0.0))
            .await
            .unwrap();
    }

    let slugs: Vec<String> = restaurants
        .find_all()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.slug)
        .collect();

    assert_eq!(slugs, vec!["zeta", "alpha", "mid"]);
}

#[tokio::test]
async fn test_exists() {
    let pool = setup_pool().await;
    let (restaurants, _, _) = repositories(&pool);

    let created = restaurants.create(restaurant("Joe's", "joes", 0.0, 0.0)).await.unwrap();

    assert!(restaurants.exists(&created.id).await.unwrap());
    assert!(!restaurants.exists("missing").await.unwrap());
}

#[tokio::test]
async fn test_review_for_missing_restaurant_is_foreign_key_violation() {
    let pool = setup_pool().await;
    let (_, reviews, _) = repositories(&pool);

    let err = reviews.create(review("missing", "Cheeseburger", 3)).await.unwrap_err();

    assert!(matches!(err, RepositoryError::ForeignKeyViolation { .. }));
}

#[tokio::test]
async fn test_recent_reviews_newest_first_and_limited() {
    let pool = setup_pool().await;
    let (restaurants, reviews, _) = repositories(&pool);
    let owner = restaurants.create(restaurant("Joe's", "joes", 0.0, 0.0)).await.unwrap();

    let base = Utc::now();
    for index in 0..6 {
        let mut r = review(&owner.id, &format!("Burger {}", index), 3);
        r.created_at = base + Duration::seconds(index);
        reviews.create(r).await.unwrap();
    }

    let recent = reviews.find_recent_by_restaurant(&owner.id, 5).await.unwrap();
    let names: Vec<_> = recent.iter().map(|r| r.burger_name.as_str()).collect();

    assert_eq!(names, vec!["Burger 5", "Burger 4", "Burger 3", "Burger 2", "Burger 1"]);
}

#[tokio::test]
async fn test_recent_reviews_tie_break_on_insertion_order() {
    let pool = setup_pool().await;
    let (restaurants, reviews, _) = repositories(&pool);
    let owner = restaurants.create(restaurant("Joe's", "joes", 0.0, 0.0)).await.unwrap();

    let instant = Utc::now();
    for name in ["First", "Second", "Third"] {
        let mut r = review(&owner.id, name, 2);
        r.created_at = instant;
        reviews.create(r).await.unwrap();
    }

    let recent = reviews.find_recent_by_restaurant(&owner.id, 5).await.unwrap();
    let names: Vec<_> = recent.iter().map(|r| r.burger_name.as_str()).collect();

    assert_eq!(names, vec!["Third", "Second", "First"]);
}

#[tokio::test]
async fn test_review_round_trip_preserves_fields() {
    let pool = setup_pool().await;
    let (restaurants, reviews, _) = repositories(&pool);
    let owner = restaurants.create(restaurant("Joe's", "joes", 0.0, 0.0)).await.unwrap();

    let stored = reviews.create(review(&owner.id, "Smash", 4)).await.unwrap();
    let loaded = reviews.find_recent_by_restaurant(&owner.id, 5).await.unwrap();

    assert_eq!(loaded, vec![stored]);
}

#[tokio::test]
async fn test_rating_totals() {
    let pool = setup_pool().await;
    let (restaurants, reviews, _) = repositories(&pool);
    let owner = restaurants.create(restaurant("Joe's", "joes", 0.0, 0.0)).await.unwrap();
    let other = restaurants.create(restaurant("Other", "other", 0.0, 0.0)).await.unwrap();

    let empty = reviews.rating_totals(&owner.id).await.unwrap();
    assert_eq!(empty.count, 0);
    assert_eq!(empty.taste_sum, 0);

    reviews.create(review(&owner.id, "One", 4)).await.unwrap();
    reviews.create(review(&owner.id, "Two", 1)).await.unwrap();
    reviews.create(review(&other.id, "Elsewhere", 0)).await.unwrap();

    let totals = reviews.rating_totals(&owner.id).await.unwrap();
    assert_eq!(totals.count, 2);
    assert_eq!(totals.taste_sum, 5);
    assert_eq!(totals.texture_sum, 4);
    assert_eq!(totals.presentation_sum, 2);
}

#[tokio::test]
async fn test_closed_pool_is_unavailable() {
    let pool = setup_pool().await;
    let (restaurants, _, _) = repositories(&pool);

    pool.close().await;
    let err = restaurants.find_by_slug("joes").await.unwrap_err();

    assert!(err.is_unavailable());
}
