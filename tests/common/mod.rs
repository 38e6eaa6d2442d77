#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use burger_ratings::{
    config::DatabaseConfig,
    create_app,
    repositories::{connect, SchemaManager},
    Metrics,
};
use reqwest::Client;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tokio::net::TcpListener;

pub struct TestEnvironment {
    pub client: Client,
    pub base_url: String,
    pub pool: SqlitePool,
}

impl TestEnvironment {
    /// Serve the real application over an in-memory database on an ephemeral port
    pub async fn new() -> Self {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            ..Default::default()
        };
        let pool = connect(&config).await.expect("Failed to open database");
        SchemaManager::new(pool.clone())
            .create_all_tables()
            .await
            .expect("Failed to create schema");

        let metrics = Arc::new(Metrics::new().expect("Failed to create metrics"));
        let app = create_app(pool.clone(), metrics, Duration::from_secs(30));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to get local address");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Failed to serve app");
        });

        // Wait for server to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        Self {
            client: Client::new(),
            base_url,
            pool,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn seed(&self) -> Value {
        let response = self
            .client
            .post(self.url("/api/admin/seed"))
            .send()
            .await
            .expect("Failed to seed data");
        assert_eq!(response.status().as_u16(), 200);
        response.json().await.expect("Failed to parse seed response")
    }

    /// Look a restaurant up by slug and return its id
    pub async fn restaurant_id(&self, slug: &str) -> String {
        let response = self
            .client
            .get(self.url(&format!("/api/restaurants/{}", slug)))
            .send()
            .await
            .expect("Failed to get restaurant");
        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.expect("Failed to parse restaurant");
        body["id"].as_str().expect("restaurant id").to_string()
    }

    pub async fn post_review(&self, restaurant_id: &str, burger_name: &str, ratings: [i64; 3]) -> reqwest::Response {
        self.client
            .post(self.url("/api/reviews"))
            .json(&json!({
                "restaurant_id": restaurant_id,
                "burger_name": burger_name,
                "body": "Tested",
                "taste_rating": ratings[0],
                "texture_rating": ratings[1],
                "presentation_rating": ratings[2],
            }))
            .send()
            .await
            .expect("Failed to post review")
    }
}
