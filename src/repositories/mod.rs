// Repositories module - data access layer

pub mod database;
pub mod restaurant_repository;
pub mod review_repository;
pub mod schema_manager;

#[cfg(test)]
mod tests;

pub use database::connect;
pub use restaurant_repository::{RestaurantRepository, SqliteRestaurantRepository};
pub use review_repository::{ReviewRepository, SqliteReviewRepository};
pub use schema_manager::SchemaManager;

pub const RESTAURANTS_TABLE: &str = "restaurants";
pub const REVIEWS_TABLE: &str = "reviews";
