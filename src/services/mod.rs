// Services module - business logic layer

pub mod restaurant_service;
pub mod review_service;

pub use restaurant_service::{RestaurantService, NEARBY_RESTAURANT_LIMIT};
pub use review_service::{ReviewService, RECENT_REVIEW_LIMIT};
