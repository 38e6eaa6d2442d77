use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Coordinates, Located};

/// A restaurant row as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub body: Option<String>,
    pub address: String,
    pub image: String,
    pub lat: f64,
    pub lng: f64,
    pub created_at: DateTime<Utc>,
}

/// Request model for registering a restaurant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRestaurantRequest {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    pub address: String,
    pub image: String,
    pub lat: f64,
    pub lng: f64,
}

/// Restaurant with its review statistics, as returned by a slug lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantDetails {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub body: Option<String>,
    pub address: String,
    pub image: String,
    pub reviews: RatingSummary,
}

/// Restaurant listed by proximity to a caller coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyRestaurant {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub address: String,
    pub image: String,
    pub lat: f64,
    pub lng: f64,
    pub distance_km: f64,
}

/// Raw review totals for one restaurant, as summed by the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingTotals {
    pub count: i64,
    pub taste_sum: i64,
    pub texture_sum: i64,
    pub presentation_sum: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub count: i64,
    pub average: RatingAverages,
}

/// Per-dimension means, always carrying exactly one decimal place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingAverages {
    pub taste_rating: Decimal,
    pub texture_rating: Decimal,
    pub presentation_rating: Decimal,
}

impl Restaurant {
    /// Create a new Restaurant with generated ID and timestamp
    pub fn new(request: CreateRestaurantRequest) -> Self {
        let slug = match request.slug.as_deref() {
            Some(slug) => normalize_slug(slug),
            None => slug_from_name(&request.name),
        };

        Self {
            id: Uuid::new_v4().to_string(),
            name: request.name.trim().to_string(),
            slug,
            body: request.body,
            address: request.address,
            image: request.image,
            lat: request.lat,
            lng: request.lng,
            created_at: Utc::now(),
        }
    }

    /// Name with the first letter capitalised and the rest lowercased
    pub fn display_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.as_str().to_lowercase().chars())
                .collect(),
            None => String::new(),
        }
    }

    pub fn into_details(self, reviews: RatingSummary) -> RestaurantDetails {
        RestaurantDetails {
            name: self.display_name(),
            id: self.id,
            slug: self.slug,
            body: self.body,
            address: self.address,
            image: self.image,
            reviews,
        }
    }

    pub fn into_nearby(self, distance_km: f64) -> NearbyRestaurant {
        NearbyRestaurant {
            name: self.display_name(),
            id: self.id,
            slug: self.slug,
            address: self.address,
            image: self.image,
            lat: self.lat,
            lng: self.lng,
            distance_km,
        }
    }
}

impl Located for Restaurant {
    fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

/// Lookup form of a slug: trimmed and lowercased
pub fn normalize_slug(slug: &str) -> String {
    slug.trim().to_lowercase()
}

/// Slug derived from a display name when none is supplied
pub fn slug_from_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

impl RatingSummary {
    pub fn from_totals(totals: &RatingTotals) -> Self {
        Self {
            count: totals.count,
            average: RatingAverages {
                taste_rating: average_of(totals.taste_sum, totals.count),
                texture_rating: average_of(totals.texture_sum, totals.count),
                presentation_rating: average_of(totals.presentation_sum, totals.count),
            },
        }
    }
}

/// Mean rounded half away from zero and fixed at one decimal place; zero when there is nothing to average
fn average_of(sum: i64, count: i64) -> Decimal {
    let mut average = if count > 0 {
        (Decimal::from(sum) / Decimal::from(count))
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    } else {
        Decimal::ZERO
    };
    average.rescale(1);
    average
}
