use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{validate_burger_name, ValidationFailure, RATING_MAX, RATING_MIN};

/// A star rating in the closed range `RATING_MIN..=RATING_MAX`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Rating(u8);

impl Rating {
    /// Parse a rating, naming `field` in the failure
    pub fn parse(field: &'static str, value: i64) -> Result<Self, ValidationFailure> {
        if !(RATING_MIN..=RATING_MAX).contains(&value) {
            return Err(ValidationFailure::OutOfRange {
                field,
                min: RATING_MIN,
                max: RATING_MAX,
                actual: value,
            });
        }
        // bounds checked above
        Ok(Self(value as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = ValidationFailure;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Rating::parse("rating", value)
    }
}

impl From<Rating> for i64 {
    fn from(rating: Rating) -> Self {
        i64::from(rating.0)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A review row as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: String,
    pub restaurant_id: String,
    pub burger_name: String,
    pub body: Option<String>,
    #[sqlx(try_from = "i64")]
    pub taste_rating: Rating,
    #[sqlx(try_from = "i64")]
    pub texture_rating: Rating,
    #[sqlx(try_from = "i64")]
    pub presentation_rating: Rating,
    pub created_at: DateTime<Utc>,
}

/// Request model for submitting a review.
///
/// Ratings arrive as plain integers so out-of-range values reach validation
/// instead of failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReviewRequest {
    pub restaurant_id: String,
    pub burger_name: String,
    #[serde(default)]
    pub body: Option<String>,
    pub taste_rating: i64,
    pub texture_rating: i64,
    pub presentation_rating: i64,
}

/// Display projection of a review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub burger_name: String,
    pub body: Option<String>,
    pub taste_rating: Rating,
    pub texture_rating: Rating,
    pub presentation_rating: Rating,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Validate a request and build a review with generated ID and timestamp
    pub fn new(request: CreateReviewRequest) -> Result<Self, ValidationFailure> {
        validate_burger_name(&request.burger_name)?;
        let taste_rating = Rating::parse("taste_rating", request.taste_rating)?;
        let texture_rating = Rating::parse("texture_rating", request.texture_rating)?;
        let presentation_rating =
            Rating::parse("presentation_rating", request.presentation_rating)?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            restaurant_id: request.restaurant_id,
            burger_name: request.burger_name,
            body: request.body,
            taste_rating,
            texture_rating,
            presentation_rating,
            created_at: Utc::now(),
        })
    }
}

impl From<Review> for ReviewSummary {
    fn from(review: Review) -> Self {
        Self {
            burger_name: review.burger_name,
            body: review.body,
            taste_rating: review.taste_rating,
            texture_rating: review.texture_rating,
            presentation_rating: review.presentation_rating,
            created_at: review.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_review_request() -> CreateReviewRequest {
        CreateReviewRequest {
            restaurant_id: "r-1".to_string(),
            burger_name: "Double Cheese".to_string(),
            body: None,
            taste_rating: 4,
            texture_rating: 3,
            presentation_rating: 0,
        }
    }

    #[test]
    fn test_review_creation() {
        let review = Review::new(create_test_review_request()).unwrap();

        assert_eq!(review.restaurant_id, "r-1");
        assert_eq!(review.taste_rating.value(), 4);
        assert_eq!(review.presentation_rating.value(), 0);
        assert!(Uuid::parse_str(&review.id).is_ok());
    }

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::parse("taste_rating", 4).is_ok());
        assert!(Rating::parse("taste_rating", 0).is_ok());
        assert!(Rating::parse("taste_rating", 5).is_err());
        assert!(Rating::parse("taste_rating", -1).is_err());
    }

    #[test]
    fn test_review_rejects_out_of_range_rating() {
        let mut request = create_test_review_request();
        request.texture_rating = 5;

        let err = Review::new(request).unwrap_err();

        assert_eq!(
            err,
            ValidationFailure::OutOfRange {
                field: "texture_rating",
                min: 0,
                max: 4,
                actual: 5,
            }
        );
    }

    #[test]
    fn test_review_rejects_short_burger_name() {
        let mut request = create_test_review_request();
        request.burger_name = "ab".to_string();

        assert!(matches!(
            Review::new(request),
            Err(ValidationFailure::Length { field: "burger_name", .. })
        ));
    }

    #[test]
    fn test_rating_serializes_as_integer() {
        let json = serde_json::to_string(&Rating::parse("taste_rating", 3).unwrap()).unwrap();
        assert_eq!(json, "3");

        assert!(serde_json::from_str::<Rating>("7").is_err());
    }

    #[test]
    fn test_summary_projection_drops_store_fields() {
        let review = Review::new(create_test_review_request()).unwrap();
        let created_at = review.created_at;

        let summary = ReviewSummary::from(review);
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(summary.burger_name, "Double Cheese");
        assert_eq!(summary.created_at, created_at);
        assert!(json.get("id").is_none());
        assert!(json.get("restaurant_id").is_none());
    }
}
