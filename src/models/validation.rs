use thiserror::Error;

pub const BURGER_NAME_MIN_LENGTH: usize = 3;
pub const BURGER_NAME_MAX_LENGTH: usize = 50;
pub const RATING_MIN: i64 = 0;
pub const RATING_MAX: i64 = 4;

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationFailure {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("{field} must be between {min} and {max} characters long, got {actual}")]
    Length {
        field: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("{field} must be an integer between {min} and {max}, got {actual}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        actual: i64,
    },

    #[error("{field} must be a finite number between {min} and {max}")]
    InvalidCoordinate {
        field: &'static str,
        min: f64,
        max: f64,
    },
}

/// Burger names are counted in characters, not bytes
pub fn validate_burger_name(burger_name: &str) -> Result<(), ValidationFailure> {
    let length = burger_name.chars().count();
    if !(BURGER_NAME_MIN_LENGTH..=BURGER_NAME_MAX_LENGTH).contains(&length) {
        return Err(ValidationFailure::Length {
            field: "burger_name",
            min: BURGER_NAME_MIN_LENGTH,
            max: BURGER_NAME_MAX_LENGTH,
            actual: length,
        });
    }
    Ok(())
}

pub fn validate_not_blank(field: &'static str, value: &str) -> Result<(), ValidationFailure> {
    if value.trim().is_empty() {
        return Err(ValidationFailure::Empty { field });
    }
    Ok(())
}

pub fn validate_latitude(lat: f64) -> Result<(), ValidationFailure> {
    validate_coordinate("lat", lat, 90.0)
}

pub fn validate_longitude(lng: f64) -> Result<(), ValidationFailure> {
    validate_coordinate("lng", lng, 180.0)
}

fn validate_coordinate(field: &'static str, value: f64, bound: f64) -> Result<(), ValidationFailure> {
    if !value.is_finite() || value < -bound || value > bound {
        return Err(ValidationFailure::InvalidCoordinate {
            field,
            min: -bound,
            max: bound,
        });
    }
    Ok(())
}
