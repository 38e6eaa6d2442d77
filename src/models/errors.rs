use thiserror::Error;

use super::ValidationFailure;

/// Errors raised by the persistence layer
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Item not found")]
    NotFound,

    #[error("Referenced row does not exist: {message}")]
    ForeignKeyViolation { message: String },

    #[error("Conflicting row already exists: {message}")]
    Conflict { message: String },

    #[error("Store unavailable: {message}")]
    Unavailable { message: String },

    #[error("Failed to decode row: {message}")]
    Decode { message: String },

    #[error("Query failed: {message}")]
    Query { message: String },
}

impl RepositoryError {
    /// True when the store could not be reached at all (as opposed to a query failing)
    pub fn is_unavailable(&self) -> bool {
        matches!(self, RepositoryError::Unavailable { .. })
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            sqlx::Error::Database(db_error) => {
                if db_error.is_foreign_key_violation() {
                    RepositoryError::ForeignKeyViolation {
                        message: db_error.message().to_string(),
                    }
                } else if db_error.is_unique_violation() {
                    RepositoryError::Conflict {
                        message: db_error.message().to_string(),
                    }
                } else {
                    RepositoryError::Query {
                        message: db_error.message().to_string(),
                    }
                }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed => {
                RepositoryError::Unavailable {
                    message: error.to_string(),
                }
            }
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::Configuration(_) => {
                RepositoryError::Unavailable {
                    message: error.to_string(),
                }
            }
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::Decode(_)
            | sqlx::Error::TypeNotFound { .. } => RepositoryError::Decode {
                message: error.to_string(),
            },
            other => RepositoryError::Query {
                message: other.to_string(),
            },
        }
    }
}

/// Errors surfaced by the restaurant and review services
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Restaurant not found: {reference}")]
    RestaurantNotFound { reference: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Store unavailable: {source}")]
    StoreUnavailable {
        #[from]
        source: RepositoryError,
    },
}

impl ServiceError {
    /// Stable machine-readable name of the error category
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::RestaurantNotFound { .. } => "not_found",
            ServiceError::ValidationError { .. } => "validation_error",
            ServiceError::StoreUnavailable { .. } => "store_unavailable",
        }
    }
}

impl From<ValidationFailure> for ServiceError {
    fn from(failure: ValidationFailure) -> Self {
        ServiceError::ValidationError {
            message: failure.to_string(),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
pub type ServiceResult<T> = Result<T, ServiceError>;
