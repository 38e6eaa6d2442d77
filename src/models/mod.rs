// Re-export all model types
pub use self::errors::*;
pub use self::location::*;
pub use self::restaurant::*;
pub use self::review::*;
pub use self::validation::*;

mod errors;
mod location;
mod restaurant;
mod review;
mod validation;
