pub mod error;
pub mod lending;
pub mod rounding;
pub mod types;

pub use error::LendingError;
pub use types::*;

/// Standard result type for all lending operations
pub type LendingResult<T> = Result<T, LendingError>;
