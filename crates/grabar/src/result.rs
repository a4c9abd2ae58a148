//! Result and error types for Grabar.

use thiserror::Error;

/// Result type for Grabar operations
pub type GrabarResult<T> = Result<T, GrabarError>;

/// Errors that can occur in Grabar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrabarError {
    /// Event pushed into a matcher that is not started
    #[error("Matcher is inactive. Call start() before pushing events")]
    Inactive,
}
