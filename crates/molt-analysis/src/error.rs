//! Error types for analysis operations.
//!
//! Only precondition violations surface as errors. Soft conditions
//! (unresolvable symbols, unparseable files, unknown hook arguments) are
//! handled by returning empty results at the site in question.

use thiserror::Error;

/// Errors that can occur while building or analyzing a project.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Two input sources share the same path.
    #[error("duplicate source path: {0}")]
    DuplicatePath(String),
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;
