//! # molt
//!
//! Molt foundation crate - shared error types and OXC re-exports.
//!
//! This crate provides the common ground for the molt workspace. For the data
//! model and the analysis engine, use the `molt-graph` and `molt-analysis`
//! crates respectively.

// Re-export OXC foundation types for consistent version usage across workspace
// These are commonly used types that appear in public APIs and cross crate boundaries
pub mod oxc {
    //! OXC (Oxidation Compiler) foundation types re-exported for workspace consistency.
    //!
    //! This ensures all workspace crates use the same OXC version for types that
    //! cross crate boundaries.

    /// Re-export allocator - required for all OXC AST operations
    pub use oxc_allocator::Allocator;

    /// Re-export AST types
    pub use oxc_ast::ast;

    /// Re-export AST visitor trait and walk functions
    pub use oxc_ast_visit::{walk, Visit};

    /// Re-export span types for source location tracking
    pub use oxc_span::{GetSpan, SourceType, Span};

    /// Re-export parser for code analysis
    pub use oxc_parser::{Parser, ParserReturn};

    /// Re-export semantic analysis
    pub use oxc_semantic::{ScopeFlags, Scoping, Semantic, SemanticBuilder, SymbolFlags};
}

/// Error types for molt operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input provided to the core.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Project construction error.
    #[error("Project error: {0}")]
    Project(String),

    /// Analysis operation error.
    #[error("Operation error: {0}")]
    Operation(String),
}

/// Result type alias for molt operations.
pub type Result<T> = std::result::Result<T, Error>;
