//! Error type for furrow operations.
//!
//! ## Rust Lesson #20: Error Handling
//!
//! Rust uses `Result<T, E>` instead of exceptions. `thiserror` derives the
//! `Display` and `std::error::Error` impls from the `#[error(...)]` strings,
//! so each variant carries its own user-facing message.
//!
//! Degenerate geometry is deliberately absent here: a zero-length line or a
//! zero-area polygon means "nothing to generate" and comes back as an empty
//! result, not an error.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FurrowError {
    /// Operator input that cannot drive the operation.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The selected polygon has no ring that survives validation.
    #[error("no valid contours in the selected geometry")]
    NoValidContour,

    /// The operation was given the wrong kind of geometry.
    #[error("unsupported geometry: expected {expected}, found {found}")]
    UnsupportedGeometry {
        expected: &'static str,
        found: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, FurrowError>;
