//! Error types for cube merging.

use thiserror::Error;

/// Errors that can occur while merging cubes.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Two or more cubes are indistinguishable in both structure and value.
    /// Raised only under unique merging; the whole call fails, no partial
    /// result is returned.
    #[error("duplicate cubes detected for {cube}")]
    DuplicateData {
        /// Description of the offending group's shared metadata.
        cube: String,
    },

    /// `merge_cube` could not reduce the inputs to exactly one cube.
    #[error("expected a single merged cube, got {count}")]
    ExpectedSingleCube { count: usize },

    /// `merge_cube` was called with no cubes.
    #[error("cannot merge an empty cube sequence into a single cube")]
    EmptyInput,

    /// Cube construction failed while assembling a merged result.
    #[error(transparent)]
    Cube(#[from] cube_common::CubeError),
}

/// Result type for merge operations.
pub type Result<T> = std::result::Result<T, MergeError>;
