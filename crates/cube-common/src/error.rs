//! Error types for cube construction and data access.

use thiserror::Error;

/// Result type alias using CubeError.
pub type CubeResult<T> = Result<T, CubeError>;

/// Errors raised when assembling or mutating a cube.
#[derive(Debug, Error)]
pub enum CubeError {
    /// A dimension coordinate's length does not match its payload axis.
    #[error("coordinate '{name}' has {values} values but axis {axis} has length {len}")]
    CoordLengthMismatch {
        name: String,
        values: usize,
        axis: usize,
        len: usize,
    },

    /// Bounds were supplied with a different length than the values.
    #[error("coordinate '{name}' has {bounds} bounds for {values} values")]
    BoundsLengthMismatch {
        name: String,
        bounds: usize,
        values: usize,
    },

    /// Dimension coordinates must hold numeric values.
    #[error("dimension coordinate '{0}' must be numeric")]
    NonNumericDimCoord(String),

    /// Dimension coordinate values must be strictly monotonic.
    #[error("dimension coordinate '{0}' values must be strictly monotonic")]
    NonMonotonicDimCoord(String),

    /// A coordinate referenced a payload axis that does not exist.
    #[error("axis {axis} out of range for payload with {ndim} dimensions")]
    AxisOutOfRange { axis: usize, ndim: usize },

    /// An auxiliary coordinate's shape does not match the axes it spans.
    #[error("auxiliary coordinate '{name}' has shape {coord:?} but spans axes of shape {expected:?}")]
    AuxShapeMismatch {
        name: String,
        coord: Vec<usize>,
        expected: Vec<usize>,
    },

    /// A scalar coordinate was expected but a vector coordinate was given.
    #[error("coordinate '{name}' has {len} values where a scalar was expected")]
    NotScalar { name: String, len: usize },

    /// A mask array's shape does not match its data array.
    #[error("mask shape {mask:?} does not match data shape {data:?}")]
    MaskShapeMismatch { mask: Vec<usize>, data: Vec<usize> },
}
