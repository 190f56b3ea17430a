//! Metadata-driven cube merging.
//!
//! Combines a collection of independently loaded, lower-dimensional cubes
//! into the smallest set of higher-dimensional cubes that losslessly
//! represent the same data. Which coordinates become new dimensions is
//! inferred from the scalar metadata alone.
//!
//! # Architecture
//!
//! ```text
//! merge(cubes)
//!      │
//!      ├─► registry: partition by structural signature
//!      │       (phenomenon, shape, dim coords, scalar identity set, attributes)
//!      │
//!      └─► per group:
//!            ├─► registry: split scalar coords into constant / varying
//!            ├─► discover: derive new axes from the varying coords
//!            │       (independent ─► own axis; entangled ─► orthogonal
//!            │        factorization or one shared axis)
//!            ├─► stack: assemble payloads, reconcile masks & fill values
//!            └─► assemble the merged cube (new dims + carried metadata)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use cube_merge::merge_cube;
//!
//! // Two cubes differing only in their scalar `height` coordinate merge
//! // into one cube with a new leading `height` dimension.
//! let merged = merge_cube(vec![at_height_0, at_height_1])?;
//! assert_eq!(merged.ndim(), 3);
//! ```

mod discover;
pub mod error;
mod merge;
pub mod options;
mod registry;
mod signature;
mod stack;

pub use error::{MergeError, Result};
pub use merge::{merge, merge_cube, merge_with_options};
pub use options::{default_dim_priority, MergeOptions};
