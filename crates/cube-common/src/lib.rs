//! Common types and utilities shared across the cube-merge workspace.

pub mod attributes;
pub mod coord;
pub mod cube;
pub mod error;
pub mod identity;
pub mod payload;
pub mod time;

pub use attributes::Attributes;
pub use coord::{AuxCoord, Coord, CoordArray, CoordKind, CoordValues, DimCoord, ScalarValue};
pub use cube::{Cube, Phenomenon};
pub use error::{CubeError, CubeResult};
pub use identity::CoordIdentity;
pub use payload::{DType, DataArray, FillValueTable, LazyArray, Payload};
pub use time::ValidTime;
