//! Coordinate types: scalar values, value sequences, and the dimension /
//! auxiliary coordinates attached to a cube.

use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use crate::error::{CubeError, CubeResult};
use crate::identity::CoordIdentity;

/// How a coordinate was declared by its producer.
///
/// Dimension-style coordinates are favored when a merge has to choose which
/// of several co-varying coordinates defines a new axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CoordKind {
    /// Declared as a dimension-defining coordinate.
    Dimension,
    /// Declared as an auxiliary coordinate.
    Auxiliary,
}

/// A single coordinate value: numeric or text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScalarValue {
    Number(f64),
    Text(String),
}

impl ScalarValue {
    pub fn is_number(&self) -> bool {
        matches!(self, ScalarValue::Number(_))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ScalarValue::Number(v) => Some(*v),
            ScalarValue::Text(_) => None,
        }
    }
}

// Equality, ordering and hashing use the IEEE total order on numbers so that
// values can key hash maps and sort deterministically. Numbers sort before
// text; cross-type comparison only arises for deterministic tie-breaking.
impl PartialEq for ScalarValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScalarValue {}

impl PartialOrd for ScalarValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScalarValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ScalarValue::Number(a), ScalarValue::Number(b)) => a.total_cmp(b),
            (ScalarValue::Text(a), ScalarValue::Text(b)) => a.cmp(b),
            (ScalarValue::Number(_), ScalarValue::Text(_)) => Ordering::Less,
            (ScalarValue::Text(_), ScalarValue::Number(_)) => Ordering::Greater,
        }
    }
}

impl Hash for ScalarValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            ScalarValue::Number(v) => {
                0u8.hash(state);
                v.to_bits().hash(state);
            }
            ScalarValue::Text(s) => {
                1u8.hash(state);
                s.hash(state);
            }
        }
    }
}

/// The values of a one-dimensional coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CoordValues {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl CoordValues {
    pub fn len(&self) -> usize {
        match self {
            CoordValues::Numeric(v) => v.len(),
            CoordValues::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, CoordValues::Numeric(_))
    }

    pub fn get(&self, index: usize) -> Option<ScalarValue> {
        match self {
            CoordValues::Numeric(v) => v.get(index).map(|x| ScalarValue::Number(*x)),
            CoordValues::Text(v) => v.get(index).map(|s| ScalarValue::Text(s.clone())),
        }
    }

    /// Whether numeric values are strictly increasing or strictly decreasing.
    /// Text values are never monotonic.
    pub fn strictly_monotonic(&self) -> bool {
        match self {
            CoordValues::Numeric(v) => strictly_monotonic(v),
            CoordValues::Text(_) => false,
        }
    }
}

fn strictly_monotonic(v: &[f64]) -> bool {
    if v.len() < 2 {
        return true;
    }
    let increasing = v.windows(2).all(|w| w[0] < w[1]);
    let decreasing = v.windows(2).all(|w| w[0] > w[1]);
    increasing || decreasing
}

/// A one-dimensional coordinate as attached to a source cube: identity,
/// declaration kind, values and optional contiguous bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub identity: CoordIdentity,
    pub kind: CoordKind,
    pub values: CoordValues,
    /// One `[lower, upper]` pair per value.
    pub bounds: Option<Vec<[f64; 2]>>,
}

impl Coord {
    /// A numeric coordinate declared dimension-style.
    pub fn dimension(identity: CoordIdentity, values: Vec<f64>) -> Self {
        Self {
            identity,
            kind: CoordKind::Dimension,
            values: CoordValues::Numeric(values),
            bounds: None,
        }
    }

    /// An auxiliary coordinate with arbitrary values.
    pub fn auxiliary(identity: CoordIdentity, values: CoordValues) -> Self {
        Self {
            identity,
            kind: CoordKind::Auxiliary,
            values,
            bounds: None,
        }
    }

    /// A single-valued numeric coordinate.
    pub fn scalar_number(identity: CoordIdentity, kind: CoordKind, value: f64) -> Self {
        Self {
            identity,
            kind,
            values: CoordValues::Numeric(vec![value]),
            bounds: None,
        }
    }

    /// A single-valued text coordinate. Text coordinates are always
    /// auxiliary-style: text has no numeric ordering to define an axis.
    pub fn scalar_text(identity: CoordIdentity, value: impl Into<String>) -> Self {
        Self {
            identity,
            kind: CoordKind::Auxiliary,
            values: CoordValues::Text(vec![value.into()]),
            bounds: None,
        }
    }

    /// Attach bounds, one pair per value.
    pub fn with_bounds(mut self, bounds: Vec<[f64; 2]>) -> CubeResult<Self> {
        if bounds.len() != self.values.len() {
            return Err(CubeError::BoundsLengthMismatch {
                name: self.name().to_string(),
                bounds: bounds.len(),
                values: self.values.len(),
            });
        }
        self.bounds = Some(bounds);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        self.identity.name()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_scalar(&self) -> bool {
        self.values.len() == 1
    }

    /// The single value of a scalar coordinate.
    pub fn scalar_value(&self) -> Option<ScalarValue> {
        if self.is_scalar() {
            self.values.get(0)
        } else {
            None
        }
    }

    /// The single bounds pair of a scalar coordinate.
    pub fn scalar_bounds(&self) -> Option<[f64; 2]> {
        if self.is_scalar() {
            self.bounds.as_ref().map(|b| b[0])
        } else {
            None
        }
    }
}

/// A coordinate that defines one payload axis: numeric, strictly monotonic
/// values, one per position along the axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimCoord {
    pub identity: CoordIdentity,
    pub values: Vec<f64>,
    pub bounds: Option<Vec<[f64; 2]>>,
}

impl DimCoord {
    /// Build a dimension coordinate, validating monotonicity.
    pub fn new(identity: CoordIdentity, values: Vec<f64>) -> CubeResult<Self> {
        if !strictly_monotonic(&values) {
            return Err(CubeError::NonMonotonicDimCoord(identity.name().to_string()));
        }
        Ok(Self {
            identity,
            values,
            bounds: None,
        })
    }

    /// Attach bounds, one pair per value.
    pub fn with_bounds(mut self, bounds: Vec<[f64; 2]>) -> CubeResult<Self> {
        if bounds.len() != self.values.len() {
            return Err(CubeError::BoundsLengthMismatch {
                name: self.name().to_string(),
                bounds: bounds.len(),
                values: self.values.len(),
            });
        }
        self.bounds = Some(bounds);
        Ok(self)
    }

    /// Convert a numeric, monotonic 1-D coordinate.
    pub fn from_coord(coord: Coord) -> CubeResult<Self> {
        let Coord {
            identity,
            values,
            bounds,
            ..
        } = coord;
        let CoordValues::Numeric(values) = values else {
            return Err(CubeError::NonNumericDimCoord(identity.name().to_string()));
        };
        let mut dim = DimCoord::new(identity, values)?;
        if let Some(bounds) = bounds {
            dim = dim.with_bounds(bounds)?;
        }
        Ok(dim)
    }

    pub fn name(&self) -> &str {
        self.identity.name()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Possibly multidimensional coordinate values.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordArray {
    Numeric(ArrayD<f64>),
    Text(ArrayD<String>),
}

impl CoordArray {
    /// Lift 1-D values into an array.
    pub fn from_values(values: CoordValues) -> Self {
        match values {
            CoordValues::Numeric(v) => {
                let len = v.len();
                CoordArray::Numeric(ArrayD::from_shape_vec(IxDyn(&[len]), v).expect("1-d shape"))
            }
            CoordValues::Text(v) => {
                let len = v.len();
                CoordArray::Text(ArrayD::from_shape_vec(IxDyn(&[len]), v).expect("1-d shape"))
            }
        }
    }

    /// Build from a shape and row-major scalar values. All values must share
    /// one type; text wins if any value is text.
    pub fn from_cells(shape: &[usize], cells: Vec<ScalarValue>) -> Self {
        let text = cells.iter().any(|c| !c.is_number());
        if text {
            let data = cells
                .into_iter()
                .map(|c| match c {
                    ScalarValue::Text(s) => s,
                    ScalarValue::Number(v) => v.to_string(),
                })
                .collect();
            CoordArray::Text(ArrayD::from_shape_vec(IxDyn(shape), data).expect("cell shape"))
        } else {
            let data = cells
                .into_iter()
                .map(|c| c.as_number().expect("numeric cell"))
                .collect();
            CoordArray::Numeric(ArrayD::from_shape_vec(IxDyn(shape), data).expect("cell shape"))
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            CoordArray::Numeric(a) => a.shape(),
            CoordArray::Text(a) => a.shape(),
        }
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, CoordArray::Numeric(_))
    }

    /// Row-major flattened values.
    pub fn flat_values(&self) -> Vec<ScalarValue> {
        match self {
            CoordArray::Numeric(a) => a.iter().map(|v| ScalarValue::Number(*v)).collect(),
            CoordArray::Text(a) => a.iter().map(|s| ScalarValue::Text(s.clone())).collect(),
        }
    }
}

/// A coordinate attached to a cube over zero or more payload axes.
///
/// `dims` lists the payload axes the values vary over, in value-axis order;
/// an empty `dims` means a scalar coordinate (single value).
#[derive(Debug, Clone, PartialEq)]
pub struct AuxCoord {
    pub identity: CoordIdentity,
    pub kind: CoordKind,
    pub values: CoordArray,
    /// Bounds with shape `values.shape() + [2]`.
    pub bounds: Option<ArrayD<f64>>,
    pub dims: Vec<usize>,
}

impl AuxCoord {
    /// Wrap a scalar coordinate (attached to no axis).
    pub fn from_scalar(coord: Coord) -> CubeResult<Self> {
        if !coord.is_scalar() {
            return Err(CubeError::NotScalar {
                name: coord.name().to_string(),
                len: coord.len(),
            });
        }
        let Coord {
            identity,
            kind,
            values,
            bounds,
        } = coord;
        let bounds = bounds.map(|b| {
            ArrayD::from_shape_vec(IxDyn(&[1, 2]), vec![b[0][0], b[0][1]]).expect("scalar bounds")
        });
        Ok(Self {
            identity,
            kind,
            values: CoordArray::from_values(values),
            bounds,
            dims: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        self.identity.name()
    }

    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    /// Recover the 1-D coordinate view of a scalar aux coordinate.
    pub fn to_scalar_coord(&self) -> Option<Coord> {
        if !self.is_scalar() {
            return None;
        }
        let values = match &self.values {
            CoordArray::Numeric(a) => CoordValues::Numeric(a.iter().copied().collect()),
            CoordArray::Text(a) => CoordValues::Text(a.iter().cloned().collect()),
        };
        let bounds = self
            .bounds
            .as_ref()
            .map(|b| vec![[b[[0, 0]], b[[0, 1]]]]);
        Some(Coord {
            identity: self.identity.clone(),
            kind: self.kind,
            values,
            bounds,
        })
    }
}
