//! Cube signatures: the hashable keys that decide which cubes may merge.
//!
//! The *structural* signature covers everything that must match exactly for
//! two cubes to be merge candidates: phenomenon, payload geometry, dimension
//! coordinates, vector auxiliary coordinates, the identity set of scalar
//! coordinates, and the full global attribute map. Scalar coordinate *values*
//! are deliberately excluded (they are what the merge turns into new
//! dimensions), and so is the payload dtype, which is reconciled by numeric
//! promotion during stacking instead.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use cube_common::{
    Attributes, AuxCoord, Coord, Cube, CoordIdentity, CoordKind, DimCoord, Phenomenon, ScalarValue,
};

/// Bounds pair usable as a hash/sort key.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CellBounds(pub [f64; 2]);

impl PartialEq for CellBounds {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellBounds {}

impl PartialOrd for CellBounds {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellBounds {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0[0]
            .total_cmp(&other.0[0])
            .then(self.0[1].total_cmp(&other.0[1]))
    }
}

impl Hash for CellBounds {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0[0].to_bits().hash(state);
        self.0[1].to_bits().hash(state);
    }
}

/// A scalar coordinate's payload within one cube: value plus bounds.
///
/// Cubes vary over a coordinate when their cells differ, so bounds take part
/// in equality; ordering is by value first, making sorted axes follow values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct CellValue {
    pub value: ScalarValue,
    pub bounds: Option<CellBounds>,
}

impl CellValue {
    pub fn of(coord: &Coord) -> Option<Self> {
        Some(Self {
            value: coord.scalar_value()?,
            bounds: coord.scalar_bounds().map(CellBounds),
        })
    }
}

fn value_keys(values: &[f64]) -> Vec<u64> {
    values.iter().map(|v| v.to_bits()).collect()
}

fn bounds_keys(bounds: &Option<Vec<[f64; 2]>>) -> Option<Vec<(u64, u64)>> {
    bounds
        .as_ref()
        .map(|b| b.iter().map(|p| (p[0].to_bits(), p[1].to_bits())).collect())
}

/// Signature of one dimension coordinate: identity plus exact content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct DimCoordSig {
    identity: CoordIdentity,
    values: Vec<u64>,
    bounds: Option<Vec<(u64, u64)>>,
}

impl DimCoordSig {
    fn of(coord: &DimCoord) -> Self {
        Self {
            identity: coord.identity.clone(),
            values: value_keys(&coord.values),
            bounds: bounds_keys(&coord.bounds),
        }
    }
}

/// Signature of a vector auxiliary coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct VectorAuxSig {
    identity: CoordIdentity,
    kind: CoordKind,
    dims: Vec<usize>,
    shape: Vec<usize>,
    values: Vec<ScalarValue>,
    bounds: Option<Vec<u64>>,
}

impl VectorAuxSig {
    fn of(coord: &AuxCoord) -> Self {
        Self {
            identity: coord.identity.clone(),
            kind: coord.kind,
            dims: coord.dims.clone(),
            shape: coord.values.shape().to_vec(),
            values: coord.values.flat_values(),
            bounds: coord
                .bounds
                .as_ref()
                .map(|b| b.iter().map(|v| v.to_bits()).collect()),
        }
    }
}

/// Identity-level signature of a scalar coordinate (values excluded).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct ScalarSig {
    pub identity: CoordIdentity,
    pub kind: CoordKind,
    pub is_text: bool,
    pub has_bounds: bool,
}

impl ScalarSig {
    fn of(coord: &AuxCoord) -> Self {
        Self {
            identity: coord.identity.clone(),
            kind: coord.kind,
            is_text: !coord.values.is_numeric(),
            has_bounds: coord.bounds.is_some(),
        }
    }
}

/// The structural part of a cube's metadata: cubes merge only within groups
/// that share this signature exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CubeSignature {
    phenomenon: Phenomenon,
    shape: Vec<usize>,
    dim_coords: Vec<Option<DimCoordSig>>,
    vector_aux: Vec<VectorAuxSig>,
    scalars: Vec<ScalarSig>,
    attributes: Attributes,
}

impl CubeSignature {
    pub fn of(cube: &Cube) -> Self {
        let mut scalars: Vec<ScalarSig> = cube.scalar_coords().map(ScalarSig::of).collect();
        // Order-independent: cubes listing the same scalar coordinates in a
        // different order still group together.
        scalars.sort();
        let mut vector_aux: Vec<VectorAuxSig> =
            cube.vector_aux_coords().map(VectorAuxSig::of).collect();
        vector_aux.sort_by(|a, b| (&a.identity, &a.dims).cmp(&(&b.identity, &b.dims)));
        Self {
            phenomenon: cube.phenomenon().clone(),
            shape: cube.shape().to_vec(),
            dim_coords: cube
                .dim_coords()
                .iter()
                .map(|c| c.as_ref().map(DimCoordSig::of))
                .collect(),
            vector_aux,
            scalars,
            attributes: cube.attributes().clone(),
        }
    }

    pub fn scalars(&self) -> &[ScalarSig] {
        &self.scalars
    }

    /// Human-readable description for error reporting.
    pub fn describe(&self) -> String {
        let mut out = format!("'{}'", self.phenomenon.name());
        if !self.attributes.is_empty() {
            out.push_str(&format!(" with attributes {}", self.attributes.digest()));
        }
        out
    }
}
