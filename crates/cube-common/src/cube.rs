//! The cube: a payload array plus attached coordinate metadata.

use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;
use crate::coord::{AuxCoord, Coord, DimCoord};
use crate::error::{CubeError, CubeResult};
use crate::payload::{DataArray, Payload};

/// What physical quantity a cube holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Phenomenon {
    pub standard_name: Option<String>,
    pub long_name: Option<String>,
    pub var_name: Option<String>,
    pub units: String,
}

impl Phenomenon {
    /// Phenomenon with a recognized standard name.
    pub fn standard(name: impl Into<String>, units: impl Into<String>) -> Self {
        Self {
            standard_name: Some(name.into()),
            units: units.into(),
            ..Default::default()
        }
    }

    /// Phenomenon with only a free-form long name.
    pub fn named(name: impl Into<String>, units: impl Into<String>) -> Self {
        Self {
            long_name: Some(name.into()),
            units: units.into(),
            ..Default::default()
        }
    }

    /// Best available name.
    pub fn name(&self) -> &str {
        self.standard_name
            .as_deref()
            .or(self.long_name.as_deref())
            .or(self.var_name.as_deref())
            .unwrap_or("unknown")
    }
}

/// A labeled multidimensional array.
///
/// Each payload axis may carry one dimension coordinate (axes without one are
/// anonymous); auxiliary coordinates attach over zero or more axes, a scalar
/// coordinate over none. The same type serves loader output and merge output,
/// so merge results can themselves be merged.
#[derive(Debug, Clone)]
pub struct Cube {
    payload: Payload,
    dim_coords: Vec<Option<DimCoord>>,
    aux_coords: Vec<AuxCoord>,
    phenomenon: Phenomenon,
    attributes: Attributes,
}

impl Cube {
    pub fn new(payload: Payload) -> Self {
        let ndim = payload.ndim();
        Self {
            payload,
            dim_coords: vec![None; ndim],
            aux_coords: Vec::new(),
            phenomenon: Phenomenon::default(),
            attributes: Attributes::new(),
        }
    }

    pub fn with_phenomenon(mut self, phenomenon: Phenomenon) -> Self {
        self.phenomenon = phenomenon;
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Attach a dimension coordinate to a payload axis.
    pub fn add_dim_coord(&mut self, coord: DimCoord, axis: usize) -> CubeResult<()> {
        let shape = self.payload.shape();
        if axis >= shape.len() {
            return Err(CubeError::AxisOutOfRange {
                axis,
                ndim: shape.len(),
            });
        }
        if coord.len() != shape[axis] {
            return Err(CubeError::CoordLengthMismatch {
                name: coord.name().to_string(),
                values: coord.len(),
                axis,
                len: shape[axis],
            });
        }
        self.dim_coords[axis] = Some(coord);
        Ok(())
    }

    /// Attach a scalar (single-valued, axis-free) coordinate.
    pub fn add_scalar_coord(&mut self, coord: Coord) -> CubeResult<()> {
        self.aux_coords.push(AuxCoord::from_scalar(coord)?);
        Ok(())
    }

    /// Attach an auxiliary coordinate spanning the axes in `aux.dims`.
    pub fn add_aux_coord(&mut self, aux: AuxCoord) -> CubeResult<()> {
        let shape = self.payload.shape();
        let expected: Vec<usize> = aux
            .dims
            .iter()
            .map(|&axis| {
                if axis < shape.len() {
                    Ok(shape[axis])
                } else {
                    Err(CubeError::AxisOutOfRange {
                        axis,
                        ndim: shape.len(),
                    })
                }
            })
            .collect::<CubeResult<_>>()?;
        let actual = aux.values.shape();
        let matches = if aux.dims.is_empty() {
            actual == [1]
        } else {
            actual == expected.as_slice()
        };
        if !matches {
            return Err(CubeError::AuxShapeMismatch {
                name: aux.name().to_string(),
                coord: actual.to_vec(),
                expected,
            });
        }
        self.aux_coords.push(aux);
        Ok(())
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn shape(&self) -> &[usize] {
        self.payload.shape()
    }

    pub fn ndim(&self) -> usize {
        self.payload.ndim()
    }

    /// The realized payload data, materializing a lazy payload.
    pub fn data(&self) -> &DataArray {
        self.payload.realize()
    }

    pub fn is_lazy(&self) -> bool {
        self.payload.is_lazy()
    }

    /// The dimension coordinate of an axis, if the axis is not anonymous.
    pub fn dim_coord(&self, axis: usize) -> Option<&DimCoord> {
        self.dim_coords.get(axis).and_then(|c| c.as_ref())
    }

    /// Per-axis dimension coordinates (entries are `None` for anonymous axes).
    pub fn dim_coords(&self) -> &[Option<DimCoord>] {
        &self.dim_coords
    }

    /// All auxiliary coordinates, in attachment order.
    pub fn aux_coords(&self) -> &[AuxCoord] {
        &self.aux_coords
    }

    /// Scalar coordinates, in attachment order.
    pub fn scalar_coords(&self) -> impl Iterator<Item = &AuxCoord> {
        self.aux_coords.iter().filter(|c| c.is_scalar())
    }

    /// Auxiliary coordinates that span at least one axis.
    pub fn vector_aux_coords(&self) -> impl Iterator<Item = &AuxCoord> {
        self.aux_coords.iter().filter(|c| !c.is_scalar())
    }

    /// Find a dimension coordinate by name.
    pub fn find_dim_coord(&self, name: &str) -> Option<(usize, &DimCoord)> {
        self.dim_coords
            .iter()
            .enumerate()
            .find_map(|(axis, c)| c.as_ref().filter(|c| c.name() == name).map(|c| (axis, c)))
    }

    /// Find an auxiliary coordinate by name.
    pub fn find_aux_coord(&self, name: &str) -> Option<&AuxCoord> {
        self.aux_coords.iter().find(|c| c.name() == name)
    }

    pub fn phenomenon(&self) -> &Phenomenon {
        &self.phenomenon
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    pub fn name(&self) -> &str {
        self.phenomenon.name()
    }
}
