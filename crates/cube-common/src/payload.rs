//! Payload arrays: realized data with optional masking, and lazily
//! materialized data whose computation is deferred until first access.

use ndarray::ArrayD;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::error::{CubeError, CubeResult};

/// Logical element type of a payload.
///
/// Storage is uniformly `f64`; the tag preserves the producer's declared type
/// through merging so consumers can narrow on the way out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    Int32,
    Int64,
    Float32,
    Float64,
}

impl DType {
    pub fn is_float(self) -> bool {
        matches!(self, DType::Float32 | DType::Float64)
    }

    /// Standard numeric promotion: equal types stay, ints widen to ints,
    /// floats widen to floats, and int/float mixes widen to `Float64`.
    pub fn promote(self, other: DType) -> DType {
        use DType::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Int32, Int64) | (Int64, Int32) => Int64,
            (Float32, Float64) | (Float64, Float32) => Float64,
            _ => Float64,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::Int32 => write!(f, "int32"),
            DType::Int64 => write!(f, "int64"),
            DType::Float32 => write!(f, "float32"),
            DType::Float64 => write!(f, "float64"),
        }
    }
}

/// Default fill values per logical dtype.
///
/// An explicit table rather than ambient library state; callers can override
/// any entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FillValueTable {
    pub int32: f64,
    pub int64: f64,
    pub float32: f64,
    pub float64: f64,
}

impl Default for FillValueTable {
    fn default() -> Self {
        // The conventional numeric-library defaults.
        Self {
            int32: 999999.0,
            int64: 999999.0,
            float32: 1e20,
            float64: 1e20,
        }
    }
}

impl FillValueTable {
    /// The default fill value for a dtype.
    pub fn default_for(&self, dtype: DType) -> f64 {
        match dtype {
            DType::Int32 => self.int32,
            DType::Int64 => self.int64,
            DType::Float32 => self.float32,
            DType::Float64 => self.float64,
        }
    }
}

/// A realized payload: values, an optional mask, and an optional explicit
/// fill value.
///
/// An array is *masked* when it carries a mask at all, even one that marks
/// nothing; masked-ness is a property of the representation, not the data.
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    values: ArrayD<f64>,
    mask: Option<ArrayD<bool>>,
    dtype: DType,
    fill_value: Option<f64>,
}

impl DataArray {
    pub fn new(values: ArrayD<f64>, dtype: DType) -> Self {
        Self {
            values,
            mask: None,
            dtype,
            fill_value: None,
        }
    }

    /// Attach a mask of the same shape.
    pub fn with_mask(mut self, mask: ArrayD<bool>) -> CubeResult<Self> {
        if mask.shape() != self.values.shape() {
            return Err(CubeError::MaskShapeMismatch {
                mask: mask.shape().to_vec(),
                data: self.values.shape().to_vec(),
            });
        }
        self.mask = Some(mask);
        Ok(self)
    }

    /// Attach an explicit fill value.
    pub fn with_fill_value(mut self, fill_value: f64) -> Self {
        self.fill_value = Some(fill_value);
        self
    }

    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    pub fn ndim(&self) -> usize {
        self.values.ndim()
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn is_masked(&self) -> bool {
        self.mask.is_some()
    }

    pub fn values(&self) -> &ArrayD<f64> {
        &self.values
    }

    pub fn mask(&self) -> Option<&ArrayD<bool>> {
        self.mask.as_ref()
    }

    pub fn fill_value(&self) -> Option<f64> {
        self.fill_value
    }

    /// Values with masked positions replaced by the effective fill value.
    pub fn filled(&self, defaults: &FillValueTable) -> ArrayD<f64> {
        let Some(mask) = &self.mask else {
            return self.values.clone();
        };
        let fill = self
            .fill_value
            .unwrap_or_else(|| defaults.default_for(self.dtype));
        let mut out = self.values.clone();
        out.zip_mut_with(mask, |v, &m| {
            if m {
                *v = fill;
            }
        });
        out
    }
}

struct LazyState {
    loader: Box<dyn Fn() -> DataArray + Send + Sync>,
    cell: OnceLock<DataArray>,
}

/// A payload whose values are computed on first access.
///
/// Shape and dtype are known up front; the loader runs at most once and the
/// result is cached for the lifetime of the array. Cloning shares the cache.
#[derive(Clone)]
pub struct LazyArray {
    shape: Vec<usize>,
    dtype: DType,
    state: Arc<LazyState>,
}

impl LazyArray {
    pub fn new(
        shape: Vec<usize>,
        dtype: DType,
        loader: impl Fn() -> DataArray + Send + Sync + 'static,
    ) -> Self {
        Self {
            shape,
            dtype,
            state: Arc::new(LazyState {
                loader: Box::new(loader),
                cell: OnceLock::new(),
            }),
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn is_realized(&self) -> bool {
        self.state.cell.get().is_some()
    }

    /// Materialize the data, running the loader on first call.
    ///
    /// This may block on deferred I/O or computation; there is no
    /// cancellation support.
    pub fn realize(&self) -> &DataArray {
        self.state.cell.get_or_init(|| {
            let data = (self.state.loader)();
            debug_assert_eq!(data.shape(), &self.shape[..]);
            data
        })
    }
}

impl fmt::Debug for LazyArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyArray")
            .field("shape", &self.shape)
            .field("dtype", &self.dtype)
            .field("realized", &self.is_realized())
            .finish()
    }
}

/// A cube's payload: realized or lazy.
#[derive(Debug, Clone)]
pub enum Payload {
    Real(DataArray),
    Lazy(LazyArray),
}

impl Payload {
    /// A realized payload from plain values.
    pub fn from_values(values: ArrayD<f64>, dtype: DType) -> Self {
        Payload::Real(DataArray::new(values, dtype))
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            Payload::Real(d) => d.shape(),
            Payload::Lazy(l) => l.shape(),
        }
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    pub fn dtype(&self) -> DType {
        match self {
            Payload::Real(d) => d.dtype(),
            Payload::Lazy(l) => l.dtype(),
        }
    }

    /// Whether materialization is still pending.
    pub fn is_lazy(&self) -> bool {
        match self {
            Payload::Real(_) => false,
            Payload::Lazy(l) => !l.is_realized(),
        }
    }

    /// The realized data, materializing a lazy payload if necessary.
    pub fn realize(&self) -> &DataArray {
        match self {
            Payload::Real(d) => d,
            Payload::Lazy(l) => l.realize(),
        }
    }
}
