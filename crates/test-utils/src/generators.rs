//! Cube generators for the merge test suites.

use chrono::{DateTime, Utc};
use ndarray::{ArrayD, IxDyn};

use cube_common::{
    Coord, CoordIdentity, CoordKind, Cube, DType, DataArray, DimCoord, LazyArray, Payload,
    ScalarValue, ValidTime,
};

/// A 4x5 float32 cube with integer `x`/`y` dimension coordinates, filled
/// with a constant value.
///
/// The base cube of most merge scenarios; scalar coordinates are added on
/// top of it to drive the dimension discovery.
pub fn xy_cube(data: f64) -> Cube {
    let payload = Payload::from_values(ArrayD::from_elem(IxDyn(&[4, 5]), data), DType::Float32);
    let mut cube = Cube::new(payload);
    cube.add_dim_coord(
        DimCoord::new(CoordIdentity::named("y", "1"), (0..4).map(f64::from).collect())
            .expect("monotonic"),
        0,
    )
    .expect("y coord");
    cube.add_dim_coord(
        DimCoord::new(CoordIdentity::named("x", "1"), (0..5).map(f64::from).collect())
            .expect("monotonic"),
        1,
    )
    .expect("x coord");
    cube
}

/// An `xy_cube` carrying a (forecast_period, forecast_reference_time, time)
/// scalar triple, all declared dimension-style.
pub fn triple_cube(period: f64, reference: f64, time: f64, data: f64) -> Cube {
    let mut cube = xy_cube(data);
    for (name, value) in [
        ("forecast_period", period),
        ("forecast_reference_time", reference),
        ("time", time),
    ] {
        cube.add_scalar_coord(Coord::scalar_number(
            CoordIdentity::standard(name, "1"),
            CoordKind::Dimension,
            value,
        ))
        .expect("scalar coord");
    }
    cube
}

/// A triple cube built from a real reference time and lead, with coordinate
/// values in hours since the epoch.
pub fn forecast_cube(reference: DateTime<Utc>, forecast_hour: u32, data: f64) -> Cube {
    let valid = ValidTime::new(reference, forecast_hour);
    triple_cube(
        valid.period_value(),
        valid.reference_value(),
        valid.time_value(),
        data,
    )
}

/// An `xy_cube` carrying three free-form numeric scalar coordinates
/// `a`, `b`, `c`, all declared dimension-style.
pub fn abc_cube(a: f64, b: f64, c: f64, data: f64) -> Cube {
    let mut cube = xy_cube(data);
    for (name, value) in [("a", a), ("b", b), ("c", c)] {
        cube.add_scalar_coord(Coord::scalar_number(
            CoordIdentity::named(name, "1"),
            CoordKind::Dimension,
            value,
        ))
        .expect("scalar coord");
    }
    cube
}

/// An `xy_cube` carrying four auxiliary scalar coordinates `a`..`d` of mixed
/// text/numeric values.
pub fn combo_cube(a: ScalarValue, b: ScalarValue, c: ScalarValue, d: ScalarValue, data: f64) -> Cube {
    let mut cube = xy_cube(data);
    for (name, value) in [("a", a), ("b", b), ("c", c), ("d", d)] {
        let coord = match value {
            ScalarValue::Number(v) => Coord::scalar_number(
                CoordIdentity::named(name, "1"),
                CoordKind::Auxiliary,
                v,
            ),
            ScalarValue::Text(s) => Coord::scalar_text(CoordIdentity::named(name, "1"), s),
        };
        cube.add_scalar_coord(coord).expect("scalar coord");
    }
    cube
}

/// An `xy_cube` carrying two scalar coordinates `a` and `b`, with control
/// over their dimension-/auxiliary-style declaration.
pub fn ab_cube(a: ScalarValue, b: ScalarValue, a_dim: bool, b_dim: bool, data: f64) -> Cube {
    let mut cube = xy_cube(data);
    for (name, value, dim) in [("a", a, a_dim), ("b", b, b_dim)] {
        let coord = match value {
            ScalarValue::Number(v) => Coord::scalar_number(
                CoordIdentity::named(name, "1"),
                if dim {
                    CoordKind::Dimension
                } else {
                    CoordKind::Auxiliary
                },
                v,
            ),
            ScalarValue::Text(s) => Coord::scalar_text(CoordIdentity::named(name, "1"), s),
        };
        cube.add_scalar_coord(coord).expect("scalar coord");
    }
    cube
}

/// Builder for the payload-combination scenarios: an NxN cube with
/// `latitude`/`longitude` dimension coordinates and a scalar `height`
/// coordinate equal to the payload's constant value.
///
/// ```ignore
/// let cube = GridCube::new(0.0).masked_at(&[[0, 0]]).lazy().build();
/// ```
#[derive(Debug, Clone)]
pub struct GridCube {
    value: f64,
    dtype: DType,
    fill_value: Option<f64>,
    mask: Option<Vec<[usize; 2]>>,
    lazy: bool,
    n: usize,
}

impl GridCube {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            dtype: DType::Int32,
            fill_value: None,
            mask: None,
            lazy: false,
            n: 3,
        }
    }

    pub fn dtype(mut self, dtype: DType) -> Self {
        self.dtype = dtype;
        self
    }

    pub fn fill_value(mut self, fill_value: f64) -> Self {
        self.fill_value = Some(fill_value);
        self
    }

    /// Mask the given (row, col) points. An empty list still produces a
    /// masked payload (all-clear mask).
    pub fn masked_at(mut self, points: &[[usize; 2]]) -> Self {
        self.mask = Some(points.to_vec());
        self
    }

    /// Carry a mask that marks nothing.
    pub fn masked(self) -> Self {
        self.masked_at(&[])
    }

    /// Defer payload materialization until first access.
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    pub fn size(mut self, n: usize) -> Self {
        self.n = n;
        self
    }

    /// The payload alone.
    pub fn payload(&self) -> Payload {
        if self.lazy {
            let spec = self.clone();
            Payload::Lazy(LazyArray::new(
                vec![self.n, self.n],
                self.dtype,
                move || spec.realized(),
            ))
        } else {
            Payload::Real(self.realized())
        }
    }

    fn realized(&self) -> DataArray {
        let values = ArrayD::from_elem(IxDyn(&[self.n, self.n]), self.value);
        let mut data = DataArray::new(values, self.dtype);
        if let Some(points) = &self.mask {
            let mut mask = ArrayD::from_elem(IxDyn(&[self.n, self.n]), false);
            for point in points {
                mask[[point[0], point[1]]] = true;
            }
            data = data.with_mask(mask).expect("mask shape");
        }
        if let Some(fill_value) = self.fill_value {
            data = data.with_fill_value(fill_value);
        }
        data
    }

    /// The full cube: payload plus coordinates.
    pub fn build(&self) -> Cube {
        let mut cube = Cube::new(self.payload());
        let axis_values: Vec<f64> = (0..self.n).map(|i| i as f64).collect();
        cube.add_dim_coord(
            DimCoord::new(
                CoordIdentity::standard("latitude", "degrees"),
                axis_values.clone(),
            )
            .expect("monotonic"),
            0,
        )
        .expect("latitude coord");
        cube.add_dim_coord(
            DimCoord::new(CoordIdentity::standard("longitude", "degrees"), axis_values)
                .expect("monotonic"),
            1,
        )
        .expect("longitude coord");
        cube.add_scalar_coord(Coord::scalar_number(
            CoordIdentity::standard("height", "m"),
            CoordKind::Dimension,
            self.value,
        ))
        .expect("height coord");
        cube
    }
}

/// Shorthand for a numeric scalar value.
pub fn num(value: f64) -> ScalarValue {
    ScalarValue::Number(value)
}

/// Shorthand for a text scalar value.
pub fn text(value: &str) -> ScalarValue {
    ScalarValue::Text(value.to_string())
}
