//! Tests for merging cubes carrying (forecast_period,
//! forecast_reference_time, time) scalar triples: orthogonal factorization,
//! shared-axis fallback and duplicate handling.

use cube_common::{Coord, CoordArray, CoordIdentity, CoordKind, Cube};
use cube_merge::{merge, merge_cube, merge_with_options, MergeError, MergeOptions};
use test_utils::triple_cube;

fn merge_triples(triples: &[(f64, f64, f64)]) -> Vec<Cube> {
    let cubes = triples
        .iter()
        .enumerate()
        .map(|(index, &(fp, rt, t))| triple_cube(fp, rt, t, index as f64))
        .collect();
    merge(cubes).unwrap()
}

fn aux_numbers(cube: &Cube, name: &str) -> Vec<f64> {
    match &cube.find_aux_coord(name).unwrap().values {
        CoordArray::Numeric(values) => values.iter().copied().collect(),
        CoordArray::Text(_) => panic!("expected numeric coordinate '{name}'"),
    }
}

// ============================================================================
// factorization scenarios
// ============================================================================

#[test]
fn test_single_forecast() {
    // One forecast series from a single reference time: period and time
    // share an axis, with period promoted.
    let merged = merge_triples(&[(0.0, 10.0, 10.0), (1.0, 10.0, 11.0), (2.0, 10.0, 12.0), (3.0, 10.0, 13.0)]);
    assert_eq!(merged.len(), 1);
    let cube = &merged[0];
    assert_eq!(cube.shape(), &[4, 4, 5]);

    let (axis, fp) = cube.find_dim_coord("forecast_period").unwrap();
    assert_eq!(axis, 0);
    assert_eq!(fp.values, vec![0.0, 1.0, 2.0, 3.0]);

    let time = cube.find_aux_coord("time").unwrap();
    assert_eq!(time.dims, vec![0]);
    assert_eq!(aux_numbers(cube, "time"), vec![10.0, 11.0, 12.0, 13.0]);

    // Reference time did not vary: still scalar.
    let rt = cube.find_aux_coord("forecast_reference_time").unwrap();
    assert!(rt.is_scalar());
}

#[test]
fn test_successive_forecasts() {
    // Three series from successive reference times: period and reference
    // time factor into orthogonal axes; time is determined by both.
    let mut triples = Vec::new();
    for rt in [10.0, 11.0, 12.0] {
        for fp in [0.0, 1.0, 2.0, 3.0] {
            triples.push((fp, rt, rt + fp));
        }
    }
    let merged = merge_triples(&triples);
    assert_eq!(merged.len(), 1);
    let cube = &merged[0];
    assert_eq!(cube.shape(), &[4, 3, 4, 5]);

    assert_eq!(cube.find_dim_coord("forecast_period").unwrap().0, 0);
    assert_eq!(
        cube.find_dim_coord("forecast_reference_time").unwrap().1.values,
        vec![10.0, 11.0, 12.0]
    );

    let time = cube.find_aux_coord("time").unwrap();
    assert_eq!(time.dims, vec![0, 1]);
    match &time.values {
        CoordArray::Numeric(values) => {
            assert_eq!(values.shape(), &[4, 3]);
            for (i, fp) in [0.0, 1.0, 2.0, 3.0].iter().enumerate() {
                for (j, rt) in [10.0, 11.0, 12.0].iter().enumerate() {
                    assert_eq!(values[[i, j]], rt + fp);
                }
            }
        }
        CoordArray::Text(_) => panic!("expected numeric time"),
    }

    // Payload slots follow the member's (fp, rt) cell.
    let data = merged[0].data();
    assert_eq!(data.values()[[0, 0, 0, 0]], 0.0);
    assert_eq!(data.values()[[3, 2, 0, 0]], 11.0);
    assert!(!data.is_masked());
}

#[test]
fn test_time_vs_ref_time() {
    // Period is determined by (reference time, time).
    let triples = [
        (2.0, 10.0, 12.0), (3.0, 10.0, 13.0), (4.0, 10.0, 14.0), (5.0, 10.0, 15.0),
        (1.0, 11.0, 12.0), (2.0, 11.0, 13.0), (3.0, 11.0, 14.0), (4.0, 11.0, 15.0),
        (0.0, 12.0, 12.0), (1.0, 12.0, 13.0), (2.0, 12.0, 14.0), (3.0, 12.0, 15.0),
    ];
    let merged = merge_triples(&triples);
    assert_eq!(merged.len(), 1);
    let cube = &merged[0];
    assert_eq!(cube.shape(), &[3, 4, 4, 5]);

    assert_eq!(cube.find_dim_coord("forecast_reference_time").unwrap().0, 0);
    assert_eq!(cube.find_dim_coord("time").unwrap().0, 1);

    let fp = cube.find_aux_coord("forecast_period").unwrap();
    assert_eq!(fp.dims, vec![0, 1]);
    match &fp.values {
        CoordArray::Numeric(values) => {
            // period = time - reference time.
            for (i, rt) in [10.0, 11.0, 12.0].iter().enumerate() {
                for (j, t) in [12.0, 13.0, 14.0, 15.0].iter().enumerate() {
                    assert_eq!(values[[i, j]], t - rt);
                }
            }
        }
        CoordArray::Text(_) => panic!("expected numeric forecast_period"),
    }
}

#[test]
fn test_time_vs_forecast() {
    // Reference time is determined by (period, time).
    let triples = [
        (0.0, 10.0, 10.0), (0.0, 11.0, 11.0), (0.0, 12.0, 12.0), (0.0, 13.0, 13.0),
        (1.0, 9.0, 10.0), (1.0, 10.0, 11.0), (1.0, 11.0, 12.0), (1.0, 12.0, 13.0),
        (2.0, 8.0, 10.0), (2.0, 9.0, 11.0), (2.0, 10.0, 12.0), (2.0, 11.0, 13.0),
    ];
    let merged = merge_triples(&triples);
    assert_eq!(merged.len(), 1);
    let cube = &merged[0];
    assert_eq!(cube.shape(), &[3, 4, 4, 5]);

    assert_eq!(cube.find_dim_coord("forecast_period").unwrap().0, 0);
    assert_eq!(cube.find_dim_coord("time").unwrap().0, 1);

    let rt = cube.find_aux_coord("forecast_reference_time").unwrap();
    assert_eq!(rt.dims, vec![0, 1]);
    match &rt.values {
        CoordArray::Numeric(values) => {
            for (i, fp) in [0.0, 1.0, 2.0].iter().enumerate() {
                for (j, t) in [10.0, 11.0, 12.0, 13.0].iter().enumerate() {
                    assert_eq!(values[[i, j]], t - fp);
                }
            }
        }
        CoordArray::Text(_) => panic!("expected numeric forecast_reference_time"),
    }
}

#[test]
fn test_independent() {
    // All three coordinates vary independently: three new axes.
    let mut triples = Vec::new();
    for fp in [0.0, 1.0] {
        for rt in [10.0, 11.0] {
            for t in [10.0, 11.0] {
                triples.push((fp, rt, t));
            }
        }
    }
    let merged = merge_triples(&triples);
    assert_eq!(merged.len(), 1);
    let cube = &merged[0];
    assert_eq!(cube.shape(), &[2, 2, 2, 4, 5]);
    assert_eq!(cube.find_dim_coord("forecast_period").unwrap().0, 0);
    assert_eq!(cube.find_dim_coord("forecast_reference_time").unwrap().0, 1);
    assert_eq!(cube.find_dim_coord("time").unwrap().0, 2);
    assert!(!cube.data().is_masked());
}

// ============================================================================
// shared-axis fallback
// ============================================================================

#[test]
fn test_series() {
    // Five snapshots where only time is definitive.
    let merged = merge_triples(&[
        (0.0, 10.0, 10.0),
        (0.0, 11.0, 11.0),
        (0.0, 12.0, 12.0),
        (1.0, 12.0, 13.0),
        (2.0, 12.0, 14.0),
    ]);
    assert_eq!(merged.len(), 1);
    let cube = &merged[0];
    assert_eq!(cube.shape(), &[5, 4, 5]);

    let (axis, time) = cube.find_dim_coord("time").unwrap();
    assert_eq!(axis, 0);
    assert_eq!(time.values, vec![10.0, 11.0, 12.0, 13.0, 14.0]);

    assert_eq!(aux_numbers(cube, "forecast_period"), vec![0.0, 0.0, 0.0, 1.0, 2.0]);
    assert_eq!(
        aux_numbers(cube, "forecast_reference_time"),
        vec![10.0, 11.0, 12.0, 12.0, 12.0]
    );
}

#[test]
fn test_non_expanding_dimension() {
    // No coordinate is definitive: the axis stays anonymous and keeps input
    // order.
    let merged = merge_triples(&[(0.0, 10.0, 0.0), (0.0, 20.0, 1.0), (0.0, 20.0, 0.0)]);
    assert_eq!(merged.len(), 1);
    let cube = &merged[0];
    assert_eq!(cube.shape(), &[3, 4, 5]);
    assert!(cube.dim_coord(0).is_none());

    assert_eq!(aux_numbers(cube, "forecast_reference_time"), vec![10.0, 20.0, 20.0]);
    assert_eq!(aux_numbers(cube, "time"), vec![0.0, 1.0, 0.0]);

    // Payload keeps input order along the anonymous axis.
    let data = cube.data();
    assert_eq!(data.values()[[0, 0, 0]], 0.0);
    assert_eq!(data.values()[[1, 0, 0]], 1.0);
    assert_eq!(data.values()[[2, 0, 0]], 2.0);
}

#[test]
fn test_simple_fallbacks() {
    let merged = merge_triples(&[(0.0, 10.0, 0.0), (1.0, 20.0, 1.0), (2.0, 20.0, 0.0)]);
    assert_eq!(merged.len(), 1);
    let cube = &merged[0];
    let (axis, fp) = cube.find_dim_coord("forecast_period").unwrap();
    assert_eq!(axis, 0);
    assert_eq!(fp.values, vec![0.0, 1.0, 2.0]);
}

#[test]
fn test_partial_grid_falls_back_to_time_axis() {
    // The full 3x2 grid factors; dropping the last cube breaks the grid and
    // collapses everything onto a time axis.
    let full = [
        (0.0, 0.0, 0.0),
        (1.0, 0.0, 1.0),
        (2.0, 0.0, 2.0),
        (0.0, 1.0, 3.0),
        (1.0, 1.0, 4.0),
        (2.0, 1.0, 5.0),
    ];
    let merged = merge_triples(&full);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].shape(), &[3, 2, 4, 5]);
    assert!(merged[0].find_dim_coord("forecast_period").is_some());
    assert!(merged[0].find_dim_coord("forecast_reference_time").is_some());
    assert_eq!(merged[0].find_aux_coord("time").unwrap().dims, vec![0, 1]);

    let merged = merge_triples(&full[..5]);
    assert_eq!(merged.len(), 1);
    let cube = &merged[0];
    assert_eq!(cube.shape(), &[5, 4, 5]);
    let (axis, time) = cube.find_dim_coord("time").unwrap();
    assert_eq!(axis, 0);
    assert_eq!(time.values, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    assert_eq!(aux_numbers(cube, "forecast_period"), vec![0.0, 1.0, 2.0, 0.0, 1.0]);
}

#[test]
fn test_missing_grid_cells_are_masked() {
    // A full 2x2x2 grid minus one corner: every pair of coordinates still
    // looks independent, so three axes are derived and the uncovered cell
    // comes back masked.
    let mut triples = Vec::new();
    for fp in [0.0, 1.0] {
        for rt in [10.0, 11.0] {
            for t in [10.0, 11.0] {
                if (fp, rt, t) != (1.0, 11.0, 11.0) {
                    triples.push((fp, rt, t));
                }
            }
        }
    }
    let merged = merge_triples(&triples);
    assert_eq!(merged.len(), 1);
    let cube = &merged[0];
    assert_eq!(cube.shape(), &[2, 2, 2, 4, 5]);
    let data = cube.data();
    let mask = data.mask().expect("incomplete grid is masked");
    assert!(mask[[1, 1, 1, 0, 0]]);
    assert!(!mask[[0, 0, 0, 0, 0]]);
    assert!(!mask[[1, 1, 0, 3, 4]]);
}

// ============================================================================
// bounded coordinates
// ============================================================================

#[test]
fn test_time_with_bounds_not_promoted() {
    // Bounded mean fields: forecast_period defines the axis; time, though
    // unique, stays auxiliary and keeps its bounds.
    let make = |fp: f64, t: f64, bounds: [f64; 2], data: f64| {
        let mut cube = test_utils::xy_cube(data);
        cube.add_scalar_coord(Coord::scalar_number(
            CoordIdentity::standard("forecast_period", "1"),
            CoordKind::Dimension,
            fp,
        ))
        .unwrap();
        cube.add_scalar_coord(Coord::scalar_number(
            CoordIdentity::standard("forecast_reference_time", "1"),
            CoordKind::Dimension,
            0.0,
        ))
        .unwrap();
        cube.add_scalar_coord(
            Coord::scalar_number(CoordIdentity::standard("time", "1"), CoordKind::Dimension, t)
                .with_bounds(vec![bounds])
                .unwrap(),
        )
        .unwrap();
        cube
    };

    let merged = merge_cube(vec![
        make(5.0, 2.5, [0.0, 5.0], 0.0),
        make(10.0, 5.0, [0.0, 10.0], 1.0),
    ])
    .unwrap();

    let (axis, fp) = merged.find_dim_coord("forecast_period").unwrap();
    assert_eq!(axis, 0);
    assert_eq!(fp.values, vec![5.0, 10.0]);

    let time = merged.find_aux_coord("time").unwrap();
    assert_eq!(time.dims, vec![0]);
    let bounds = time.bounds.as_ref().expect("bounds survive merging");
    assert_eq!(bounds.shape(), &[2, 2]);
    assert_eq!(bounds[[0, 1]], 5.0);
    assert_eq!(bounds[[1, 1]], 10.0);
}

#[test]
fn test_promoted_dim_coord_keeps_bounds() {
    let make = |height: f64, bounds: [f64; 2], data: f64| {
        let mut cube = test_utils::xy_cube(data);
        cube.add_scalar_coord(
            Coord::scalar_number(
                CoordIdentity::standard("height", "m"),
                CoordKind::Dimension,
                height,
            )
            .with_bounds(vec![bounds])
            .unwrap(),
        )
        .unwrap();
        cube
    };

    let merged = merge_cube(vec![
        make(0.0, [-0.5, 0.5], 0.0),
        make(1.0, [0.5, 1.5], 1.0),
    ])
    .unwrap();
    let (_, height) = merged.find_dim_coord("height").unwrap();
    assert_eq!(height.bounds.as_ref().unwrap()[0], [-0.5, 0.5]);
    assert_eq!(height.bounds.as_ref().unwrap()[1], [0.5, 1.5]);
}

// ============================================================================
// duplicates
// ============================================================================

#[test]
fn test_duplicate_triples_fail_unique_merge() {
    let cubes = vec![
        triple_cube(0.0, 10.0, 0.0, 0.0),
        triple_cube(1.0, 20.0, 1.0, 1.0),
        triple_cube(1.0, 20.0, 1.0, 2.0),
    ];
    assert!(matches!(merge(cubes), Err(MergeError::DuplicateData { .. })));
}

#[test]
fn test_duplicate_triples_tolerated_when_not_unique() {
    let cubes = vec![
        triple_cube(0.0, 10.0, 0.0, 0.0),
        triple_cube(1.0, 20.0, 1.0, 1.0),
        triple_cube(1.0, 20.0, 1.0, 2.0),
    ];
    let merged = merge_with_options(cubes, &MergeOptions::non_unique()).unwrap();
    assert_eq!(merged.len(), 2);

    // Round 0 merges the two distinct positions; round 1 is the leftover
    // duplicate, passed through unchanged.
    assert_eq!(merged[0].shape(), &[2, 4, 5]);
    assert_eq!(merged[1].shape(), &[4, 5]);
    assert_eq!(merged[1].data().values()[[0, 0]], 2.0);
}
