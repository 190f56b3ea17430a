//! Tests for payload stacking across every combination of
//! {lazy, realized} x {masked, plain} members, mirroring the behavior of the
//! reference data-merge combinations.

use cube_common::DType;
use cube_merge::merge_cube;
use test_utils::GridCube;

fn lazy_combos() -> [(bool, bool); 4] {
    [(false, false), (false, true), (true, false), (true, true)]
}

fn build(value: f64, lazy: bool, mask: Option<&[[usize; 2]]>, fill: Option<f64>) -> GridCube {
    let mut spec = GridCube::new(value);
    if let Some(points) = mask {
        spec = spec.masked_at(points);
    }
    if let Some(fill) = fill {
        spec = spec.fill_value(fill);
    }
    if lazy {
        spec = spec.lazy();
    }
    spec
}

// ============================================================================
// plain x plain
// ============================================================================

#[test]
fn test_plain_plain_all_lazy_combos() {
    for (lazy0, lazy1) in lazy_combos() {
        let merged = merge_cube(vec![
            build(0.0, lazy0, None, None).build(),
            build(1.0, lazy1, None, None).build(),
        ])
        .unwrap();

        let data = merged.data();
        assert_eq!(data.dtype(), DType::Int32);
        assert!(!data.is_masked());
        assert_eq!(data.shape(), &[2, 3, 3]);
        for row in 0..3 {
            for col in 0..3 {
                assert_eq!(data.values()[[0, row, col]], 0.0);
                assert_eq!(data.values()[[1, row, col]], 1.0);
            }
        }
    }
}

#[test]
fn test_both_lazy_stays_lazy_until_touched() {
    let merged = merge_cube(vec![
        build(0.0, true, None, None).build(),
        build(1.0, true, None, None).build(),
    ])
    .unwrap();
    assert!(merged.is_lazy());
    assert_eq!(merged.data().values()[[1, 2, 2]], 1.0);
    assert!(!merged.is_lazy());
}

#[test]
fn test_mixed_laziness_realizes_eagerly() {
    let merged = merge_cube(vec![
        build(0.0, true, None, None).build(),
        build(1.0, false, None, None).build(),
    ])
    .unwrap();
    assert!(!merged.is_lazy());
}

// ============================================================================
// masked x masked
// ============================================================================

#[test]
fn test_masked_masked_all_combos() {
    let fill_combos: [(Option<f64>, Option<f64>); 4] = [
        (None, Some(1234.0)),
        (None, None),
        (Some(1234.0), Some(1234.0)),
        (Some(1234.0), None),
    ];
    for (lazy0, lazy1) in lazy_combos() {
        for (fill0, fill1) in fill_combos {
            let merged = merge_cube(vec![
                build(0.0, lazy0, Some(&[[0, 0]]), fill0).build(),
                build(1.0, lazy1, Some(&[[1, 1]]), fill1).build(),
            ])
            .unwrap();

            let data = merged.data();
            assert_eq!(data.dtype(), DType::Int32);
            let mask = data.mask().expect("merged payload stays masked");
            assert!(mask[[0, 0, 0]]);
            assert!(!mask[[0, 1, 1]]);
            assert!(mask[[1, 1, 1]]);
            assert!(!mask[[1, 0, 0]]);

            let expected_fill = match (fill0, fill1) {
                (Some(a), Some(b)) if a == b => a,
                _ => 999999.0,
            };
            assert_eq!(data.fill_value(), Some(expected_fill));
        }
    }
}

// ============================================================================
// plain x masked
// ============================================================================

#[test]
fn test_plain_masked_all_combos() {
    for (lazy0, lazy1) in lazy_combos() {
        for fill in [None, Some(1234.0)] {
            let merged = merge_cube(vec![
                build(0.0, lazy0, None, None).build(),
                build(1.0, lazy1, Some(&[[0, 1]]), fill).build(),
            ])
            .unwrap();

            let data = merged.data();
            let mask = data.mask().expect("masked member masks the output");
            assert!(!mask[[0, 0, 1]]);
            assert!(mask[[1, 0, 1]]);
            assert!(!mask[[1, 1, 0]]);
            // The unmasked member casts no vote.
            assert_eq!(data.fill_value(), Some(fill.unwrap_or(999999.0)));
        }
    }
}

#[test]
fn test_masked_plain_all_combos() {
    for (lazy0, lazy1) in lazy_combos() {
        for fill in [None, Some(1234.0)] {
            let merged = merge_cube(vec![
                build(0.0, lazy0, Some(&[[0, 1]]), fill).build(),
                build(1.0, lazy1, None, None).build(),
            ])
            .unwrap();

            let data = merged.data();
            let mask = data.mask().expect("masked member masks the output");
            assert!(mask[[0, 0, 1]]);
            assert!(!mask[[1, 0, 1]]);
            assert_eq!(data.fill_value(), Some(fill.unwrap_or(999999.0)));
        }
    }
}

#[test]
fn test_all_clear_mask_is_preserved() {
    // A member carrying a mask that marks nothing still forces a masked
    // result.
    for (lazy0, lazy1) in lazy_combos() {
        let merged = merge_cube(vec![
            build(0.0, lazy0, Some(&[]), Some(1234.0)).build(),
            build(1.0, lazy1, None, None).build(),
        ])
        .unwrap();

        let data = merged.data();
        let mask = data.mask().expect("mask preserved");
        assert!(mask.iter().all(|&m| !m));
        assert_eq!(data.fill_value(), Some(1234.0));
    }
}

// ============================================================================
// dtype handling
// ============================================================================

#[test]
fn test_common_dtype_is_preserved() {
    let merged = merge_cube(vec![
        GridCube::new(0.0).dtype(DType::Float32).build(),
        GridCube::new(1.0).dtype(DType::Float32).build(),
    ])
    .unwrap();
    assert_eq!(merged.data().dtype(), DType::Float32);
}

#[test]
fn test_mixed_dtypes_widen() {
    let merged = merge_cube(vec![
        GridCube::new(0.0).dtype(DType::Int32).build(),
        GridCube::new(1.0).dtype(DType::Float32).build(),
    ])
    .unwrap();
    assert_eq!(merged.data().dtype(), DType::Float64);

    let merged = merge_cube(vec![
        GridCube::new(0.0).dtype(DType::Int32).build(),
        GridCube::new(1.0).dtype(DType::Int64).build(),
    ])
    .unwrap();
    assert_eq!(merged.data().dtype(), DType::Int64);
}

// ============================================================================
// payload identity
// ============================================================================

#[test]
fn test_member_payloads_copied_bit_identical() {
    // Each member's sub-array must be exactly the member's payload.
    let merged = merge_cube(vec![
        GridCube::new(0.25).dtype(DType::Float64).build(),
        GridCube::new(-7.5).dtype(DType::Float64).build(),
    ])
    .unwrap();
    let data = merged.data();
    // height -7.5 sorts first.
    for row in 0..3 {
        for col in 0..3 {
            assert_eq!(data.values()[[0, row, col]].to_bits(), (-7.5f64).to_bits());
            assert_eq!(data.values()[[1, row, col]].to_bits(), 0.25f64.to_bits());
        }
    }
}
