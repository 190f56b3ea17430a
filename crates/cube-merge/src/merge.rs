//! Merge orchestration: the top-level entry points.

use std::collections::HashMap;

use ndarray::{ArrayD, IxDyn};

use cube_common::{AuxCoord, CoordArray, Cube, DimCoord, Payload};

use crate::discover::{discover, Space};
use crate::error::{MergeError, Result};
use crate::options::MergeOptions;
use crate::registry::{classify_scalars, partition, ScalarProfile, VaryingCoord};
use crate::signature::CellValue;
use crate::stack::stack;

/// Merge cubes with default options (`unique = true`).
///
/// Returns the smallest set of cubes that losslessly represents the input:
/// cubes sharing structure are combined, with their varying scalar
/// coordinates promoted into new leading dimensions. Output order follows the
/// first appearance of each group's metadata in the input.
pub fn merge(cubes: Vec<Cube>) -> Result<Vec<Cube>> {
    merge_with_options(cubes, &MergeOptions::default())
}

/// Merge cubes under explicit options.
///
/// Under `unique = true` any pair of indistinguishable cubes fails the whole
/// call; under `unique = false` duplicates are kept and emitted as extra
/// result cubes, so no data is ever lost.
pub fn merge_with_options(cubes: Vec<Cube>, options: &MergeOptions) -> Result<Vec<Cube>> {
    let input_len = cubes.len();
    let groups = partition(cubes);

    let mut out = Vec::new();
    for group in groups {
        let profile = classify_scalars(&group.members);
        let rounds = replica_rounds(group.members, &profile.varying);
        if options.unique && rounds.len() > 1 {
            return Err(MergeError::DuplicateData {
                cube: group.signature.describe(),
            });
        }

        for members in rounds {
            out.push(merge_members(members, options)?);
        }
    }

    tracing::debug!(input = input_len, output = out.len(), "merge complete");
    Ok(out)
}

/// Merge cubes that must reduce to exactly one cube.
pub fn merge_cube(cubes: Vec<Cube>) -> Result<Cube> {
    if cubes.is_empty() {
        return Err(MergeError::EmptyInput);
    }
    let mut merged = merge(cubes)?;
    if merged.len() != 1 {
        return Err(MergeError::ExpectedSingleCube {
            count: merged.len(),
        });
    }
    Ok(merged.remove(0))
}

/// Split a group into replica rounds: the i-th occurrence of each distinct
/// scalar-value tuple lands in round i. Each round is internally
/// duplicate-free; more than one round means the group holds duplicates.
fn replica_rounds(members: Vec<Cube>, varying: &[VaryingCoord]) -> Vec<Vec<Cube>> {
    let mut seen: HashMap<Vec<CellValue>, usize> = HashMap::new();
    let mut rounds: Vec<Vec<Cube>> = Vec::new();
    for (index, member) in members.into_iter().enumerate() {
        let tuple: Vec<CellValue> = varying.iter().map(|v| v.cells[index].clone()).collect();
        let occurrence = seen.entry(tuple).or_insert(0);
        if *occurrence == rounds.len() {
            rounds.push(Vec::new());
        }
        rounds[*occurrence].push(member);
        *occurrence += 1;
    }
    rounds
}

/// Merge one duplicate-free set of structurally identical cubes.
fn merge_members(mut members: Vec<Cube>, options: &MergeOptions) -> Result<Cube> {
    if members.len() == 1 {
        // Nothing to combine; the cube passes through unchanged.
        return Ok(members.remove(0));
    }

    // Re-classify within this round: a coordinate varying across the whole
    // group may be constant here.
    let profile = classify_scalars(&members);
    let space = discover(&profile.varying, &options.dim_priority);

    let payloads: Vec<Payload> = members.iter().map(|m| m.payload().clone()).collect();
    let stacked = stack(
        payloads,
        space.member_cells.clone(),
        space.axis_lengths(),
        options.fill_defaults,
    );

    assemble(&members, &profile, &space, stacked)
}

/// Build the merged cube: new dimension coordinates first, then everything
/// carried over from the (structurally identical) members.
fn assemble(
    members: &[Cube],
    profile: &ScalarProfile,
    space: &Space,
    stacked: Payload,
) -> Result<Cube> {
    let template = &members[0];
    let n_new = space.axes.len();

    let mut cube = Cube::new(stacked)
        .with_phenomenon(template.phenomenon().clone())
        .with_attributes(template.attributes().clone());

    for (axis_index, axis) in space.axes.iter().enumerate() {
        for (candidate, cells) in &axis.coords {
            let coord = &profile.varying[*candidate];
            if axis.dim == Some(*candidate) {
                let values: Vec<f64> = cells
                    .iter()
                    .map(|c| c.value.as_number().expect("promoted coordinate is numeric"))
                    .collect();
                let mut dim = DimCoord::new(coord.identity.clone(), values)?;
                if let Some(bounds) = collect_bounds(cells) {
                    dim = dim.with_bounds(bounds)?;
                }
                cube.add_dim_coord(dim, axis_index)?;
            } else {
                cube.add_aux_coord(aux_from_cells(
                    coord,
                    &[axis.length],
                    cells,
                    vec![axis_index],
                ))?;
            }
        }
    }

    for function in &space.functions {
        let coord = &profile.varying[function.candidate];
        let shape: Vec<usize> = function.axes.iter().map(|&a| space.axes[a].length).collect();
        cube.add_aux_coord(aux_from_cells(
            coord,
            &shape,
            &function.cells,
            function.axes.clone(),
        ))?;
    }

    for coord in &profile.constant {
        cube.add_scalar_coord(coord.clone())?;
    }

    for (axis, dim) in template.dim_coords().iter().enumerate() {
        if let Some(dim) = dim {
            cube.add_dim_coord(dim.clone(), n_new + axis)?;
        }
    }

    for aux in template.vector_aux_coords() {
        let mut shifted = aux.clone();
        shifted.dims = aux.dims.iter().map(|&d| d + n_new).collect();
        cube.add_aux_coord(shifted)?;
    }

    Ok(cube)
}

fn collect_bounds(cells: &[CellValue]) -> Option<Vec<[f64; 2]>> {
    cells.iter().map(|c| c.bounds.map(|b| b.0)).collect()
}

fn aux_from_cells(
    coord: &VaryingCoord,
    shape: &[usize],
    cells: &[CellValue],
    dims: Vec<usize>,
) -> AuxCoord {
    let values = CoordArray::from_cells(shape, cells.iter().map(|c| c.value.clone()).collect());
    let bounds = collect_bounds(cells).map(|pairs| {
        let mut bounds_shape = shape.to_vec();
        bounds_shape.push(2);
        let flat: Vec<f64> = pairs.iter().flat_map(|p| [p[0], p[1]]).collect();
        ArrayD::from_shape_vec(IxDyn(&bounds_shape), flat).expect("bounds shape")
    });
    AuxCoord {
        identity: coord.identity.clone(),
        kind: coord.kind,
        values,
        bounds,
        dims,
    }
}
