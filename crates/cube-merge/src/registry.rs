//! Group registry: partitions input cubes into candidate merge groups.
//!
//! Partitioning is a pure function of the structural signature; every cube
//! lands in exactly one group, even a singleton, and group order follows the
//! first appearance of each signature in the input.

use std::collections::HashMap;

use cube_common::{Coord, CoordIdentity, CoordKind, Cube};

use crate::signature::{CellValue, CubeSignature};

/// Cubes sharing one structural signature, in input order.
#[derive(Debug)]
pub(crate) struct CandidateGroup {
    pub signature: CubeSignature,
    pub members: Vec<Cube>,
}

/// Partition cubes into candidate groups.
pub(crate) fn partition(cubes: Vec<Cube>) -> Vec<CandidateGroup> {
    let mut order: Vec<CandidateGroup> = Vec::new();
    let mut index: HashMap<CubeSignature, usize> = HashMap::new();

    for cube in cubes {
        let signature = CubeSignature::of(&cube);
        match index.get(&signature) {
            Some(&slot) => order[slot].members.push(cube),
            None => {
                index.insert(signature.clone(), order.len());
                order.push(CandidateGroup {
                    signature,
                    members: vec![cube],
                });
            }
        }
    }

    tracing::debug!(groups = order.len(), "partitioned cubes into candidate groups");
    order
}

/// A scalar coordinate whose cells differ across group members: a candidate
/// for promotion to a new dimension.
#[derive(Debug, Clone)]
pub(crate) struct VaryingCoord {
    pub identity: CoordIdentity,
    pub kind: CoordKind,
    pub is_text: bool,
    /// One cell per member, in member order.
    pub cells: Vec<CellValue>,
}

impl VaryingCoord {
    pub fn name(&self) -> &str {
        self.identity.name()
    }
}

/// Group-local classification of scalar coordinates.
#[derive(Debug)]
pub(crate) struct ScalarProfile {
    /// Coordinates identical across all members, carried through unchanged.
    pub constant: Vec<Coord>,
    /// Coordinates that vary, in declaration order of the first member.
    pub varying: Vec<VaryingCoord>,
}

/// Classify each scalar coordinate of a group as constant or varying.
///
/// Members are known to share the scalar identity set (signature equality),
/// so lookups by identity cannot fail.
pub(crate) fn classify_scalars(members: &[Cube]) -> ScalarProfile {
    let mut constant = Vec::new();
    let mut varying = Vec::new();

    let Some(first) = members.first() else {
        return ScalarProfile { constant, varying };
    };

    for template in first.scalar_coords() {
        let cells: Vec<CellValue> = members
            .iter()
            .map(|member| {
                member
                    .scalar_coords()
                    .find(|c| c.identity == template.identity && c.kind == template.kind)
                    .and_then(|c| c.to_scalar_coord())
                    .and_then(|c| CellValue::of(&c))
                    .expect("scalar coordinate present in every group member")
            })
            .collect();

        let all_equal = cells.iter().all(|c| *c == cells[0]);
        if all_equal {
            if let Some(coord) = template.to_scalar_coord() {
                constant.push(coord);
            }
        } else {
            varying.push(VaryingCoord {
                identity: template.identity.clone(),
                kind: template.kind,
                is_text: !template.values.is_numeric(),
                cells,
            });
        }
    }

    ScalarProfile { constant, varying }
}
