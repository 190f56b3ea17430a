//! Dimension discovery: decide how a group's varying scalar coordinates
//! combine into new payload axes.
//!
//! Each varying coordinate is a candidate dimension. Candidates that vary
//! independently of everything else get an axis of their own. Candidates
//! whose values are entangled are grouped; if some subset of a group forms a
//! complete orthogonal grid that determines the rest (the classic
//! forecast_period / forecast_reference_time / time triple), that subset
//! becomes the axes and the remainder become multidimensional auxiliary
//! coordinates. Otherwise the whole group shares one axis.

use std::collections::{HashMap, HashSet};

use crate::registry::VaryingCoord;
use crate::signature::CellValue;

/// One discovered axis.
#[derive(Debug)]
pub(crate) struct AxisSpec {
    pub length: usize,
    /// Candidate promoted to the axis's dimension coordinate, if any.
    pub dim: Option<usize>,
    /// Candidates attached 1-D to this axis (including the promoted one),
    /// each with its value per cell.
    pub coords: Vec<(usize, Vec<CellValue>)>,
}

/// A candidate whose values are a function of a group's basis axes; it
/// becomes a multidimensional auxiliary coordinate over those axes.
#[derive(Debug)]
pub(crate) struct FunctionCoord {
    pub candidate: usize,
    /// Indices into `Space::axes`.
    pub axes: Vec<usize>,
    /// Row-major cells over the basis axes.
    pub cells: Vec<CellValue>,
}

/// The discovered dimension space for one group.
#[derive(Debug)]
pub(crate) struct Space {
    pub axes: Vec<AxisSpec>,
    pub functions: Vec<FunctionCoord>,
    /// Per member, its cell index along each axis.
    pub member_cells: Vec<Vec<usize>>,
}

impl Space {
    pub fn axis_lengths(&self) -> Vec<usize> {
        self.axes.iter().map(|a| a.length).collect()
    }
}

/// Promotion priority: dimension-style declarations first, then position in
/// the configured standard-name order, then declaration order.
fn promotion_score(coord: &VaryingCoord, index: usize, priority: &[String]) -> (u8, usize, usize) {
    let kind_rank = match coord.kind {
        cube_common::CoordKind::Dimension => 0,
        cube_common::CoordKind::Auxiliary => 1,
    };
    let standard_rank = match &coord.identity.standard_name {
        Some(name) => priority
            .iter()
            .position(|p| p == name)
            .unwrap_or(priority.len()),
        None => priority.len() + 1,
    };
    (kind_rank, standard_rank, index)
}

fn values_unique(cells: &[CellValue]) -> bool {
    let mut seen = HashSet::new();
    cells.iter().all(|c| seen.insert(&c.value))
}

/// Discover the dimension space of a group.
///
/// `varying` holds one cell per member for each varying coordinate; member
/// tuples are assumed distinct (duplicates are resolved by the caller).
pub(crate) fn discover(varying: &[VaryingCoord], priority: &[String]) -> Space {
    let n_members = varying.first().map_or(0, |v| v.cells.len());
    let k = varying.len();

    let distinct: Vec<Vec<CellValue>> = varying
        .iter()
        .map(|v| {
            let mut seen = HashSet::new();
            v.cells
                .iter()
                .filter(|c| seen.insert((*c).clone()))
                .cloned()
                .collect()
        })
        .collect();

    // Candidate `a` is separable from `b` when every value of `a` co-occurs
    // with the full value set of `b`; a pair is independent when separable
    // both ways.
    let separable = |a: usize, b: usize| -> bool {
        let mut per_value: HashMap<&CellValue, HashSet<&CellValue>> = HashMap::new();
        for m in 0..n_members {
            per_value
                .entry(&varying[a].cells[m])
                .or_default()
                .insert(&varying[b].cells[m]);
        }
        per_value.values().all(|set| set.len() == distinct[b].len())
    };
    let mut independent = vec![vec![false; k]; k];
    for a in 0..k {
        for b in (a + 1)..k {
            let both = separable(a, b) && separable(b, a);
            independent[a][b] = both;
            independent[b][a] = both;
        }
    }

    // Connected components of the dependence relation, in declaration order.
    let mut component_of = vec![usize::MAX; k];
    let mut components: Vec<Vec<usize>> = Vec::new();
    for start in 0..k {
        if component_of[start] != usize::MAX {
            continue;
        }
        let id = components.len();
        let mut stack = vec![start];
        let mut members = Vec::new();
        component_of[start] = id;
        while let Some(node) = stack.pop() {
            members.push(node);
            for other in 0..k {
                if other != node && !independent[node][other] && component_of[other] == usize::MAX {
                    component_of[other] = id;
                    stack.push(other);
                }
            }
        }
        members.sort_unstable();
        components.push(members);
    }

    let mut space = Space {
        axes: Vec::new(),
        functions: Vec::new(),
        member_cells: vec![Vec::new(); n_members],
    };

    for component in &components {
        if component.len() == 1 {
            push_simple_axis(&mut space, varying, &distinct, component[0]);
        } else if let Some(basis) =
            find_orthogonal_basis(varying, &distinct, component, n_members, &independent)
        {
            push_factored_axes(&mut space, varying, &distinct, component, &basis);
        } else {
            push_shared_axis(&mut space, varying, component, priority);
        }
    }

    tracing::debug!(
        axes = space.axes.len(),
        functions = space.functions.len(),
        "derived dimension space"
    );
    space
}

/// An axis defined by a single candidate: one cell per distinct value.
fn push_simple_axis(
    space: &mut Space,
    varying: &[VaryingCoord],
    distinct: &[Vec<CellValue>],
    candidate: usize,
) {
    let coord = &varying[candidate];
    let mut cells = distinct[candidate].clone();
    let promotable = !coord.is_text && values_unique(&cells);
    if promotable {
        cells.sort();
    }

    let rank: HashMap<&CellValue, usize> = cells.iter().enumerate().map(|(i, c)| (c, i)).collect();
    for (m, member_cell) in coord.cells.iter().enumerate() {
        space.member_cells[m].push(rank[member_cell]);
    }

    space.axes.push(AxisSpec {
        length: cells.len(),
        dim: promotable.then_some(candidate),
        coords: vec![(candidate, cells)],
    });
}

/// Search a dependence group for a subset of pairwise-independent candidates
/// forming a complete grid that determines every other member of the group.
fn find_orthogonal_basis(
    varying: &[VaryingCoord],
    distinct: &[Vec<CellValue>],
    component: &[usize],
    n_members: usize,
    independent: &[Vec<bool>],
) -> Option<Vec<usize>> {
    for size in (2..component.len()).rev() {
        for subset in combinations(component, size) {
            let pairwise = subset
                .iter()
                .enumerate()
                .all(|(i, &a)| subset[i + 1..].iter().all(|&b| independent[a][b]));
            if !pairwise {
                continue;
            }

            let grid: usize = subset.iter().map(|&s| distinct[s].len()).product();
            if grid != n_members {
                continue;
            }

            let mut projections = HashSet::new();
            let all_distinct = (0..n_members).all(|m| {
                let key: Vec<&CellValue> = subset.iter().map(|&s| &varying[s].cells[m]).collect();
                projections.insert(key)
            });
            if all_distinct {
                return Some(subset);
            }
        }
    }
    None
}

/// Expand a factored group: one axis per basis candidate, every remaining
/// candidate a function over those axes.
fn push_factored_axes(
    space: &mut Space,
    varying: &[VaryingCoord],
    distinct: &[Vec<CellValue>],
    component: &[usize],
    basis: &[usize],
) {
    let first_axis = space.axes.len();
    for &candidate in basis {
        push_simple_axis(space, varying, distinct, candidate);
    }
    let axis_range: Vec<usize> = (first_axis..space.axes.len()).collect();

    // Map each basis cell combination to the member that occupies it.
    let mut occupant: HashMap<Vec<usize>, usize> = HashMap::new();
    for (m, cells) in space.member_cells.iter().enumerate() {
        let key: Vec<usize> = axis_range.iter().map(|&a| cells[a]).collect();
        occupant.insert(key, m);
    }

    let lengths: Vec<usize> = axis_range.iter().map(|&a| space.axes[a].length).collect();
    for &candidate in component {
        if basis.contains(&candidate) {
            continue;
        }
        let mut cells = Vec::with_capacity(lengths.iter().product());
        let mut index = vec![0usize; lengths.len()];
        loop {
            let member = occupant[&index];
            cells.push(varying[candidate].cells[member].clone());
            // Row-major increment.
            let mut axis = lengths.len();
            loop {
                if axis == 0 {
                    break;
                }
                axis -= 1;
                index[axis] += 1;
                if index[axis] < lengths[axis] {
                    break;
                }
                index[axis] = 0;
            }
            if index.iter().all(|&i| i == 0) {
                break;
            }
        }
        space.functions.push(FunctionCoord {
            candidate,
            axes: axis_range.clone(),
            cells,
        });
    }
}

/// Collapse a non-factorable group onto one shared axis.
fn push_shared_axis(
    space: &mut Space,
    varying: &[VaryingCoord],
    component: &[usize],
    priority: &[String],
) {
    let n_members = varying[component[0]].cells.len();

    // Distinct projected tuples, in first-appearance order.
    let mut cells: Vec<Vec<CellValue>> = Vec::new();
    let mut rank: HashMap<Vec<CellValue>, usize> = HashMap::new();
    let mut cell_of_member = Vec::with_capacity(n_members);
    for m in 0..n_members {
        let tuple: Vec<CellValue> = component
            .iter()
            .map(|&c| varying[c].cells[m].clone())
            .collect();
        let next = cells.len();
        let slot = *rank.entry(tuple.clone()).or_insert_with(|| {
            cells.push(tuple);
            next
        });
        cell_of_member.push(slot);
    }

    // Promote the highest-priority numeric candidate whose values are unique
    // along the axis; a text or repeating candidate can never define an axis.
    let per_candidate_cells = |slot: usize| -> Vec<CellValue> {
        cells.iter().map(|tuple| tuple[slot].clone()).collect()
    };
    let chosen = component
        .iter()
        .enumerate()
        .filter(|(slot, &c)| !varying[c].is_text && values_unique(&per_candidate_cells(*slot)))
        .min_by_key(|(_, &c)| promotion_score(&varying[c], c, priority))
        .map(|(slot, &c)| (slot, c));

    if let Some((slot, _)) = chosen {
        // Reorder cells ascending by the promoted coordinate's values.
        let mut order: Vec<usize> = (0..cells.len()).collect();
        order.sort_by(|&a, &b| cells[a][slot].value.cmp(&cells[b][slot].value));
        let mut new_rank = vec![0usize; cells.len()];
        for (new_cell, &old_cell) in order.iter().enumerate() {
            new_rank[old_cell] = new_cell;
        }
        cells = order.iter().map(|&i| cells[i].clone()).collect();
        for slot in cell_of_member.iter_mut() {
            *slot = new_rank[*slot];
        }
    } else {
        tracing::debug!(
            coords = ?component.iter().map(|&c| varying[c].name()).collect::<Vec<_>>(),
            "no definitive coordinate; axis left anonymous"
        );
    }

    for (m, &cell) in cell_of_member.iter().enumerate() {
        space.member_cells[m].push(cell);
    }

    space.axes.push(AxisSpec {
        length: cells.len(),
        dim: chosen.map(|(_, c)| c),
        coords: component
            .iter()
            .enumerate()
            .map(|(slot, &c)| (c, cells.iter().map(|tuple| tuple[slot].clone()).collect()))
            .collect(),
    });
}

/// All `size`-element subsets of `items`, in lexicographic order.
fn combinations(items: &[usize], size: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(size);
    fn recurse(
        items: &[usize],
        size: usize,
        start: usize,
        current: &mut Vec<usize>,
        out: &mut Vec<Vec<usize>>,
    ) {
        if current.len() == size {
            out.push(current.clone());
            return;
        }
        for i in start..items.len() {
            current.push(items[i]);
            recurse(items, size, i + 1, current, out);
            current.pop();
        }
    }
    recurse(items, size, 0, &mut current, &mut out);
    out
}
