//! Payload stacking: assemble member payloads into the discovered dimension
//! space, reconciling dtypes, masks and fill values.

use ndarray::{ArrayD, IxDyn, SliceInfoElem};

use cube_common::{DType, DataArray, FillValueTable, LazyArray, Payload};

/// Stack member payloads into an array of shape
/// `(axis lengths…, original shape…)`.
///
/// If every member is still lazy the result is lazy too, deferring the whole
/// assembly until first access; otherwise stacking happens eagerly. Member
/// cells are assumed distinct.
pub(crate) fn stack(
    payloads: Vec<Payload>,
    member_cells: Vec<Vec<usize>>,
    axis_lengths: Vec<usize>,
    defaults: FillValueTable,
) -> Payload {
    let dtype = promoted_dtype(&payloads);
    let all_lazy = payloads.iter().all(|p| p.is_lazy());

    if all_lazy {
        let mut shape = axis_lengths.clone();
        shape.extend_from_slice(payloads[0].shape());
        Payload::Lazy(LazyArray::new(shape, dtype, move || {
            stack_eager(&payloads, &member_cells, &axis_lengths, dtype, &defaults)
        }))
    } else {
        Payload::Real(stack_eager(
            &payloads,
            &member_cells,
            &axis_lengths,
            dtype,
            &defaults,
        ))
    }
}

fn promoted_dtype(payloads: &[Payload]) -> DType {
    payloads
        .iter()
        .map(Payload::dtype)
        .reduce(DType::promote)
        .unwrap_or(DType::Float64)
}

fn stack_eager(
    payloads: &[Payload],
    member_cells: &[Vec<usize>],
    axis_lengths: &[usize],
    dtype: DType,
    defaults: &FillValueTable,
) -> DataArray {
    let orig_shape = payloads[0].shape().to_vec();
    let mut shape = axis_lengths.to_vec();
    shape.extend_from_slice(&orig_shape);

    let realized: Vec<&DataArray> = payloads.iter().map(Payload::realize).collect();
    let any_masked = realized.iter().any(|d| d.is_masked());
    let total_cells: usize = axis_lengths.iter().product();
    let fully_covered = payloads.len() == total_cells;
    let masked = any_masked || !fully_covered;

    let mut values = ArrayD::zeros(IxDyn(&shape));
    // Uncovered cells stay masked; covered cells take the member's own mask.
    let mut mask = if masked {
        Some(ArrayD::from_elem(IxDyn(&shape), true))
    } else {
        None
    };

    for (data, cells) in realized.iter().zip(member_cells) {
        let mut info: Vec<SliceInfoElem> = cells
            .iter()
            .map(|&cell| SliceInfoElem::Index(cell as isize))
            .collect();
        info.extend(orig_shape.iter().map(|_| SliceInfoElem::Slice {
            start: 0,
            end: None,
            step: 1,
        }));

        values.slice_mut(info.as_slice()).assign(data.values());
        if let Some(mask) = mask.as_mut() {
            let mut slot = mask.slice_mut(info.as_slice());
            match data.mask() {
                Some(member_mask) => slot.assign(member_mask),
                None => slot.fill(false),
            }
        }
    }

    let mut out = DataArray::new(values, dtype);
    if let Some(mask) = mask {
        out = out
            .with_mask(mask)
            .expect("stacked mask matches stacked shape")
            .with_fill_value(resolve_fill_value(&realized, dtype, defaults));
    }
    out
}

/// Resolve the merged fill value: a unanimous vote from masked members wins,
/// anything else (disagreement, or no masked member) falls back to the dtype
/// default. Symmetric under any permutation of the members.
fn resolve_fill_value(realized: &[&DataArray], dtype: DType, defaults: &FillValueTable) -> f64 {
    let mut vote: Option<Option<f64>> = None;
    let mut conflicted = false;
    for data in realized.iter().filter(|d| d.is_masked()) {
        match vote {
            None => vote = Some(data.fill_value()),
            Some(current) => {
                if !fill_eq(current, data.fill_value()) {
                    conflicted = true;
                }
            }
        }
    }
    let resolved = if conflicted { None } else { vote.flatten() };
    resolved.unwrap_or_else(|| defaults.default_for(dtype))
}

fn fill_eq(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.to_bits() == b.to_bits(),
        _ => false,
    }
}
