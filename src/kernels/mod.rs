use crate::tensor::{Tensor1, TensorView1};

pub mod parallel;

/// Largest absolute component, or `None` if any component is NaN or infinite
fn max_abs(x: TensorView1<'_>) -> Option<f32> {
    if !x.iter().all(|v| v.is_finite()) {
        return None;
    }
    Some(x.iter().fold(0.0f32, |m, v| m.max(v.abs())))
}

/// Euclidean (L2) norm: sqrt(sum(x^2))
///
/// Components are divided by the largest magnitude before squaring, so tiny
/// or huge vectors do not underflow to zero or overflow to infinity.
pub fn l2_norm(x: TensorView1<'_>) -> f32 {
    let Some(scale) = max_abs(x) else {
        return f32::NAN;
    };
    if scale == 0.0 {
        return 0.0;
    }
    let sum: f32 = x.iter().map(|v| (v / scale) * (v / scale)).sum();
    scale * sum.sqrt()
}

/// Scale `x` to unit length.
///
/// Returns `None` when `x` is all zeros or has a non-finite component, since
/// the direction of such a vector is undefined.
pub fn normalize(x: TensorView1<'_>) -> Option<Tensor1> {
    let scale = max_abs(x)?;
    if scale == 0.0 {
        return None;
    }
    let scaled = x.mapv(|v| v / scale);
    let norm = scaled.iter().map(|v| v * v).sum::<f32>().sqrt();
    Some(scaled.mapv(|v| v / norm))
}

/// Dot product of two equal-length vectors
pub fn dot(a: TensorView1<'_>, b: TensorView1<'_>) -> f32 {
    a.dot(&b)
}

/// Cosine similarity between an already unit-length `unit` and a raw `row`.
///
/// The row is normalized first, then dotted with `unit`. Rows with an
/// undefined direction yield `None`.
pub fn cosine_to_unit(unit: TensorView1<'_>, row: TensorView1<'_>) -> Option<f32> {
    let row = normalize(row)?;
    Some(dot(unit, row.view()))
}

/// Cosine similarity between two raw vectors
pub fn cosine_similarity(a: TensorView1<'_>, b: TensorView1<'_>) -> Option<f32> {
    let a = normalize(a)?;
    cosine_to_unit(a.view(), b)
}

/// Select the first index whose score is strictly greater than every score
/// before it, starting from `floor`.
///
/// Scores of `None` are skipped. Ties keep the earliest index; a score equal
/// to `floor` never wins.
pub fn first_strict_max<I>(scores: I, floor: f32) -> Option<(usize, f32)>
where
    I: IntoIterator<Item = Option<f32>>,
{
    let mut best_score = floor;
    let mut best = None;

    for (idx, score) in scores.into_iter().enumerate() {
        if let Some(score) = score {
            if score > best_score {
                best_score = score;
                best = Some((idx, score));
            }
        }
    }

    best
}
