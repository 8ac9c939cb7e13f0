//! Post-processing of a recorded potential trace.

use itertools::Itertools;

/// Indices `i` where the trace rises through `threshold` between `i` and `i + 1`
pub fn upward_crossings(trace: &[f64], threshold: f64) -> Vec<usize> {
    trace
        .iter()
        .tuple_windows()
        .positions(|(&a, &b)| a < threshold && b >= threshold)
        .collect()
}

/// Indices `i` where the trace falls through `threshold` between `i` and `i + 1`
pub fn downward_crossings(trace: &[f64], threshold: f64) -> Vec<usize> {
    trace
        .iter()
        .tuple_windows()
        .positions(|(&a, &b)| a > threshold && b <= threshold)
        .collect()
}

/// Action potential duration of the `beat_index`-th (zero-based) beat: from its
/// upward crossing of `threshold` to the first downward crossing after it.
///
/// `None` if that beat never starts or never repolarizes within the trace.
pub fn action_potential_duration(
    trace: &[f64],
    dt: f64,
    threshold: f64,
    beat_index: usize,
) -> Option<f64> {
    let start = *upward_crossings(trace, threshold).get(beat_index)?;
    let end = downward_crossings(trace, threshold)
        .into_iter()
        .find(|&i| i > start)?;
    Some((end - start) as f64 * dt)
}

/// (peak, trough) of the trace
pub fn peak_and_trough(trace: &[f64]) -> Option<(f64, f64)> {
    trace
        .iter()
        .copied()
        .minmax()
        .into_option()
        .map(|(min, max)| (max, min))
}
