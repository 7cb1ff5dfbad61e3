/// Median of a slice of counts. Even-length input averages the two middle
/// values. Returns `None` for empty input.
pub fn median(values: &[u64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid] as f64)
    } else {
        Some((sorted[mid - 1] as f64 + sorted[mid] as f64) * 0.5)
    }
}
