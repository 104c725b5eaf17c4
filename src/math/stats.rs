//! Descriptive statistics over finite samples.

/// Mean and sample standard deviation (n - 1 denominator) of `values`.
///
/// Returns `None` for fewer than two values. A sample of identical values
/// has a standard deviation of exactly zero; `sum / n` alone is not exact
/// for values such as 0.1.
pub fn mean_and_sample_std<I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
    I::IntoIter: Clone,
{
    let iter = values.into_iter();
    let (count, sum) = iter.clone().fold((0usize, 0.0), |(n, s), v| (n + 1, s + v));
    if count < 2 {
        return None;
    }
    let mut rest = iter.clone();
    if let Some(first) = rest.next() {
        if rest.all(|v| v == first) {
            return Some((first, 0.0));
        }
    }
    let mean = sum / count as f64;
    let sum_sq: f64 = iter.map(|v| (v - mean) * (v - mean)).sum();
    Some((mean, (sum_sq / (count - 1) as f64).sqrt()))
}

/// Arithmetic mean, `None` when empty.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
