//! Charge-weighted statistics over pulse times.

/// Charge-weighted histogram over `edges`.
///
/// Bins are half-open `[e_i, e_{i+1})` except the last, which also includes its
/// right edge. Values outside `[edges[0], edges[n]]` and NaNs are dropped.
/// Returns `edges.len() - 1` bin totals (empty if fewer than two edges).
pub fn weighted_histogram(values: &[f64], weights: &[f64], edges: &[f64]) -> Vec<f64> {
    if edges.len() < 2 {
        return Vec::new();
    }

    let num_bins = edges.len() - 1;
    let first = edges[0];
    let last = edges[num_bins];
    let mut hist = vec![0.0; num_bins];

    for (&x, &w) in values.iter().zip(weights) {
        if !(x >= first && x <= last) {
            continue;
        }
        let bin = if x == last {
            num_bins - 1
        } else {
            // number of edges <= x, minus one
            edges.partition_point(|&e| e <= x) - 1
        };
        hist[bin] += w;
    }

    hist
}

/// Charge-weighted mean, `None` if the weights sum to zero
pub fn weighted_mean(values: &[f64], weights: &[f64]) -> Option<f64> {
    let total: f64 = weights.iter().sum();
    if total == 0.0 {
        return None;
    }
    let sum: f64 = values.iter().zip(weights).map(|(x, w)| x * w).sum();
    Some(sum / total)
}

/// Charge-weighted (population) standard deviation
pub fn weighted_std(values: &[f64], weights: &[f64]) -> Option<f64> {
    let mean = weighted_mean(values, weights)?;
    let total: f64 = weights.iter().sum();
    let variance: f64 = values
        .iter()
        .zip(weights)
        .map(|(x, w)| w * (x - mean).powi(2))
        .sum::<f64>()
        / total;
    Some(variance.sqrt())
}

/// Smallest value whose normalised cumulative weight, taken over values in
/// ascending order, reaches `quantile`.
///
/// Returns `None` for empty input or zero total weight.
pub fn weighted_quantile(values: &[f64], weights: &[f64], quantile: f64) -> Option<f64> {
    let total: f64 = weights.iter().sum();
    if values.is_empty() || total == 0.0 {
        return None;
    }

    let mut order: Vec<usize> = (0..values.len().min(weights.len())).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut cumulative = 0.0;
    for &i in &order {
        cumulative += weights[i];
        if cumulative / total >= quantile {
            return Some(values[i]);
        }
    }

    // rounding can leave the final cumulative fraction just below 1.0
    order.last().map(|&i| values[i])
}
