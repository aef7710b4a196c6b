//! Monitor QA metric calculators.
//!
//! Every function here is pure and total: degenerate input (empty slices,
//! zero denominators, undefined correlation) returns a documented sentinel
//! instead of an error or a non-finite value. Non-finite values inside a
//! slice are treated as missing and dropped before computing.
//!
//! A 0.0 sentinel is indistinguishable from a genuine 0.0 result; callers
//! that care must inspect the input themselves.

/// Default floor below which a reading counts as a dropout.
pub const DEFAULT_DROPOUT_FLOOR: f64 = 0.05;

fn finite(values: &[f64]) -> impl Iterator<Item = f64> + '_ {
    values.iter().copied().filter(|v| v.is_finite())
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n-1 denominator). Callers guarantee n >= 2.
fn sample_std(values: &[f64], mu: f64) -> f64 {
    let ss: f64 = values.iter().map(|v| (v - mu).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Recorded rows as a percentage of expected rows.
///
/// Not clamped: over-recording yields more than 100. Returns 0.0 when no
/// rows were expected.
pub fn completeness(actual_rows: usize, expected_rows: usize) -> f64 {
    if expected_rows == 0 {
        return 0.0;
    }
    (actual_rows as f64 / expected_rows as f64) * 100.0
}

/// Percentage of readings below `floor_threshold`.
///
/// Returns 0.0 when there are no finite readings.
pub fn dropout_rate(values: &[f64], floor_threshold: f64) -> f64 {
    let (total, dropouts) = finite(values).fold((0usize, 0usize), |(total, low), v| {
        (total + 1, low + usize::from(v < floor_threshold))
    });
    if total == 0 {
        return 0.0;
    }
    (dropouts as f64 / total as f64) * 100.0
}

/// Coefficient of variation (sample stddev / mean) of a signal expected to
/// follow a diurnal cycle. A near-zero value points at a stuck sensor.
///
/// Returns 0.0 when the mean is not positive or when fewer than two finite
/// readings are available.
pub fn diurnal_flatness(values: &[f64]) -> f64 {
    let clean: Vec<f64> = finite(values).collect();
    if clean.len() < 2 {
        return 0.0;
    }
    let mu = mean(&clean);
    if mu <= 0.0 {
        return 0.0;
    }
    let cv = sample_std(&clean, mu) / mu;
    if cv.is_finite() { cv } else { 0.0 }
}

/// Pearson correlation between position-aligned flow and depth readings.
///
/// Returns 0.0 when the slices differ in length, when fewer than two pairs
/// with finite values on both sides remain, or when either side has zero
/// variance.
pub fn hydraulic_coherence(flow: &[f64], depth: &[f64]) -> f64 {
    if flow.len() != depth.len() {
        return 0.0;
    }
    let (x, y): (Vec<f64>, Vec<f64>) = flow
        .iter()
        .zip(depth)
        .filter(|(q, h)| q.is_finite() && h.is_finite())
        .map(|(&q, &h)| (q, h))
        .unzip();
    if x.len() < 2 {
        return 0.0;
    }

    let mean_x = mean(&x);
    let mean_y = mean(&y);
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(&y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }

    let r = cov / (var_x.sqrt() * var_y.sqrt());
    if r.is_finite() { r.clamp(-1.0, 1.0) } else { 0.0 }
}

/// Downstream volume discrepancy relative to upstream, in percent.
///
/// With no upstream volume the ratio is undefined: any downstream volume
/// reports 100.0, none reports 0.0.
pub fn volume_imbalance(upstream_total: f64, downstream_total: f64) -> f64 {
    if upstream_total == 0.0 {
        return if downstream_total > 0.0 { 100.0 } else { 0.0 };
    }
    ((downstream_total - upstream_total) / upstream_total) * 100.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
