//! Small numeric helpers shared by the detectors.

/// Map a non-negative statistic onto `[0, 1)`: 0.5 at `threshold`,
/// approaching 1 as the statistic grows.
pub fn saturate(statistic: f64, threshold: f64) -> f64 {
    if statistic.is_nan() || statistic <= 0.0 || threshold.is_nan() || threshold <= 0.0 {
        return 0.0;
    }
    (1.0 - 0.5f64.powf(statistic / threshold)).clamp(0.0, 1.0)
}

pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Population standard deviation.
pub fn std_dev(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let m = mean(xs);
    let variance = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / xs.len() as f64;
    variance.sqrt()
}

/// Percentile with linear interpolation between closest ranks, `q` in `[0, 1]`.
pub fn percentile(xs: &[f64], q: f64) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

pub fn median(xs: &[f64]) -> f64 {
    percentile(xs, 0.5)
}

/// Least-squares line through `(i, ys[i])`. Returns `(slope, intercept)`.
pub fn linear_fit(ys: &[f64]) -> (f64, f64) {
    let n = ys.len();
    if n < 2 {
        return (0.0, mean(ys));
    }
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(ys);
    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (i, y) in ys.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }
    let slope = sxy / sxx;
    (slope, y_mean - slope * x_mean)
}

/// First differences `x[i+1] - x[i]`.
pub fn diff(xs: &[f64]) -> Vec<f64> {
    xs.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Round for auxiliary output.
pub(crate) fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturate_is_half_at_threshold() {
        assert!((saturate(3.0, 3.0) - 0.5).abs() < 1e-12);
        assert_eq!(saturate(0.0, 3.0), 0.0);
        assert!(saturate(300.0, 3.0) <= 1.0);
        assert!(saturate(30.0, 3.0) > 0.99);
        assert_eq!(saturate(f64::NAN, 3.0), 0.0);
    }

    #[test]
    fn saturate_is_monotonic() {
        let mut prev = 0.0;
        for i in 1..50 {
            let s = saturate(i as f64 * 0.5, 3.0);
            assert!(s >= prev);
            prev = s;
        }
    }

    #[test]
    fn percentile_interpolates() {
        let xs = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(percentile(&xs, 0.0), 1.0);
        assert_eq!(percentile(&xs, 1.0), 4.0);
        assert!((percentile(&xs, 0.5) - 2.5).abs() < 1e-12);
        assert_eq!(median(&[5.0]), 5.0);
    }

    #[test]
    fn linear_fit_recovers_line() {
        let ys: Vec<f64> = (0..10).map(|i| 2.0 + 0.5 * i as f64).collect();
        let (slope, intercept) = linear_fit(&ys);
        assert!((slope - 0.5).abs() < 1e-12);
        assert!((intercept - 2.0).abs() < 1e-12);
    }

    #[test]
    fn std_dev_of_constant_is_zero() {
        assert_eq!(std_dev(&[22.0; 8]), 0.0);
        assert!((std_dev(&[1.0, 3.0]) - 1.0).abs() < 1e-12);
    }
}
