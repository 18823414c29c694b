//! Descriptive statistics and Welch's two-sample t-test.
//!
//! The t distribution tail is computed from the regularized incomplete beta
//! function (continued fraction, modified Lentz) with a Stirling-series
//! log-gamma. For `df > 100` the normal approximation is used instead, via
//! the Abramowitz & Stegun 7.1.26 `erf` (absolute error below 1.5e-7).
//! No function here panics or returns NaN for finite input.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::f64::consts::PI;

/// Degrees of freedom above which the normal approximation is used
pub const NORMAL_APPROX_DF: f64 = 100.0;

const CF_MAX_ITERATIONS: usize = 300;
const CF_EPSILON: f64 = 1e-14;
const CF_TINY: f64 = 1e-300;

/// Summary of a sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub mean: f64,
    pub median: f64,
    /// Sample (n-1) standard deviation
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
}

/// Result of Welch's t-test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TTest {
    pub t: f64,
    /// Two-tailed p-value
    pub p: f64,
    /// Welch-Satterthwaite degrees of freedom
    pub df: f64,
}

impl TTest {
    /// The result reported when the test cannot be computed
    pub fn inconclusive() -> Self {
        Self {
            t: 0.0,
            p: 1.0,
            df: 0.0,
        }
    }
}

fn finite(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance; zero for fewer than two values
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Mean, median, sample standard deviation, min and max.
///
/// Non-finite values are ignored. An empty sample describes as all zeros.
pub fn describe(values: &[f64]) -> Stats {
    let values = finite(values);
    if values.is_empty() {
        return Stats::default();
    }

    Stats {
        mean: mean(&values),
        median: median(&values),
        stddev: variance(&values).sqrt(),
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}

/// Welch's unequal-variance t-test of `a` against `b`.
///
/// Returns [`TTest::inconclusive`] when either sample has fewer than two
/// values or the standard error is zero.
pub fn t_test(a: &[f64], b: &[f64]) -> TTest {
    let a = finite(a);
    let b = finite(b);
    if a.len() < 2 || b.len() < 2 {
        return TTest::inconclusive();
    }

    let (na, nb) = (a.len() as f64, b.len() as f64);
    let va = variance(&a) / na;
    let vb = variance(&b) / nb;
    let se = (va + vb).sqrt();
    if !se.is_finite() || se <= 0.0 {
        return TTest::inconclusive();
    }

    let t = (mean(&a) - mean(&b)) / se;
    let df = (va + vb).powi(2) / (va.powi(2) / (na - 1.0) + vb.powi(2) / (nb - 1.0));
    let p = two_tailed_p(t, df);

    TTest { t, p, df }
}

/// Two-tailed p-value of `t` under a t distribution with `df` degrees of freedom
pub fn two_tailed_p(t: f64, df: f64) -> f64 {
    if !t.is_finite() || !df.is_finite() || df <= 0.0 {
        return if t.is_infinite() { 0.0 } else { 1.0 };
    }
    let p = if df > NORMAL_APPROX_DF {
        2.0 * (1.0 - normal_cdf(t.abs()))
    } else {
        regularized_incomplete_beta(df / (df + t * t), df / 2.0, 0.5)
    };
    if p.is_nan() {
        1.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// Standard normal cumulative distribution function
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// Abramowitz & Stegun 7.1.26
pub fn erf(x: f64) -> f64 {
    const P: f64 = 0.327_591_1;
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Natural log of the gamma function for `x > 0`.
///
/// Arguments below 7 are shifted up with `ln Γ(x) = ln Γ(x+1) - ln x` before
/// the Stirling series is applied; absolute error is below 1e-10.
pub fn ln_gamma(x: f64) -> f64 {
    if x <= 0.0 || !x.is_finite() {
        return f64::INFINITY;
    }

    let mut x = x;
    let mut shift = 0.0;
    while x < 7.0 {
        shift -= x.ln();
        x += 1.0;
    }

    let inv = 1.0 / x;
    let inv2 = inv * inv;
    let series = inv
        * (1.0 / 12.0 - inv2 * (1.0 / 360.0 - inv2 * (1.0 / 1260.0 - inv2 / 1680.0)));
    shift + (x - 0.5) * x.ln() - x + 0.5 * (2.0 * PI).ln() + series
}

/// Regularized incomplete beta function `I_x(a, b)`
pub fn regularized_incomplete_beta(x: f64, a: f64, b: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let ln_front =
        ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();

    // The continued fraction converges fastest on this side of the mean.
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(x, a, b) / a
    } else {
        1.0 - front * beta_continued_fraction(1.0 - x, b, a) / b
    }
}

fn nonzero(value: f64) -> f64 {
    if value.abs() < CF_TINY {
        CF_TINY
    } else {
        value
    }
}

/// Continued fraction for the incomplete beta, evaluated by modified Lentz
fn beta_continued_fraction(x: f64, a: f64, b: f64) -> f64 {
    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 / nonzero(1.0 - qab * x / qap);
    let mut h = d;

    for m in 1..=CF_MAX_ITERATIONS {
        let m = m as f64;
        let m2 = 2.0 * m;

        let even = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 / nonzero(1.0 + even * d);
        c = nonzero(1.0 + even / c);
        h *= d * c;

        let odd = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 / nonzero(1.0 + odd * d);
        c = nonzero(1.0 + odd / c);
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < CF_EPSILON {
            break;
        }
    }

    h
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: f64, expected: f64, tolerance: f64) -> bool {
        (actual - expected).abs() <= tolerance
    }

    #[test]
    fn test_describe_empty_and_single() {
        assert_eq!(describe(&[]), Stats::default());
        assert_eq!(
            describe(&[4.0]),
            Stats {
                mean: 4.0,
                median: 4.0,
                stddev: 0.0,
                min: 4.0,
                max: 4.0,
            }
        );
    }

    #[test]
    fn test_describe_sample_stddev() {
        let stats = describe(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!(close(stats.mean, 5.0, 1e-12));
        assert!(close(stats.median, 4.5, 1e-12));
        assert!(close(stats.stddev, 2.138, 1e-3));
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
    }

    #[test]
    fn test_describe_ignores_nan() {
        let stats = describe(&[1.0, f64::NAN, 3.0]);
        assert_eq!(stats.mean, 2.0);
    }

    #[test]
    fn test_ln_gamma_known_values() {
        assert!(close(ln_gamma(1.0), 0.0, 1e-10));
        assert!(close(ln_gamma(5.0), 24f64.ln(), 1e-10));
        assert!(close(ln_gamma(0.5), PI.sqrt().ln(), 1e-10));
        assert!(close(ln_gamma(10.5), 13.940_625_219_403_763, 1e-10));
    }

    #[test]
    fn test_incomplete_beta_known_values() {
        // I_x(1, 1) = x
        assert!(close(regularized_incomplete_beta(0.3, 1.0, 1.0), 0.3, 1e-9));
        // I_x(a, b) = 1 - I_{1-x}(b, a)
        let left = regularized_incomplete_beta(0.2, 2.5, 0.5);
        let right = regularized_incomplete_beta(0.8, 0.5, 2.5);
        assert!(close(left, 1.0 - right, 1e-9));
        assert_eq!(regularized_incomplete_beta(0.0, 2.0, 0.5), 0.0);
        assert_eq!(regularized_incomplete_beta(1.0, 2.0, 0.5), 1.0);
    }

    #[test]
    fn test_two_tailed_p_critical_values() {
        // Textbook critical values at the 5% level
        assert!(close(two_tailed_p(2.228, 10.0), 0.05, 1e-3));
        assert!(close(two_tailed_p(2.776, 4.0), 0.05, 1e-3));
        assert!(close(two_tailed_p(1.96, 1000.0), 0.05, 1e-3));
        assert!(close(two_tailed_p(0.0, 7.0), 1.0, 1e-12));
    }

    #[test]
    fn test_t_test_identical_samples() {
        let sample = [3.0, 4.0, 5.0];
        let result = t_test(&sample, &sample);
        assert!(close(result.t, 0.0, 1e-12));
        assert!(close(result.p, 1.0, 1e-9));
    }

    #[test]
    fn test_t_test_degenerate_inputs() {
        assert_eq!(t_test(&[1.0], &[2.0, 3.0]), TTest::inconclusive());
        assert_eq!(t_test(&[], &[]), TTest::inconclusive());
        assert_eq!(t_test(&[2.0, 2.0], &[2.0, 2.0]), TTest::inconclusive());
    }

    #[test]
    fn test_t_test_welch() {
        let result = t_test(&[4.25, 4.0, 3.75], &[3.0, 3.25, 2.75]);
        assert!(close(result.t, 4.899, 1e-3));
        assert!(close(result.df, 4.0, 1e-9));
        assert!(close(result.p, 0.008, 1e-3));
    }

    #[test]
    fn test_t_test_clear_difference_is_significant() {
        let result = t_test(&[4.0, 4.5, 4.2, 4.3, 4.0], &[3.0, 3.5, 2.8, 3.2, 3.0]);
        assert!(result.t > 0.0);
        assert!(result.p < 0.01);
        assert!(!result.p.is_nan());
    }

    #[test]
    fn test_erf_and_normal_cdf() {
        assert!(close(erf(0.0), 0.0, 1e-7));
        assert!(close(erf(1.0), 0.842_700_79, 2e-7));
        assert!(close(erf(-1.0), -0.842_700_79, 2e-7));
        assert!(close(normal_cdf(1.96), 0.975, 1e-4));
    }
}
