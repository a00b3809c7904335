//! Tukey's honestly-significant-difference post-hoc comparison.
//!
//! The studentized range distribution is not shipped by any crate in this
//! stack, so its CDF is evaluated numerically: the known-variance range
//! probability is an integral over the normal density, and the finite-df
//! version integrates that again over the chi distribution of the pooled
//! standard deviation. Both integrals use composite Simpson quadrature on
//! statrs primitives.

use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};
use statrs::function::gamma::ln_gamma;

use crate::error::{EpistatError, Result};
use crate::stats::anova::AnovaTable;

/// One pairwise mean comparison with its family-wise adjusted p-value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TukeyComparison {
    pub group_a: String,
    pub group_b: String,
    /// `mean(group_b) - mean(group_a)`.
    pub mean_difference: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub adjusted_p: f64,
    pub significant: bool,
}

/// All pairwise comparisons among the groups of a completed omnibus test,
/// using the Tukey–Kramer standard error for unequal group sizes.
pub fn tukey_hsd(anova: &AnovaTable, significance: f64) -> Result<Vec<TukeyComparison>> {
    let k = anova.groups.len();
    let df = anova.df_within;
    let q_critical = studentized_range_quantile(1.0 - significance, k, df)?;

    let mut comparisons = Vec::new();
    for i in 0..k {
        for j in (i + 1)..k {
            let a = &anova.groups[i];
            let b = &anova.groups[j];
            let mean_difference = b.mean - a.mean;
            let se = (anova.mean_square_within / 2.0
                * (1.0 / a.n as f64 + 1.0 / b.n as f64))
                .sqrt();

            let (adjusted_p, margin) = if se > 0.0 {
                let q = mean_difference.abs() / se;
                (1.0 - studentized_range_cdf(q, k, df)?, q_critical * se)
            } else {
                // Zero pooled variance: any non-zero difference is certain.
                (if mean_difference == 0.0 { 1.0 } else { 0.0 }, 0.0)
            };

            comparisons.push(TukeyComparison {
                group_a: a.label.clone(),
                group_b: b.label.clone(),
                mean_difference,
                ci_lower: mean_difference - margin,
                ci_upper: mean_difference + margin,
                adjusted_p,
                significant: adjusted_p < significance,
            });
        }
    }
    Ok(comparisons)
}

/// P(Q <= q) for the studentized range of `k` groups with `df` degrees of
/// freedom in the variance estimate.
pub fn studentized_range_cdf(q: f64, k: usize, df: usize) -> Result<f64> {
    if k < 2 || df < 1 {
        return Err(EpistatError::Computation(format!(
            "studentized range needs k >= 2 and df >= 1, got k={k}, df={df}"
        )));
    }
    if q <= 0.0 {
        return Ok(0.0);
    }
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| EpistatError::Computation(format!("normal distribution: {e}")))?;

    // With df this large the variance estimate is effectively exact.
    if df > 5000 {
        return Ok(range_cdf_known_sigma(q, k, &normal));
    }

    let nu = df as f64;
    let upper = 1.0 + 10.0 / nu.sqrt();
    let cdf = simpson(0.0, upper, 256, |u| {
        chi_density(u, nu) * range_cdf_known_sigma(q * u, k, &normal)
    });
    Ok(cdf.clamp(0.0, 1.0))
}

/// Inverse of `studentized_range_cdf` in q, by bisection.
pub fn studentized_range_quantile(p: f64, k: usize, df: usize) -> Result<f64> {
    if !(0.0..1.0).contains(&p) {
        return Err(EpistatError::Computation(format!(
            "quantile probability must be in [0, 1), got {p}"
        )));
    }
    let mut lo = 0.0_f64;
    let mut hi = 50.0_f64;
    for _ in 0..48 {
        let mid = 0.5 * (lo + hi);
        if studentized_range_cdf(mid, k, df)? < p {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Ok(0.5 * (lo + hi))
}

/// P(range of k iid standard normals <= q), i.e. the infinite-df limit.
fn range_cdf_known_sigma(q: f64, k: usize, normal: &Normal) -> f64 {
    if q <= 0.0 {
        return 0.0;
    }
    let integral = simpson(-8.0, 8.0, 200, |z| {
        normal.pdf(z) * (normal.cdf(z) - normal.cdf(z - q)).powi(k as i32 - 1)
    });
    (k as f64 * integral).clamp(0.0, 1.0)
}

/// Density of sqrt(chi^2_nu / nu), the scaled sampling distribution of the
/// pooled standard deviation.
fn chi_density(u: f64, nu: f64) -> f64 {
    if u <= 0.0 {
        return if nu == 1.0 {
            (2.0 / std::f64::consts::PI).sqrt()
        } else {
            0.0
        };
    }
    let ln_density = (1.0 - nu / 2.0) * std::f64::consts::LN_2
        + (nu / 2.0) * nu.ln()
        + (nu - 1.0) * u.ln()
        - nu * u * u / 2.0
        - ln_gamma(nu / 2.0);
    ln_density.exp()
}

/// Composite Simpson quadrature with `n` (even) panels.
fn simpson<F: Fn(f64) -> f64>(a: f64, b: f64, n: usize, f: F) -> f64 {
    debug_assert!(n % 2 == 0);
    let h = (b - a) / n as f64;
    let mut sum = f(a) + f(b);
    for i in 1..n {
        let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * f(a + i as f64 * h);
    }
    sum * h / 3.0
}
