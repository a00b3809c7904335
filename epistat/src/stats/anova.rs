//! One-way analysis of variance.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

use crate::error::{EpistatError, Result};

/// Size and mean of one group entering the omnibus test.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub label: String,
    pub n: usize,
    pub mean: f64,
}

/// A completed omnibus test.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnovaTable {
    pub f_statistic: f64,
    pub p_value: f64,
    pub df_between: usize,
    pub df_within: usize,
    pub mean_square_within: f64,
    pub groups: Vec<GroupSummary>,
    pub significant: bool,
}

/// Outcome of the omnibus test. A group with fewer than two observations
/// leaves the test undefined; that is a reportable condition, not a skip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AnovaOutcome {
    Tested(AnovaTable),
    NotApplicable { group: String, observations: usize },
}

/// One-way ANOVA of the given groups under the null hypothesis that all
/// group means are equal, with the decision taken at `significance`.
pub fn one_way_anova(groups: &[(String, Vec<f64>)], significance: f64) -> Result<AnovaOutcome> {
    if let Some((label, values)) = groups.iter().find(|(_, values)| values.len() < 2) {
        return Ok(AnovaOutcome::NotApplicable {
            group: label.clone(),
            observations: values.len(),
        });
    }
    if groups.len() < 2 {
        return Err(EpistatError::Computation(
            "ANOVA requires at least two groups".to_string(),
        ));
    }

    let n_total: usize = groups.iter().map(|(_, values)| values.len()).sum();
    let grand_mean: f64 = groups
        .iter()
        .flat_map(|(_, values)| values.iter())
        .sum::<f64>()
        / n_total as f64;

    let summaries: Vec<GroupSummary> = groups
        .iter()
        .map(|(label, values)| GroupSummary {
            label: label.clone(),
            n: values.len(),
            mean: values.iter().sum::<f64>() / values.len() as f64,
        })
        .collect();

    let ss_between: f64 = summaries
        .iter()
        .map(|g| g.n as f64 * (g.mean - grand_mean).powi(2))
        .sum();
    let ss_within: f64 = groups
        .iter()
        .zip(summaries.iter())
        .map(|((_, values), summary)| {
            values.iter().map(|v| (v - summary.mean).powi(2)).sum::<f64>()
        })
        .sum();

    let df_between = groups.len() - 1;
    let df_within = n_total - groups.len();
    let ms_between = ss_between / df_between as f64;
    let ms_within = ss_within / df_within as f64;

    let (f_statistic, p_value) = if ms_within > 0.0 {
        let f = ms_between / ms_within;
        let dist = FisherSnedecor::new(df_between as f64, df_within as f64)
            .map_err(|e| EpistatError::Computation(format!("F distribution: {e}")))?;
        (f, 1.0 - dist.cdf(f))
    } else if ms_between > 0.0 {
        // Zero within-group variance with separated means: the null is
        // rejected with certainty.
        (f64::INFINITY, 0.0)
    } else {
        // Every observation identical; nothing to reject.
        (0.0, 1.0)
    };

    Ok(AnovaOutcome::Tested(AnovaTable {
        f_statistic,
        p_value,
        df_between,
        df_within,
        mean_square_within: ms_within,
        groups: summaries,
        significant: p_value < significance,
    }))
}
