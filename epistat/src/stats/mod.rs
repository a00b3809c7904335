//! The inferential step of the study: omnibus ANOVA over the income bands,
//! post-hoc Tukey comparisons when the omnibus test is significant, and the
//! indicator/measure correlation sweep.

pub mod anova;
pub mod correlation;
pub mod tukey;

use std::collections::HashMap;
use std::str::FromStr;

use itertools::izip;
use log::info;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

pub use anova::{one_way_anova, AnovaOutcome, AnovaTable, GroupSummary};
pub use correlation::{pearson, Correlation};
pub use tukey::{tukey_hsd, TukeyComparison};

use crate::error::{EpistatError, Result};
use crate::study::{IncomeBand, StudyDesign};
use crate::COL;

/// One cell of the indicator-by-measure correlation sweep. `estimate` is
/// `None` when too few pairwise-complete observations remain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorrelationCell {
    pub indicator: String,
    pub measure: String,
    pub estimate: Option<Correlation>,
}

/// The serializable inferential results of a study run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StudyStats {
    pub anova: AnovaOutcome,
    /// Populated only when the omnibus test completed and was significant.
    pub tukey: Option<Vec<TukeyComparison>>,
    pub correlations: Vec<CorrelationCell>,
}

/// The full study output: the analysis table plus the inferential results.
#[derive(Clone, Debug)]
pub struct StudyReport {
    pub analysis: DataFrame,
    pub stats: StudyStats,
}

/// Run the inferential step over a finished analysis table.
pub fn run_study(analysis: &DataFrame, study: &StudyDesign) -> Result<StudyReport> {
    let groups = cfr_by_income_band(analysis)?;
    let anova = one_way_anova(&groups, study.significance)?;
    let tukey = match &anova {
        AnovaOutcome::Tested(table) if table.significant => {
            Some(tukey_hsd(table, study.significance)?)
        }
        AnovaOutcome::Tested(_) => None,
        AnovaOutcome::NotApplicable { group, observations } => {
            info!(
                "Omnibus test not applicable: group '{group}' has {observations} observation(s)"
            );
            None
        }
    };

    let mut correlations = Vec::new();
    for indicator in [
        COL::GNI_PER_CAPITA,
        COL::HEALTH_COVERAGE_INDEX,
        COL::POPULATION_DENSITY,
    ] {
        for measure in [COL::CASES_PER_100K, COL::DEATHS_PER_100K, COL::CFR_PER_1000] {
            let xs = optional_column(analysis, indicator)?;
            let ys = optional_column(analysis, measure)?;
            correlations.push(CorrelationCell {
                indicator: indicator.to_string(),
                measure: measure.to_string(),
                estimate: pearson(&xs, &ys),
            });
        }
    }

    Ok(StudyReport {
        analysis: analysis.clone(),
        stats: StudyStats {
            anova,
            tukey,
            correlations,
        },
    })
}

/// Collect the defined case-fatality rates into the three income bands, in
/// reporting order. Rows with a missing rate or band stay in the analysis
/// table but cannot enter the grouped test.
fn cfr_by_income_band(analysis: &DataFrame) -> Result<Vec<(String, Vec<f64>)>> {
    let bands = analysis.column(COL::INCOME_BAND)?.str()?;
    let cfrs = analysis.column(COL::CFR_PER_1000)?.f64()?;

    let mut grouped: HashMap<IncomeBand, Vec<f64>> = HashMap::new();
    for (band, cfr) in izip!(bands, cfrs) {
        if let (Some(band), Some(cfr)) = (band, cfr) {
            let band = IncomeBand::from_str(band).map_err(|_| {
                EpistatError::Computation(format!("unknown income band label '{band}'"))
            })?;
            grouped.entry(band).or_default().push(cfr);
        }
    }
    Ok(IncomeBand::all()
        .iter()
        .map(|band| (band.to_string(), grouped.remove(band).unwrap_or_default()))
        .collect())
}

fn optional_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    Ok(df.column(name)?.f64()?.into_iter().collect())
}
