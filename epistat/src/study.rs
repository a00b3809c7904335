//! The frozen study design: the date cutoff, the indicator window, the
//! hand-selected country panel and the categorisation thresholds.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// End of the study period. Observations reported after this date are
/// discarded before aggregation.
pub const STUDY_CUTOFF: (i32, u32, u32) = (2022, 12, 31);

/// Calendar years over which the indicator series are averaged (inclusive).
pub const INDICATOR_WINDOW: (i32, i32) = (2019, 2021);

/// The ten-country panel for the inferential analysis. An editorial, one-time
/// selection (extremes of the case and death distributions); frozen here
/// rather than re-derived. Matching is exact and case-sensitive against the
/// display name produced by the population normalizer.
pub const SELECTED_COUNTRIES: [&str; 10] = [
    "Brazil",
    "Burundi",
    "France",
    "Germany",
    "India",
    "Mexico",
    "Peru",
    "United States",
    "Russia",
    "Yemen",
];

/// World Bank GNI-per-capita classification boundaries (inclusive upper).
pub const LOW_INCOME_MAX_GNI: f64 = 1145.0;
pub const LOWER_MIDDLE_INCOME_MAX_GNI: f64 = 4515.0;
pub const UPPER_MIDDLE_INCOME_MAX_GNI: f64 = 14005.0;

/// Population-density boundaries (people per km², inclusive lower).
pub const MODERATE_DENSITY_MIN: f64 = 50.0;
pub const HIGH_DENSITY_MIN: f64 = 150.0;
pub const VERY_HIGH_DENSITY_MIN: f64 = 300.0;

/// Significance threshold shared by the omnibus test and the post-hoc
/// comparisons.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Four-level income classification of a country's mean GNI per capita.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum IncomeGroup {
    #[strum(serialize = "Low Income")]
    Low,
    #[strum(serialize = "Lower Middle Income")]
    LowerMiddle,
    #[strum(serialize = "Upper Middle Income")]
    UpperMiddle,
    #[strum(serialize = "High Income")]
    High,
}

impl IncomeGroup {
    pub fn from_gni(gni: f64) -> Self {
        if gni <= LOW_INCOME_MAX_GNI {
            IncomeGroup::Low
        } else if gni <= LOWER_MIDDLE_INCOME_MAX_GNI {
            IncomeGroup::LowerMiddle
        } else if gni <= UPPER_MIDDLE_INCOME_MAX_GNI {
            IncomeGroup::UpperMiddle
        } else {
            IncomeGroup::High
        }
    }

    /// Collapse the two middle groups for the grouped statistical test. The
    /// four-level group remains available as a display column.
    pub fn band(self) -> IncomeBand {
        match self {
            IncomeGroup::Low => IncomeBand::Low,
            IncomeGroup::LowerMiddle | IncomeGroup::UpperMiddle => IncomeBand::Middle,
            IncomeGroup::High => IncomeBand::High,
        }
    }
}

/// Three-level income band used to group the case-fatality rates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum IncomeBand {
    #[strum(serialize = "Low Income")]
    Low,
    #[strum(serialize = "Middle Income")]
    Middle,
    #[strum(serialize = "High Income")]
    High,
}

impl IncomeBand {
    /// Band ordering used whenever groups are reported: low to high.
    pub fn all() -> [IncomeBand; 3] {
        [IncomeBand::Low, IncomeBand::Middle, IncomeBand::High]
    }
}

/// Four-level population-density classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum DensityBand {
    #[strum(serialize = "Low Density")]
    Low,
    #[strum(serialize = "Moderate Density")]
    Moderate,
    #[strum(serialize = "High Density")]
    High,
    #[strum(serialize = "Very High Density")]
    VeryHigh,
}

impl DensityBand {
    pub fn from_density(density: f64) -> Self {
        if density < MODERATE_DENSITY_MIN {
            DensityBand::Low
        } else if density < HIGH_DENSITY_MIN {
            DensityBand::Moderate
        } else if density < VERY_HIGH_DENSITY_MIN {
            DensityBand::High
        } else {
            DensityBand::VeryHigh
        }
    }
}

/// The full study design handed through the pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct StudyDesign {
    pub cutoff: NaiveDate,
    pub window: (i32, i32),
    pub countries: Vec<String>,
    pub significance: f64,
}

impl Default for StudyDesign {
    fn default() -> Self {
        let (y, m, d) = STUDY_CUTOFF;
        Self {
            // Unwrap: cannot fail, the cutoff constant is a valid date
            cutoff: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            window: INDICATOR_WINDOW,
            countries: SELECTED_COUNTRIES.iter().map(|s| s.to_string()).collect(),
            significance: SIGNIFICANCE_LEVEL,
        }
    }
}
