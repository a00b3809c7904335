//! Construction of the ten-country analysis table: the inner restriction to
//! the study panel, the case-fatality rate, the socioeconomic indicator
//! joins and the derived categories.

use log::debug;
use polars::prelude::*;

use crate::error::Result;
use crate::study::{DensityBand, IncomeGroup, StudyDesign};
use crate::COL;

/// Per-country means of the three socioeconomic indicator series over the
/// study window. Each series is averaged independently, so a year missing
/// one indicator still contributes its other values.
pub fn indicator_means(indicators: &DataFrame, window: (i32, i32)) -> Result<DataFrame> {
    let (start, end) = window;
    let means = indicators
        .clone()
        .lazy()
        .filter(
            col(COL::YEAR)
                .gt_eq(lit(start))
                .and(col(COL::YEAR).lt_eq(lit(end))),
        )
        .group_by([col(COL::COUNTRY_CODE)])
        .agg([
            col(COL::GNI_PER_CAPITA).mean().alias(COL::GNI_PER_CAPITA),
            col(COL::HEALTH_COVERAGE_INDEX)
                .mean()
                .alias(COL::HEALTH_COVERAGE_INDEX),
            col(COL::POPULATION_DENSITY)
                .mean()
                .alias(COL::POPULATION_DENSITY),
        ])
        .collect()?;
    Ok(means)
}

/// Build the analysis table from the full rate table:
///
/// 1. restrict to the fixed country panel (exact, case-sensitive match on
///    the display name; countries absent from the rate table are simply
///    absent here, never fabricated);
/// 2. derive the case-fatality rate per 1000 cases (null when the case
///    count is zero or unknown);
/// 3. left-join the windowed indicator means by country code;
/// 4. derive the income and density categories.
pub fn analysis_table(
    rates: &DataFrame,
    indicators: &DataFrame,
    study: &StudyDesign,
) -> Result<DataFrame> {
    debug!("Restricting to the {}-country panel", study.countries.len());
    let selected = Series::new("selected", study.countries.clone());
    let mut table = rates
        .clone()
        .lazy()
        .filter(col(COL::COUNTRY_NAME).is_in(lit(selected)))
        .with_column(cfr_expr().alias(COL::CFR_PER_1000))
        .join(
            indicator_means(indicators, study.window)?.lazy(),
            [col(COL::COUNTRY_CODE)],
            [col(COL::COUNTRY_CODE)],
            JoinArgs::new(JoinType::Left),
        )
        .sort([COL::COUNTRY_CODE], SortMultipleOptions::default())
        .collect()?;

    let income_groups = classify(&table, COL::GNI_PER_CAPITA, |gni| {
        IncomeGroup::from_gni(gni).to_string()
    })?;
    let income_bands = classify(&table, COL::GNI_PER_CAPITA, |gni| {
        IncomeGroup::from_gni(gni).band().to_string()
    })?;
    let density_bands = classify(&table, COL::POPULATION_DENSITY, |density| {
        DensityBand::from_density(density).to_string()
    })?;
    table.with_column(Series::new(COL::INCOME_GROUP, income_groups))?;
    table.with_column(Series::new(COL::INCOME_BAND, income_bands))?;
    table.with_column(Series::new(COL::DENSITY_BAND, density_bands))?;
    Ok(table)
}

/// Case-fatality rate per 1000 reported cases. Undefined when the case count
/// is zero or unknown.
fn cfr_expr() -> Expr {
    when(
        col(COL::TOTAL_CASES)
            .is_null()
            .or(col(COL::TOTAL_CASES).eq(lit(0))),
    )
    .then(lit(NULL))
    .otherwise(
        col(COL::TOTAL_DEATHS).cast(DataType::Float64)
            / col(COL::TOTAL_CASES).cast(DataType::Float64)
            * lit(1000.0),
    )
}

/// Map a numeric column through a pure categorisation function, keeping
/// nulls null.
fn classify<F>(table: &DataFrame, column: &str, f: F) -> Result<Vec<Option<String>>>
where
    F: Fn(f64) -> String,
{
    Ok(table
        .column(column)?
        .f64()?
        .into_iter()
        .map(|value| value.map(&f))
        .collect())
}
