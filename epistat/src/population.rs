//! Per-country population figure over the study window.

use log::debug;
use polars::prelude::*;

use crate::error::Result;
use crate::COL;

/// Reduce the per-year population records to one `PopulationSummary` row per
/// country: the arithmetic mean of the population figure across the window,
/// excluding missing values. A country whose every windowed value is missing
/// keeps a null population, which propagates through all downstream rate
/// computations rather than being coerced to zero.
///
/// One representative display name is retained per country. The tie-break is
/// deterministic: the lexicographically first non-missing name, independent
/// of input ordering.
pub fn population_summary(indicators: &DataFrame, window: (i32, i32)) -> Result<DataFrame> {
    let (start, end) = window;
    debug!("Summarising population over {start}..={end}");
    let summary = indicators
        .clone()
        .lazy()
        .filter(
            col(COL::YEAR)
                .gt_eq(lit(start))
                .and(col(COL::YEAR).lt_eq(lit(end))),
        )
        .group_by([col(COL::COUNTRY_CODE)])
        .agg([
            col(COL::COUNTRY_NAME)
                .drop_nulls()
                .sort(SortOptions::default())
                .first()
                .alias(COL::COUNTRY_NAME),
            col(COL::POPULATION).mean().alias(COL::POPULATION),
        ])
        .sort([COL::COUNTRY_CODE], SortMultipleOptions::default())
        .collect()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: (i32, i32) = (2019, 2021);

    fn records() -> DataFrame {
        df!(
            COL::COUNTRY_CODE => &["PE", "PE", "PE", "BI", "BI", "BI", "YE"],
            COL::COUNTRY_NAME => &[
                Some("Peru"), Some("Peru"), Some("Peru"),
                None, Some("Burundi"), Some("Burundi"),
                Some("Yemen"),
            ],
            COL::YEAR => &[2019i32, 2020, 2021, 2019, 2020, 2021, 2020],
            COL::POPULATION => &[
                Some(32_000_000.0), None, Some(34_000_000.0),
                Some(11_000_000.0), Some(12_000_000.0), Some(13_000_000.0),
                None,
            ],
        )
        .unwrap()
    }

    #[test]
    fn mean_excludes_missing_values() {
        let summary = population_summary(&records(), WINDOW).unwrap();
        let pe = summary
            .clone()
            .lazy()
            .filter(col(COL::COUNTRY_CODE).eq(lit("PE")))
            .collect()
            .unwrap();
        let population = pe.column(COL::POPULATION).unwrap().f64().unwrap().get(0);
        assert_eq!(
            population,
            Some(33_000_000.0),
            "The missing 2020 figure should not drag the mean down"
        );
    }

    #[test]
    fn all_missing_values_yield_a_null_summary() {
        let summary = population_summary(&records(), WINDOW).unwrap();
        let ye = summary
            .clone()
            .lazy()
            .filter(col(COL::COUNTRY_CODE).eq(lit("YE")))
            .collect()
            .unwrap();
        assert_eq!(
            ye.column(COL::POPULATION).unwrap().f64().unwrap().get(0),
            None,
            "A country with no valid years must stay undefined, not zero"
        );
    }

    #[test]
    fn records_outside_the_window_are_ignored() {
        let mut records = records();
        let extra = df!(
            COL::COUNTRY_CODE => &["PE"],
            COL::COUNTRY_NAME => &[Some("Peru")],
            COL::YEAR => &[2022i32],
            COL::POPULATION => &[Some(99_000_000.0)],
        )
        .unwrap();
        records = records.vstack(&extra).unwrap();
        let summary = population_summary(&records, WINDOW).unwrap();
        let pe = summary
            .clone()
            .lazy()
            .filter(col(COL::COUNTRY_CODE).eq(lit("PE")))
            .collect()
            .unwrap();
        assert_eq!(
            pe.column(COL::POPULATION).unwrap().f64().unwrap().get(0),
            Some(33_000_000.0)
        );
    }

    #[test]
    fn display_name_tie_break_is_lexicographic() {
        let records = df!(
            COL::COUNTRY_CODE => &["XX", "XX"],
            COL::COUNTRY_NAME => &[Some("Zeta Republic"), Some("Alpha Republic")],
            COL::YEAR => &[2019i32, 2020],
            COL::POPULATION => &[Some(1.0), Some(1.0)],
        )
        .unwrap();
        let summary = population_summary(&records, WINDOW).unwrap();
        let name = summary
            .column(COL::COUNTRY_NAME)
            .unwrap()
            .str()
            .unwrap()
            .get(0)
            .map(|s| s.to_string());
        assert_eq!(
            name.as_deref(),
            Some("Alpha Republic"),
            "Tie-break must not depend on input order"
        );
    }
}
