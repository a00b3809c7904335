//! Joining snapshots onto population summaries and deriving normalized
//! epidemiological rates.

use log::debug;
use polars::prelude::*;

use crate::error::Result;
use crate::COL;

/// Attach case/death snapshots to the population summaries and derive the
/// per-100k rates.
///
/// The join is a left join keyed on country code: every population row is
/// retained, and snapshot columns are null where a country has no snapshot.
/// A rate is null whenever the population is null or zero; the guard is
/// explicit so an undefined rate propagates as a missing value instead of a
/// division-by-zero infinity.
pub fn country_rates(population: &DataFrame, snapshots: &DataFrame) -> Result<DataFrame> {
    debug!(
        "Joining {} snapshots onto {} population summaries",
        snapshots.height(),
        population.height()
    );
    let rates = population
        .clone()
        .lazy()
        .join(
            snapshots.clone().lazy(),
            [col(COL::COUNTRY_CODE)],
            [col(COL::COUNTRY_CODE)],
            JoinArgs::new(JoinType::Left),
        )
        .with_columns([
            per_100k(COL::TOTAL_CASES).alias(COL::CASES_PER_100K),
            per_100k(COL::TOTAL_DEATHS).alias(COL::DEATHS_PER_100K),
        ])
        .sort([COL::COUNTRY_CODE], SortMultipleOptions::default())
        .collect()?;
    Ok(rates)
}

fn per_100k(count_column: &str) -> Expr {
    when(
        col(COL::POPULATION)
            .is_null()
            .or(col(COL::POPULATION).eq(lit(0.0))),
    )
    .then(lit(NULL))
    .otherwise(
        col(count_column).cast(DataType::Float64) / col(COL::POPULATION) * lit(100_000.0),
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::aggregate::case_snapshots;

    fn population() -> DataFrame {
        df!(
            COL::COUNTRY_CODE => &["BI", "PE", "YE", "ZZ"],
            COL::COUNTRY_NAME => &["Burundi", "Peru", "Yemen", "Nowhere"],
            COL::POPULATION => &[Some(12_000_000.0), Some(33_000_000.0), None, Some(0.0)],
        )
        .unwrap()
    }

    fn snapshots() -> DataFrame {
        df!(
            COL::COUNTRY_CODE => &["BI", "PE", "YE", "ZZ"],
            COL::TOTAL_CASES => &[15i64, 200, 10, 10],
            COL::TOTAL_DEATHS => &[1i64, 9, 2, 2],
        )
        .unwrap()
    }

    fn rate(df: &DataFrame, code: &str, column: &str) -> Option<f64> {
        df.clone()
            .lazy()
            .filter(col(COL::COUNTRY_CODE).eq(lit(code)))
            .collect()
            .unwrap()
            .column(column)
            .unwrap()
            .f64()
            .unwrap()
            .get(0)
    }

    #[test]
    fn every_population_row_is_retained() {
        let only_pe = snapshots()
            .lazy()
            .filter(col(COL::COUNTRY_CODE).eq(lit("PE")))
            .collect()
            .unwrap();
        let rates = country_rates(&population(), &only_pe).unwrap();
        assert_eq!(rates.height(), 4, "Left join must not drop population rows");
        assert_eq!(
            rate(&rates, "BI", COL::CASES_PER_100K),
            None,
            "A join-miss leaves the rate undefined"
        );
    }

    #[test]
    fn rates_are_undefined_for_null_or_zero_population() {
        let rates = country_rates(&population(), &snapshots()).unwrap();
        assert_eq!(rate(&rates, "YE", COL::CASES_PER_100K), None);
        assert_eq!(rate(&rates, "ZZ", COL::CASES_PER_100K), None);
        assert_eq!(rate(&rates, "ZZ", COL::DEATHS_PER_100K), None);
    }

    #[test]
    fn defined_rates_are_non_negative_and_exact() {
        let rates = country_rates(&population(), &snapshots()).unwrap();
        let bi = rate(&rates, "BI", COL::CASES_PER_100K).unwrap();
        assert!((bi - 0.125).abs() < 1e-12);
        assert!(rate(&rates, "PE", COL::DEATHS_PER_100K).unwrap() >= 0.0);
    }

    /// Minimal two-country end-to-end scenario: cumulative values
    /// [100, 100, 200] for A and [50] for B, population one million for both.
    #[test]
    fn aggregator_and_joiner_compose() {
        fn date(s: &str) -> NaiveDate {
            s.parse().unwrap()
        }
        let cases = df!(
            COL::COUNTRY_CODE => &["AA", "AA", "AA", "BB"],
            COL::REPORT_DATE => &[
                date("2021-01-01"), date("2021-02-01"), date("2021-03-01"),
                date("2021-01-01"),
            ],
            COL::CUMULATIVE_CASES => &[100i64, 100, 200, 50],
            COL::CUMULATIVE_DEATHS => &[0i64, 0, 0, 0],
        )
        .unwrap();
        let population = df!(
            COL::COUNTRY_CODE => &["AA", "BB"],
            COL::COUNTRY_NAME => &["Aland", "Bland"],
            COL::POPULATION => &[1_000_000.0, 1_000_000.0],
        )
        .unwrap();

        let snapshots = case_snapshots(&cases, date("2021-12-31")).unwrap();
        let rates = country_rates(&population, &snapshots).unwrap();

        let total_cases_a = rates
            .clone()
            .lazy()
            .filter(col(COL::COUNTRY_CODE).eq(lit("AA")))
            .collect()
            .unwrap()
            .column(COL::TOTAL_CASES)
            .unwrap()
            .i64()
            .unwrap()
            .get(0);
        assert_eq!(total_cases_a, Some(200));
        assert_eq!(rate(&rates, "AA", COL::CASES_PER_100K), Some(20.0));
        assert_eq!(rate(&rates, "BB", COL::CASES_PER_100K), Some(5.0));
    }
}
