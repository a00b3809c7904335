//! Reduction of the case time-series to one terminal snapshot per country.

use chrono::NaiveDate;
use log::debug;
use polars::prelude::*;

use crate::error::Result;
use crate::COL;

/// Reduce the per-date cumulative observations to one `CountrySnapshot` row
/// per country code: the maximum cumulative case and death counts observed
/// on or before `cutoff`. The counters are cumulative and non-decreasing, so
/// the maximum is the most recent retained value.
///
/// A country with no observations before the cutoff has no row in the
/// output.
pub fn case_snapshots(cases: &DataFrame, cutoff: NaiveDate) -> Result<DataFrame> {
    debug!("Aggregating case snapshots with cutoff {cutoff}");
    let snapshots = cases
        .clone()
        .lazy()
        .filter(col(COL::REPORT_DATE).lt_eq(lit(cutoff)))
        .group_by([col(COL::COUNTRY_CODE)])
        .agg([
            col(COL::CUMULATIVE_CASES).max().alias(COL::TOTAL_CASES),
            col(COL::CUMULATIVE_DEATHS).max().alias(COL::TOTAL_DEATHS),
        ])
        .sort([COL::COUNTRY_CODE], SortMultipleOptions::default())
        .collect()?;
    Ok(snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cutoff() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 12, 31).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn observations() -> DataFrame {
        df!(
            COL::COUNTRY_CODE => &["PE", "PE", "PE", "BI", "BI"],
            COL::REPORT_DATE => &[
                date("2021-01-01"), date("2021-06-01"), date("2022-06-01"),
                date("2021-01-01"), date("2021-06-01"),
            ],
            COL::CUMULATIVE_CASES => &[100i64, 200, 900, 10, 15],
            COL::CUMULATIVE_DEATHS => &[5i64, 9, 40, 0, 1],
        )
        .unwrap()
    }

    #[test]
    fn snapshot_is_the_maximum_within_the_cutoff() {
        let snapshots = case_snapshots(&observations(), cutoff()).unwrap();
        assert_eq!(snapshots.shape(), (2, 3));
        // Sorted by country code: BI first
        let cases: Vec<Option<i64>> = snapshots
            .column(COL::TOTAL_CASES)
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(
            cases,
            vec![Some(15), Some(200)],
            "The 2022 observation for PE should be excluded by the cutoff"
        );
    }

    #[test]
    fn country_with_no_retained_observations_is_absent() {
        let snapshots =
            case_snapshots(&observations(), date("2020-12-31")).unwrap();
        assert_eq!(
            snapshots.height(),
            0,
            "No observation falls before the cutoff, so no snapshot is emitted"
        );
    }

    #[test]
    fn snapshot_covers_every_observation() {
        let obs = observations();
        let snapshots = case_snapshots(&obs, cutoff()).unwrap();
        let max_pe: i64 = snapshots
            .clone()
            .lazy()
            .filter(col(COL::COUNTRY_CODE).eq(lit("PE")))
            .collect()
            .unwrap()
            .column(COL::TOTAL_CASES)
            .unwrap()
            .i64()
            .unwrap()
            .get(0)
            .unwrap();
        for observed in [100i64, 200] {
            assert!(max_pe >= observed);
        }
    }
}
