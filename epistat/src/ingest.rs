//! Loading and validation of the two source tables.
//!
//! All structural problems are surfaced here, before any pipeline stage
//! runs: a missing column, an unparseable date or a non-numeric count is a
//! fatal error. Empty cells are missing values and are tolerated; they
//! propagate as nulls through the downstream aggregations.

use log::info;
use polars::prelude::*;

use crate::config::Config;
use crate::error::{EpistatError, Result};
use crate::COL;

/// Names of the source tables, used in error messages.
pub mod tables {
    pub const CASES: &str = "cases";
    pub const INDICATORS: &str = "indicators";
}

/// The two materialized inputs of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTables {
    pub cases: DataFrame,
    pub indicators: DataFrame,
}

/// Load and validate both source tables for the given configuration.
pub fn load_all(config: &Config) -> Result<SourceTables> {
    Ok(SourceTables {
        cases: load_case_table(&config.case_table_path)?,
        indicators: load_indicator_table(&config.indicator_table_path)?,
    })
}

/// Load the per-country, per-date cumulative case/death table.
pub fn load_case_table(path: &str) -> Result<DataFrame> {
    info!("Loading case table from {path}");
    let df = read_csv(path)?;
    require_columns(
        &df,
        tables::CASES,
        &[
            COL::COUNTRY_CODE,
            COL::COUNTRY_NAME,
            COL::REPORT_DATE,
            COL::CUMULATIVE_CASES,
            COL::CUMULATIVE_DEATHS,
        ],
    )?;
    df.lazy()
        .with_columns([
            col(COL::REPORT_DATE).str().to_date(date_options()),
            col(COL::CUMULATIVE_CASES).strict_cast(DataType::Int64),
            col(COL::CUMULATIVE_DEATHS).strict_cast(DataType::Int64),
        ])
        .collect()
        .map_err(|e| malformed(tables::CASES, path, e))
}

/// Load the per-country, per-year indicator table (wide layout: one column
/// per indicator series).
pub fn load_indicator_table(path: &str) -> Result<DataFrame> {
    info!("Loading indicator table from {path}");
    let df = read_csv(path)?;
    require_columns(
        &df,
        tables::INDICATORS,
        &[
            COL::COUNTRY_CODE,
            COL::COUNTRY_NAME,
            COL::YEAR,
            COL::POPULATION,
            COL::GNI_PER_CAPITA,
            COL::HEALTH_COVERAGE_INDEX,
            COL::POPULATION_DENSITY,
        ],
    )?;
    df.lazy()
        .with_columns([
            col(COL::YEAR).strict_cast(DataType::Int32),
            col(COL::POPULATION).strict_cast(DataType::Float64),
            col(COL::GNI_PER_CAPITA).strict_cast(DataType::Float64),
            col(COL::HEALTH_COVERAGE_INDEX).strict_cast(DataType::Float64),
            col(COL::POPULATION_DENSITY).strict_cast(DataType::Float64),
        ])
        .collect()
        .map_err(|e| malformed(tables::INDICATORS, path, e))
}

fn read_csv(path: &str) -> Result<DataFrame> {
    Ok(LazyCsvReader::new(path)
        .with_has_header(true)
        .finish()?
        .collect()?)
}

fn require_columns(df: &DataFrame, table: &str, columns: &[&str]) -> Result<()> {
    for column in columns {
        if df.column(column).is_err() {
            return Err(EpistatError::MissingColumn {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

fn date_options() -> StrptimeOptions {
    StrptimeOptions {
        format: Some("%Y-%m-%d".into()),
        strict: true,
        exact: true,
        cache: false,
    }
}

fn malformed(table: &str, path: &str, e: PolarsError) -> EpistatError {
    EpistatError::MalformedSource(format!("table '{table}' at '{path}': {e}"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn case_table_loads_with_typed_columns() {
        let file = write_csv(
            "country_code,country_name,report_date,cumulative_cases,cumulative_deaths\n\
             PE,Peru,2021-01-01,100,2\n\
             PE,Peru,2021-01-02,150,3\n",
        );
        let df = load_case_table(file.path().to_str().unwrap()).unwrap();
        assert_eq!(df.shape(), (2, 5));
        assert_eq!(df.column(COL::REPORT_DATE).unwrap().dtype(), &DataType::Date);
        assert_eq!(
            df.column(COL::CUMULATIVE_CASES).unwrap().dtype(),
            &DataType::Int64
        );
    }

    #[test]
    fn missing_column_is_fatal() {
        let file = write_csv("country_code,report_date\nPE,2021-01-01\n");
        let err = load_case_table(file.path().to_str().unwrap()).unwrap_err();
        match err {
            EpistatError::MissingColumn { table, column } => {
                assert_eq!(table, tables::CASES);
                assert_eq!(column, COL::COUNTRY_NAME);
            }
            other => panic!("Expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_date_is_fatal() {
        let file = write_csv(
            "country_code,country_name,report_date,cumulative_cases,cumulative_deaths\n\
             PE,Peru,not-a-date,100,2\n",
        );
        let err = load_case_table(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, EpistatError::MalformedSource(_)));
    }

    #[test]
    fn non_numeric_count_is_fatal() {
        let file = write_csv(
            "country_code,country_name,report_date,cumulative_cases,cumulative_deaths\n\
             PE,Peru,2021-01-01,many,2\n",
        );
        let err = load_case_table(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, EpistatError::MalformedSource(_)));
    }

    #[test]
    fn empty_indicator_cells_become_nulls() {
        let file = write_csv(
            "country_code,country_name,year,population,gni_per_capita,health_coverage_index,population_density\n\
             PE,Peru,2019,32000000,,0.77,25.0\n\
             PE,Peru,2020,,6100,0.78,25.1\n",
        );
        let df = load_indicator_table(file.path().to_str().unwrap()).unwrap();
        assert_eq!(df.column(COL::GNI_PER_CAPITA).unwrap().null_count(), 1);
        assert_eq!(df.column(COL::POPULATION).unwrap().null_count(), 1);
    }
}
