//! This module stores the column names used across all of the pipeline
//! dataframes. Note that the source-table names must be synchronised with the
//! headers of the input CSV files!

// Source: case table
pub const COUNTRY_CODE: &str = "country_code";
pub const COUNTRY_NAME: &str = "country_name";
pub const REPORT_DATE: &str = "report_date";
pub const CUMULATIVE_CASES: &str = "cumulative_cases";
pub const CUMULATIVE_DEATHS: &str = "cumulative_deaths";

// Source: indicator table
pub const YEAR: &str = "year";
pub const POPULATION: &str = "population";
pub const GNI_PER_CAPITA: &str = "gni_per_capita";
pub const HEALTH_COVERAGE_INDEX: &str = "health_coverage_index";
pub const POPULATION_DENSITY: &str = "population_density";

// Derived: snapshots and rates
pub const TOTAL_CASES: &str = "total_cases";
pub const TOTAL_DEATHS: &str = "total_deaths";
pub const CASES_PER_100K: &str = "cases_per_100k";
pub const DEATHS_PER_100K: &str = "deaths_per_100k";

// Derived: analysis table
pub const CFR_PER_1000: &str = "cfr_per_1000";
pub const INCOME_GROUP: &str = "income_group";
pub const INCOME_BAND: &str = "income_band";
pub const DENSITY_BAND: &str = "density_band";

// Derived: coverage summary
pub const OBSERVATIONS: &str = "observations";
pub const FIRST_REPORT: &str = "first_report";
pub const LAST_REPORT: &str = "last_report";
