use log::debug;
use polars::frame::DataFrame;
use polars::prelude::*;

use crate::config::Config;
use crate::error::Result;
use crate::ingest::SourceTables;
use crate::stats::StudyReport;
use crate::study::StudyDesign;

// Re-exports
pub use column_names as COL;

// Modules
pub mod aggregate;
pub mod analysis;
pub mod column_names;
pub mod config;
pub mod error;
pub mod formatters;
pub mod ingest;
pub mod population;
pub mod rates;
pub mod stats;
pub mod study;

/// Type for the epistat pipeline and API: the loaded source tables plus the
/// configuration and frozen study design they are analysed under.
pub struct Epistat {
    pub tables: SourceTables,
    pub config: Config,
    pub study: StudyDesign,
}

impl Epistat {
    /// Setup the Epistat object with default configuration
    pub fn new() -> Result<Self> {
        Self::new_with_config(Config::default())
    }

    /// Setup the Epistat object with custom configuration. Both source
    /// tables are loaded and validated here, before any computation runs.
    pub fn new_with_config(config: Config) -> Result<Self> {
        debug!("config: {config:?}");
        let tables = ingest::load_all(&config)?;
        Ok(Self {
            tables,
            config,
            study: StudyDesign::default(),
        })
    }

    /// Construct the pipeline directly from already-loaded tables.
    pub fn from_tables(tables: SourceTables, config: Config, study: StudyDesign) -> Self {
        Self {
            tables,
            config,
            study,
        }
    }

    /// Per-country observation coverage of the case table.
    pub fn coverage(&self) -> Result<DataFrame> {
        let coverage = self
            .tables
            .cases
            .clone()
            .lazy()
            .group_by([col(COL::COUNTRY_CODE)])
            .agg([
                col(COL::COUNTRY_NAME)
                    .drop_nulls()
                    .sort(SortOptions::default())
                    .first()
                    .alias(COL::COUNTRY_NAME),
                len().alias(COL::OBSERVATIONS),
                col(COL::REPORT_DATE).min().alias(COL::FIRST_REPORT),
                col(COL::REPORT_DATE).max().alias(COL::LAST_REPORT),
            ])
            .sort([COL::COUNTRY_CODE], SortMultipleOptions::default())
            .collect()?;
        Ok(coverage)
    }

    /// The full per-country rate table: terminal case/death snapshots joined
    /// onto windowed population summaries, with per-100k rates.
    pub fn country_rates(&self) -> Result<DataFrame> {
        let snapshots = aggregate::case_snapshots(&self.tables.cases, self.study.cutoff)?;
        let population =
            population::population_summary(&self.tables.indicators, self.study.window)?;
        rates::country_rates(&population, &snapshots)
    }

    /// The ten-country analysis table with indicators and derived categories.
    pub fn analysis_table(&self) -> Result<DataFrame> {
        analysis::analysis_table(
            &self.country_rates()?,
            &self.tables.indicators,
            &self.study,
        )
    }

    /// The analysis table plus the inferential results.
    pub fn study_report(&self) -> Result<StudyReport> {
        stats::run_study(&self.analysis_table()?, &self.study)
    }
}
