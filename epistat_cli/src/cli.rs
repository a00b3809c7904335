use std::path::Path;
use std::{fs::File, io};

use anyhow::Context;
use clap::{command, Args, Parser, Subcommand};
use enum_dispatch::enum_dispatch;
use epistat::{
    config::Config,
    formatters::{CSVFormatter, JsonFormatter, OutputFormatter, OutputGenerator},
    Epistat,
};
use log::info;
use polars::frame::DataFrame;
use serde::{Deserialize, Serialize};
use serde_json::json;
use spinners::{Spinner, Spinners};
use strum_macros::EnumString;

use crate::display::{
    display_analysis, display_anova, display_correlations, display_coverage, display_tukey,
};
use crate::error::EpistatCliResult;

const DEFAULT_PROGRESS_SPINNER: Spinners = Spinners::Dots;
const COMPLETE_PROGRESS_STRING: &str = "✔";
const RUNNING_TAIL_STRING: &str = "...";
const LOADING_STRING: &str = "Loading and validating source tables";

/// Defines the output formats we are able to produce data in.
#[derive(Clone, Debug, Deserialize, Serialize, EnumString, PartialEq, Eq)]
#[strum(ascii_case_insensitive)]
pub enum OutputFormat {
    Csv,
    Json,
    Stdout,
}

impl From<&OutputFormat> for OutputFormatter {
    fn from(value: &OutputFormat) -> Self {
        match value {
            OutputFormat::Csv => OutputFormatter::Csv(CSVFormatter),
            OutputFormat::Json => OutputFormatter::Json(JsonFormatter),
            OutputFormat::Stdout => OutputFormatter::Csv(CSVFormatter),
        }
    }
}

fn write_output<T, U>(
    output_generator: T,
    mut data: DataFrame,
    output_file: Option<U>,
) -> EpistatCliResult<()>
where
    T: OutputGenerator,
    U: AsRef<Path>,
{
    if let Some(output_file) = output_file {
        let mut f = File::create(output_file).context("Failed to write output")?;
        output_generator.save(&mut f, &mut data)?;
    } else {
        let mut stdout_lock = io::stdout().lock();
        output_generator.save(&mut stdout_lock, &mut data)?;
    };
    Ok(())
}

/// Load and validate the source tables, with a progress spinner unless the
/// CLI runs quiet. Validation failures surface here, before any command
/// computes anything.
fn load_pipeline(config: Config, quiet: bool) -> EpistatCliResult<Epistat> {
    let sp = (!quiet).then(|| {
        Spinner::with_timer(
            DEFAULT_PROGRESS_SPINNER,
            LOADING_STRING.to_string() + RUNNING_TAIL_STRING,
        )
    });
    let epistat = Epistat::new_with_config(config)?;
    if let Some(mut s) = sp {
        s.stop_with_symbol(COMPLETE_PROGRESS_STRING);
    }
    Ok(epistat)
}

/// Trait that defines what to run when a given subcommand is invoked.
#[enum_dispatch]
pub trait RunCommand {
    fn run(&self, config: Config) -> EpistatCliResult<()>;
}

/// The Countries command reports the per-country observation coverage of the
/// case table: number of reports and the reporting period.
#[derive(Args, Debug)]
pub struct CountriesCommand {
    #[arg(from_global)]
    quiet: bool,
}

impl RunCommand for CountriesCommand {
    fn run(&self, config: Config) -> EpistatCliResult<()> {
        info!("Running `countries` subcommand");
        let epistat = load_pipeline(config, self.quiet)?;
        let coverage = epistat.coverage()?;
        println!("\nThe case table covers the following countries:");
        display_coverage(&coverage)?;
        Ok(())
    }
}

/// The Rates command outputs the full per-country rate table in the
/// requested format.
#[derive(Args, Debug)]
pub struct RatesCommand {
    #[arg(
        short = 'f',
        long,
        value_name = "csv|json",
        help = "Output format for the results",
        default_value = "stdout"
    )]
    output_format: OutputFormat,
    #[arg(short = 'o', long, help = "Output file to place the results")]
    output_file: Option<String>,
    #[arg(from_global)]
    quiet: bool,
}

impl RunCommand for RatesCommand {
    fn run(&self, config: Config) -> EpistatCliResult<()> {
        info!("Running `rates` subcommand");
        let epistat = load_pipeline(config, self.quiet)?;
        let rates = epistat.country_rates()?;
        let formatter: OutputFormatter = (&self.output_format).into();
        write_output(formatter, rates, self.output_file.as_deref())?;
        Ok(())
    }
}

/// The Analysis command outputs the ten-country analysis table in the
/// requested format.
#[derive(Args, Debug)]
pub struct AnalysisCommand {
    #[arg(
        short = 'f',
        long,
        value_name = "csv|json",
        help = "Output format for the results",
        default_value = "stdout"
    )]
    output_format: OutputFormat,
    #[arg(short = 'o', long, help = "Output file to place the results")]
    output_file: Option<String>,
    #[arg(from_global)]
    quiet: bool,
}

impl RunCommand for AnalysisCommand {
    fn run(&self, config: Config) -> EpistatCliResult<()> {
        info!("Running `analysis` subcommand");
        let epistat = load_pipeline(config, self.quiet)?;
        let analysis = epistat.analysis_table()?;
        let formatter: OutputFormatter = (&self.output_format).into();
        write_output(formatter, analysis, self.output_file.as_deref())?;
        Ok(())
    }
}

/// The Report command renders the full study: the analysis table, the
/// omnibus ANOVA, the post-hoc comparisons (when the omnibus test is
/// significant) and the correlation matrix.
#[derive(Args, Debug)]
pub struct ReportCommand {
    #[arg(
        short = 'o',
        long,
        help = "Additionally write the full report as a JSON document to this file"
    )]
    output_file: Option<String>,
    #[arg(from_global)]
    quiet: bool,
}

impl RunCommand for ReportCommand {
    fn run(&self, config: Config) -> EpistatCliResult<()> {
        info!("Running `report` subcommand");
        let epistat = load_pipeline(config, self.quiet)?;
        let report = epistat.study_report()?;

        display_analysis(&report.analysis)?;
        display_anova(&report.stats.anova, epistat.study.significance);
        match &report.stats.tukey {
            Some(comparisons) => display_tukey(comparisons),
            None => println!("\nNo post-hoc comparisons: the omnibus test did not reject."),
        }
        display_correlations(&report.stats.correlations);

        if let Some(output_file) = self.output_file.as_deref() {
            let document = json!({
                "analysis": epistat::formatters::rows_to_json(&report.analysis)?,
                "stats": report.stats,
            });
            let mut f = File::create(output_file).context("Failed to write report")?;
            serde_json::to_writer_pretty(&mut f, &document)?;
            println!("\nFull report written to {output_file}");
        }
        Ok(())
    }
}

/// The entrypoint for the CLI.
#[derive(Parser, Debug)]
#[command(version, about="Epistat joins COVID-19 outcomes with socioeconomic indicators per country!", long_about = None, name="epistat")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    #[arg(
        short = 'q',
        long = "quiet",
        help = "\
            Do not print progress bar to stdout. Results and logs (when `RUST_LOG`\n\
            is set) will still be printed.",
        global = true
    )]
    quiet: bool,
}

/// Commands contains the list of subcommands avaliable for use in the CLI.
/// Each command should implmement the RunCommand trait and specify the list
/// of required args for that command.
#[derive(Subcommand, Debug)]
#[enum_dispatch(RunCommand)]
pub enum Commands {
    /// List countries covered by the case table
    Countries(CountriesCommand),
    /// Output the full per-country rate table
    Rates(RatesCommand),
    /// Output the ten-country analysis table
    Analysis(AnalysisCommand),
    /// Render the full study report
    Report(ReportCommand),
}
