use comfy_table::{presets::NOTHING, *};
use epistat::stats::{AnovaOutcome, CorrelationCell, TukeyComparison};
use epistat::COL;
use itertools::izip;
use polars::prelude::DataFrame;

/// Marker used wherever a value is undefined. Missing must stay visibly
/// missing; it is never rendered as zero.
const MISSING: &str = "NA";

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_style(comfy_table::TableComponent::BottomBorder, '─')
        .set_style(comfy_table::TableComponent::BottomBorderIntersections, '─')
        .set_style(comfy_table::TableComponent::TopBorder, '─')
        .set_style(comfy_table::TableComponent::TopBorderIntersections, '─');
    table
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => MISSING.to_string(),
    }
}

fn fmt_opt_str(value: Option<&str>) -> String {
    value.unwrap_or(MISSING).to_string()
}

/// Render the per-country coverage of the case table.
pub fn display_coverage(coverage: &DataFrame) -> anyhow::Result<()> {
    let mut table = new_table();
    table.set_header(vec![
        header_cell("Code"),
        header_cell("Country"),
        header_cell("Observations"),
        header_cell("First report"),
        header_cell("Last report"),
    ]);
    for (code, name, observations, first, last) in izip!(
        coverage.column(COL::COUNTRY_CODE)?.str()?,
        coverage.column(COL::COUNTRY_NAME)?.str()?,
        coverage.column(COL::OBSERVATIONS)?.u32()?,
        // Note: if using iter on an AnyValue, need to rechunk first.
        coverage.column(COL::FIRST_REPORT)?.rechunk().iter(),
        coverage.column(COL::LAST_REPORT)?.rechunk().iter()
    ) {
        table.add_row(vec![
            fmt_opt_str(code),
            fmt_opt_str(name),
            observations.map_or(MISSING.to_string(), |n| n.to_string()),
            format!("{first}"),
            format!("{last}"),
        ]);
    }
    println!("\n{table}");
    Ok(())
}

/// Render the ten-country analysis table.
pub fn display_analysis(analysis: &DataFrame) -> anyhow::Result<()> {
    let mut table = new_table();
    table.set_header(vec![
        header_cell("Country"),
        header_cell("Cases/100k"),
        header_cell("Deaths/100k"),
        header_cell("CFR/1000"),
        header_cell("GNI pc"),
        header_cell("Health cov."),
        header_cell("Pop. density"),
        header_cell("Income group"),
        header_cell("Density band"),
    ]);
    for (name, cases, deaths, cfr, gni, health, density, income, density_band) in izip!(
        analysis.column(COL::COUNTRY_NAME)?.str()?,
        analysis.column(COL::CASES_PER_100K)?.f64()?,
        analysis.column(COL::DEATHS_PER_100K)?.f64()?,
        analysis.column(COL::CFR_PER_1000)?.f64()?,
        analysis.column(COL::GNI_PER_CAPITA)?.f64()?,
        analysis.column(COL::HEALTH_COVERAGE_INDEX)?.f64()?,
        analysis.column(COL::POPULATION_DENSITY)?.f64()?,
        analysis.column(COL::INCOME_GROUP)?.str()?,
        analysis.column(COL::DENSITY_BAND)?.str()?
    ) {
        table.add_row(vec![
            fmt_opt_str(name),
            fmt_opt(cases, 1),
            fmt_opt(deaths, 1),
            fmt_opt(cfr, 2),
            fmt_opt(gni, 0),
            fmt_opt(health, 2),
            fmt_opt(density, 1),
            fmt_opt_str(income),
            fmt_opt_str(density_band),
        ]);
    }
    println!("\n{table}");
    Ok(())
}

/// Render the omnibus test outcome.
pub fn display_anova(outcome: &AnovaOutcome, significance: f64) {
    match outcome {
        AnovaOutcome::Tested(anova) => {
            let mut table = new_table();
            table
                .add_row(vec![
                    header_cell("F statistic"),
                    Cell::new(format!("{:.4}", anova.f_statistic)),
                ])
                .add_row(vec![
                    header_cell("p value"),
                    Cell::new(format!("{:.6}", anova.p_value)),
                ])
                .add_row(vec![
                    header_cell("Degrees of freedom"),
                    Cell::new(format!("({}, {})", anova.df_between, anova.df_within)),
                ])
                .add_row(vec![
                    header_cell("Decision"),
                    Cell::new(if anova.significant {
                        format!("reject equal means at {significance}")
                    } else {
                        format!("fail to reject at {significance}")
                    }),
                ]);
            for group in &anova.groups {
                table.add_row(vec![
                    header_cell(&group.label),
                    Cell::new(format!("n = {}, mean CFR = {:.2}", group.n, group.mean)),
                ]);
            }
            println!("\nOne-way ANOVA of CFR by income band:\n{table}");
        }
        AnovaOutcome::NotApplicable { group, observations } => {
            println!(
                "\nOne-way ANOVA of CFR by income band: test not applicable. \
                 Group '{group}' has {observations} observation(s), at least 2 are required."
            );
        }
    }
}

/// Render the pairwise post-hoc comparisons.
pub fn display_tukey(comparisons: &[TukeyComparison]) {
    let mut table = new_table();
    table.set_header(vec![
        header_cell("Comparison"),
        header_cell("Mean diff."),
        header_cell("95% CI"),
        header_cell("Adj. p"),
        header_cell("Verdict"),
    ]);
    for comparison in comparisons {
        table.add_row(vec![
            format!("{} vs {}", comparison.group_a, comparison.group_b),
            format!("{:.3}", comparison.mean_difference),
            format!("[{:.3}, {:.3}]", comparison.ci_lower, comparison.ci_upper),
            format!("{:.6}", comparison.adjusted_p),
            if comparison.significant {
                "significant".to_string()
            } else {
                "not significant".to_string()
            },
        ]);
    }
    println!("\nTukey HSD pairwise comparisons:\n{table}");
}

/// Render the indicator-by-measure correlation matrix.
pub fn display_correlations(cells: &[CorrelationCell]) {
    let mut measures: Vec<&str> = Vec::new();
    let mut indicators: Vec<&str> = Vec::new();
    for cell in cells {
        if !measures.contains(&cell.measure.as_str()) {
            measures.push(&cell.measure);
        }
        if !indicators.contains(&cell.indicator.as_str()) {
            indicators.push(&cell.indicator);
        }
    }

    let mut table = new_table();
    let mut header = vec![header_cell("Indicator")];
    header.extend(measures.iter().map(|m| header_cell(m)));
    table.set_header(header);

    for indicator in &indicators {
        let mut row = vec![indicator.to_string()];
        for measure in &measures {
            let cell = cells
                .iter()
                .find(|c| c.indicator == *indicator && c.measure == *measure);
            row.push(match cell.and_then(|c| c.estimate) {
                Some(estimate) => format!("r = {:.3} (n = {})", estimate.r, estimate.n),
                None => MISSING.to_string(),
            });
        }
        table.add_row(row);
    }
    println!("\nPearson correlations (pairwise complete):\n{table}");
}
