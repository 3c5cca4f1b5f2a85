use anyhow::Result;
use chrono::NaiveDate;
use meter_pipeline::{PipelineReport, YearSummary};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    summaries: Vec<&'a YearSummary>,
    warnings: Vec<String>,
}

fn by_year(report: &PipelineReport) -> BTreeMap<i32, Vec<&YearSummary>> {
    let mut years: BTreeMap<i32, Vec<&YearSummary>> = BTreeMap::new();
    for summary in report.summaries() {
        years.entry(summary.year).or_default().push(summary);
    }
    years
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d.%m.%Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// One line per utility and year, plus the covered date range.
pub fn summary_lines(report: &PipelineReport) -> Vec<String> {
    let mut lines = Vec::new();
    for (year, summaries) in by_year(report) {
        lines.push(format!("Consumption for {}:", year));
        for summary in summaries {
            let mut line = format!(
                " {}: {:.1} {}",
                summary.utility.file_stem(),
                summary.consumption,
                summary.unit
            );
            if let Some(cost) = summary.cost {
                line.push_str(&format!(" ({:.2} EUR)", cost));
            }
            lines.push(line);
            lines.push(format!(
                "  from {} to {}",
                format_date(summary.first_day),
                format_date(summary.last_day)
            ));
        }
    }
    lines
}

pub fn print_summary(report: &PipelineReport) {
    println!("\n📊 Utility Consumption Summary");
    println!("{}", "=".repeat(60));
    for line in summary_lines(report) {
        println!("{}", line);
    }

    if !report.warnings.is_empty() {
        println!("\n⚠️  {} warning(s):", report.warnings.len());
        for warning in &report.warnings {
            println!("  {}", warning);
        }
    }
}

pub fn print_json(report: &PipelineReport) -> Result<()> {
    let json = JsonReport {
        summaries: report.summaries().collect(),
        warnings: report.warnings.iter().map(|w| w.to_string()).collect(),
    };
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

pub fn csv_lines(report: &PipelineReport) -> Vec<String> {
    let mut lines = vec!["Utility,Year,Consumption,Unit,Cost,From,To".to_string()];
    for summary in report.summaries() {
        lines.push(format!(
            "{},{},{:.2},{},{},{},{}",
            summary.utility,
            summary.year,
            summary.consumption,
            summary.unit,
            summary.cost.map(|c| format!("{:.2}", c)).unwrap_or_default(),
            summary.first_day.map(|d| d.to_string()).unwrap_or_default(),
            summary.last_day.map(|d| d.to_string()).unwrap_or_default(),
        ));
    }
    lines
}

pub fn print_csv(report: &PipelineReport) {
    for line in csv_lines(report) {
        println!("{}", line);
    }
}
