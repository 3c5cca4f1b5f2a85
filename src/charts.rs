use anyhow::Result;
use chrono::{Duration, NaiveDate};
use log::{info, warn};
use meter_pipeline::{DailySeries, UtilityReport, YearlyMatrix};
use plotters::prelude::*;
use std::path::{Path, PathBuf};

pub struct ChartRenderer {
    output_dir: PathBuf,
}

impl ChartRenderer {
    pub fn new(output_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(output_dir)?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Renders every chart of one utility and returns the written paths.
    pub fn render_utility(&self, report: &UtilityReport) -> Result<Vec<PathBuf>> {
        let stem = report.utility.file_stem();
        let unit = report.utility.unit();
        let mut written = Vec::new();

        let legend: Vec<String> = report
            .summaries
            .iter()
            .map(|s| format!("{} ({:.0} {})", s.year, s.consumption, unit))
            .collect();
        let path = self.output_dir.join(format!("{}_verbrauch.png", stem));
        render_monthly_bars(
            &path,
            &format!("Verbrauch {}", title_case(stem)),
            &format!("[{}]", unit),
            &report.consumption_matrix,
            &legend,
        )?;
        written.push(path);

        match &report.cost_matrix {
            Some(matrix) if !matrix.is_empty() => {
                let legend: Vec<String> = matrix
                    .years()
                    .iter()
                    .map(|year| format!("{} ({:.0} EUR)", year, matrix.year_total(*year)))
                    .collect();
                let path = self.output_dir.join(format!("{}_kosten.png", stem));
                render_monthly_bars(
                    &path,
                    &format!("Kosten {}", title_case(stem)),
                    "[EUR]",
                    matrix,
                    &legend,
                )?;
                written.push(path);
            }
            _ => info!("{}: no cost data, skipping cost chart", report.utility),
        }

        if report.raw.is_empty() {
            warn!("{}: no readings, skipping daily charts", report.utility);
            return Ok(written);
        }

        let path = self.output_dir.join(format!("{}_ablesungen.png", stem));
        render_readings(
            &path,
            &format!("Ablesungen {}", title_case(stem)),
            &report.raw,
            &report.interpolated,
        )?;
        written.push(path);

        let path = self.output_dir.join(format!("{}_taeglich.png", stem));
        render_daily(
            &path,
            &format!("Tagesverbrauch {}", title_case(stem)),
            &report.deltas,
        )?;
        written.push(path);

        Ok(written)
    }
}

/// Grouped bars: one group per month, one bar per year.
fn render_monthly_bars(
    output_path: &Path,
    title: &str,
    y_desc: &str,
    matrix: &YearlyMatrix,
    legend: &[String],
) -> Result<()> {
    let root = BitMapBackend::new(output_path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let (lo, hi) = matrix.value_range().unwrap_or((0.0, 0.0));
    let (y_min, y_max) = padded_range(lo.min(0.0), hi.max(0.0));

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0.5f64..12.5f64, y_min..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(12)
        .x_label_formatter(&|x| {
            if (x - x.round()).abs() < 1e-6 {
                format!("{:02}", x.round() as i64)
            } else {
                String::new()
            }
        })
        .x_desc("Month")
        .y_desc(y_desc)
        .draw()?;

    let years = matrix.years();
    let width = 0.8 / years.len().max(1) as f64;

    for (idx, year) in years.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        let offset = idx as f64 * width - 0.4;
        let label = legend.get(idx).cloned().unwrap_or_else(|| year.to_string());

        chart
            .draw_series(matrix.column(*year).into_iter().map(|(month, value)| {
                let x0 = month as f64 + offset;
                Rectangle::new([(x0, 0.0), (x0 + width, value)], color.filled())
            }))?
            .label(label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    if !years.is_empty() {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }

    root.present()?;
    info!("Saved {}", output_path.display());
    Ok(())
}

/// Interpolated line against the raw readings as markers.
fn render_readings(
    output_path: &Path,
    title: &str,
    raw: &DailySeries,
    interpolated: &DailySeries,
) -> Result<()> {
    let root = BitMapBackend::new(output_path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let (min_date, max_date) = date_range(raw);
    let (y_min, y_max) = value_range(raw.known().chain(interpolated.known()).map(|(_, v)| v));

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30).into_font())
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(min_date..max_date, y_min..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Date")
        .draw()?;

    chart
        .draw_series(LineSeries::new(interpolated.known(), &BLUE))?
        .label("interpoliert")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], &BLUE));

    chart
        .draw_series(
            raw.known()
                .map(|(date, value)| Cross::new((date, value), 4, RED.stroke_width(2))),
        )?
        .label("Ablesung")
        .legend(|(x, y)| Cross::new((x + 5, y), 4, RED.stroke_width(2)));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    info!("Saved {}", output_path.display());
    Ok(())
}

fn render_daily(output_path: &Path, title: &str, deltas: &DailySeries) -> Result<()> {
    let root = BitMapBackend::new(output_path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let (min_date, max_date) = date_range(deltas);
    let (y_min, y_max) = value_range(deltas.known().map(|(_, v)| v));

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30).into_font())
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(min_date..max_date, y_min..y_max)?;

    chart.configure_mesh().x_desc("Date").draw()?;
    chart.draw_series(LineSeries::new(deltas.known(), &GREEN))?;

    root.present()?;
    info!("Saved {}", output_path.display());
    Ok(())
}

fn title_case(stem: &str) -> String {
    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Calendar bounds, widened to at least one day so the axis is never empty.
fn date_range(series: &DailySeries) -> (NaiveDate, NaiveDate) {
    let start = series.start().unwrap_or_default();
    let end = series.end().unwrap_or(start);
    if end > start {
        (start, end)
    } else {
        (start, start + Duration::days(1))
    }
}

fn value_range<I: Iterator<Item = f64>>(values: I) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if lo.is_finite() && hi.is_finite() {
        padded_range(lo, hi)
    } else {
        (0.0, 1.0)
    }
}

fn padded_range(lo: f64, hi: f64) -> (f64, f64) {
    let span = hi - lo;
    if span <= f64::EPSILON {
        let pad = if lo.abs() > 1.0 { lo.abs() * 0.05 } else { 1.0 };
        return (lo - pad, hi + pad);
    }
    let pad = span * 0.05;
    (lo - pad, hi + pad)
}
