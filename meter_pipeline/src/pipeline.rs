use crate::aggregate::{monthly_tariff, sum_by_month};
use crate::config::PipelineConfig;
use crate::cost::join_costs;
use crate::data_loader::RangeSource;
use crate::difference::{difference, Deltas};
use crate::error::{PipelineWarning, Result};
use crate::interpolate::{forward_fill, interpolate_linear};
use crate::models::{
    DailySeries, MonthlyCost, MonthlySeries, Reading, TariffEntry, TariffRate, Utility,
};
use crate::pivot::{summarize_years, YearSummary, YearlyMatrix};
use crate::resample::resample_daily;
use crate::table::{RawTable, Table};
use chrono::NaiveDate;
use log::{debug, info, warn};

/// Every intermediate and final series of one utility.
#[derive(Debug, Clone)]
pub struct UtilityReport {
    pub utility: Utility,
    /// Daily means of the raw readings, gaps still missing.
    pub raw: DailySeries,
    pub interpolated: DailySeries,
    /// Daily consumption in meter units.
    pub deltas: DailySeries,
    /// Monthly consumption in reporting units (gas converted to kWh).
    pub consumption: MonthlySeries<f64>,
    /// `None` when the tariff table carries no rate at all.
    pub costs: Option<MonthlySeries<MonthlyCost>>,
    pub consumption_matrix: YearlyMatrix,
    pub cost_matrix: Option<YearlyMatrix>,
    pub summaries: Vec<YearSummary>,
}

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub utilities: Vec<UtilityReport>,
    pub warnings: Vec<PipelineWarning>,
}

impl PipelineReport {
    pub fn utility(&self, utility: Utility) -> Option<&UtilityReport> {
        self.utilities.iter().find(|r| r.utility == utility)
    }

    pub fn summaries(&self) -> impl Iterator<Item = &YearSummary> {
        self.utilities.iter().flat_map(|r| r.summaries.iter())
    }
}

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Fetches and parses all four tables, then runs each utility through
    /// the stages. Fetch and parse errors abort before anything is computed.
    pub fn run(&self, source: &dyn RangeSource) -> Result<PipelineReport> {
        let readings = self.load_readings(source)?;
        info!("Loaded {} readings", readings.len());

        let mut tariffs = Vec::with_capacity(Utility::ALL.len());
        for utility in Utility::ALL {
            let entries = self.load_tariffs(source, utility)?;
            info!("Loaded {} {} tariff entries", entries.len(), utility);
            tariffs.push((utility, entries));
        }

        let mut utilities = Vec::new();
        let mut warnings = Vec::new();
        for (utility, entries) in &tariffs {
            let (report, mut utility_warnings) = self.process_utility(*utility, &readings, entries);
            warnings.append(&mut utility_warnings);
            utilities.push(report);
        }

        Ok(PipelineReport {
            utilities,
            warnings,
        })
    }

    pub fn load_readings(&self, source: &dyn RangeSource) -> Result<Vec<Reading>> {
        let table = self.load_table(source, &self.config.readings_range)?;
        let mut readings = table.readings(&self.config.reading_columns)?;
        if let Some(year) = self.config.year {
            readings.retain(|r| r.date.year == year);
            debug!("{} readings left for {}", readings.len(), year);
        }
        Ok(readings)
    }

    pub fn load_tariffs(&self, source: &dyn RangeSource, utility: Utility) -> Result<Vec<TariffEntry>> {
        let range = self.config.tariff_ranges.for_utility(utility);
        let table = self.load_table(source, range)?;
        table.tariffs(&self.config.tariff_columns)
    }

    fn load_table(&self, source: &dyn RangeSource, range: &str) -> Result<Table> {
        let rows = source.fetch(range)?;
        let raw = RawTable::from_rows(range, rows);
        let table = Table::parse(raw, &self.config.date_column, &self.config.date_format)?;
        if table.is_empty() {
            warn!("{}: no data rows", table.name());
        }
        Ok(table)
    }

    pub fn process_utility(
        &self,
        utility: Utility,
        readings: &[Reading],
        tariffs: &[TariffEntry],
    ) -> (UtilityReport, Vec<PipelineWarning>) {
        let mut warnings = Vec::new();

        let raw = resample_daily(readings.iter().map(|r| (r.date.date, r.value(utility))));
        let known_points = raw.known_count();
        let interpolated = if known_points < 2 {
            warn!("{}: {} known reading(s), series left empty", utility, known_points);
            warnings.push(PipelineWarning::InsufficientData {
                utility,
                known_points,
            });
            raw.all_missing()
        } else {
            interpolate_linear(&raw)
        };

        let Deltas {
            series: deltas,
            negative,
        } = difference(&interpolated, self.config.reset_policy);
        for (date, delta) in negative {
            warn!("{}: negative delta {:.3} on {} (meter reset?)", utility, delta, date);
            warnings.push(PipelineWarning::NegativeDelta {
                utility,
                date,
                delta,
            });
        }

        let monthly = sum_by_month(&deltas);
        let factor = self.config.energy_factor(utility);
        let consumption = monthly.map(|v| v * factor);

        let costs = tariff_by_month(tariffs, interpolated.end()).map(|tariff| {
            let join = join_costs(&monthly, &tariff, factor);
            for month in join.unpriced {
                warn!("{}: no tariff for {}, dropped from costs", utility, month);
                warnings.push(PipelineWarning::MissingTariffMonth { utility, month });
            }
            join.costs
        });

        let consumption_matrix = YearlyMatrix::from_monthly(&consumption).covering(&interpolated);
        let cost_matrix = costs
            .as_ref()
            .map(|c| YearlyMatrix::from_monthly(&c.map(|m| m.cost)).covering(&interpolated));
        let summaries = summarize_years(utility, &consumption, costs.as_ref(), &interpolated);

        debug!(
            "{}: {} days, {} months, {} priced",
            utility,
            interpolated.len(),
            consumption.len(),
            costs.as_ref().map_or(0, |c| c.len())
        );

        let report = UtilityReport {
            utility,
            raw,
            interpolated,
            deltas,
            consumption,
            costs,
            consumption_matrix,
            cost_matrix,
            summaries,
        };
        (report, warnings)
    }
}

/// Daily forward-filled rates averaged per month. The calendar is extended
/// to `until` so the last rate keeps holding to the end of the readings.
pub fn tariff_by_month(
    tariffs: &[TariffEntry],
    until: Option<NaiveDate>,
) -> Option<MonthlySeries<TariffRate>> {
    if tariffs
        .iter()
        .all(|t| t.energy_price.is_none() && t.base_price.is_none())
    {
        return None;
    }

    let energy = resample_daily(tariffs.iter().map(|t| (t.effective_date.date, t.energy_price)));
    let base = resample_daily(tariffs.iter().map(|t| (t.effective_date.date, t.base_price)));
    let (energy, base) = match until {
        Some(end) => (energy.extend_to(end), base.extend_to(end)),
        None => (energy, base),
    };

    Some(monthly_tariff(&forward_fill(&energy), &forward_fill(&base)))
}
