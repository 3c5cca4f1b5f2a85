use crate::models::{DailySeries, MonthlyCost, MonthlySeries, Utility};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Month (1-12) by year, for grouped bar charts. Months without data are
/// absent; years without any month have no column.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct YearlyMatrix {
    years: Vec<i32>,
    cells: BTreeMap<u32, BTreeMap<i32, f64>>,
}

impl YearlyMatrix {
    pub fn from_monthly(series: &MonthlySeries<f64>) -> Self {
        let mut cells: BTreeMap<u32, BTreeMap<i32, f64>> = BTreeMap::new();
        let mut years = Vec::new();
        for (month, value) in series.iter() {
            cells.entry(month.month).or_default().insert(month.year, *value);
            if !years.contains(&month.year) {
                years.push(month.year);
            }
        }
        years.sort_unstable();
        Self { years, cells }
    }

    /// Drops the columns of years in which `readings` has no known day.
    /// Such years only hold zero months from the aggregation.
    pub fn covering(mut self, readings: &DailySeries) -> Self {
        let covered = covered_years(readings);
        self.years.retain(|year| covered.contains(year));
        for row in self.cells.values_mut() {
            row.retain(|year, _| covered.contains(year));
        }
        self.cells.retain(|_, row| !row.is_empty());
        self
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn get(&self, month: u32, year: i32) -> Option<f64> {
        self.cells.get(&month).and_then(|row| row.get(&year)).copied()
    }

    /// The months of one year that have a value.
    pub fn column(&self, year: i32) -> Vec<(u32, f64)> {
        self.cells
            .iter()
            .filter_map(|(month, row)| row.get(&year).map(|v| (*month, *v)))
            .collect()
    }

    pub fn year_total(&self, year: i32) -> f64 {
        self.column(year).iter().map(|(_, v)| v).sum()
    }

    /// Smallest and largest cell, `None` when empty.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.cells
            .values()
            .flat_map(|row| row.values().copied())
            .fold(None, |range, v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSummary {
    pub utility: Utility,
    pub year: i32,
    pub unit: &'static str,
    pub consumption: f64,
    /// `None` when no month of the year could be priced.
    pub cost: Option<f64>,
    pub first_day: Option<NaiveDate>,
    pub last_day: Option<NaiveDate>,
}

fn covered_years(readings: &DailySeries) -> BTreeSet<i32> {
    readings.known().map(|(d, _)| d.year()).collect()
}

/// Per-year totals. Years without a known reading are left out. `consumption` is expected in reporting units.
/// `readings` is the interpolated cumulative series; its known days in a
/// year give the covered date range.
pub fn summarize_years(
    utility: Utility,
    consumption: &MonthlySeries<f64>,
    costs: Option<&MonthlySeries<MonthlyCost>>,
    readings: &DailySeries,
) -> Vec<YearSummary> {
    let matrix = YearlyMatrix::from_monthly(consumption).covering(readings);

    matrix
        .years()
        .iter()
        .map(|&year| {
            let cost = costs.and_then(|costs| {
                let priced: Vec<f64> = costs
                    .iter()
                    .filter(|(month, _)| month.year == year)
                    .map(|(_, c)| c.cost)
                    .collect();
                if priced.is_empty() {
                    None
                } else {
                    Some(priced.iter().sum())
                }
            });

            let mut covered = readings.known().map(|(d, _)| d).filter(|d| d.year() == year);
            let first_day = covered.next();
            let last_day = covered.last().or(first_day);

            YearSummary {
                utility,
                year,
                unit: utility.unit(),
                consumption: matrix.year_total(year),
                cost,
                first_day,
                last_day,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::YearMonth;

    fn monthly(entries: &[(i32, u32, f64)]) -> MonthlySeries<f64> {
        entries
            .iter()
            .map(|(y, m, v)| (YearMonth::new(*y, *m), *v))
            .collect()
    }

    #[test]
    fn test_pivot_by_month_and_year() {
        let matrix = YearlyMatrix::from_monthly(&monthly(&[
            (2021, 11, 1.0),
            (2021, 12, 2.0),
            (2022, 1, 3.0),
            (2022, 11, 4.0),
        ]));
        assert_eq!(matrix.years(), &[2021, 2022]);
        assert_eq!(matrix.get(11, 2021), Some(1.0));
        assert_eq!(matrix.get(11, 2022), Some(4.0));
        assert_eq!(matrix.get(1, 2021), None);
        assert_eq!(matrix.column(2022), vec![(1, 3.0), (11, 4.0)]);
        assert_eq!(matrix.year_total(2021), 3.0);
        assert_eq!(matrix.value_range(), Some((1.0, 4.0)));
    }

    #[test]
    fn test_years_without_readings_are_dropped() {
        let matrix = YearlyMatrix::from_monthly(&monthly(&[
            (2021, 12, 0.0),
            (2022, 1, 3.0),
            (2022, 2, 4.0),
        ]));
        let readings = DailySeries::new(
            NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(),
            vec![None, Some(5.0), Some(6.0)],
        );

        let covered = matrix.covering(&readings);
        assert_eq!(covered.years(), &[2022]);
        assert_eq!(covered.get(12, 2021), None);
        assert_eq!(covered.column(2022), vec![(1, 3.0), (2, 4.0)]);
        assert_eq!(covered.value_range(), Some((3.0, 4.0)));
    }

    #[test]
    fn test_empty_pivot() {
        let matrix = YearlyMatrix::from_monthly(&MonthlySeries::new());
        assert!(matrix.is_empty());
        assert_eq!(matrix.value_range(), None);
    }

    #[test]
    fn test_summaries_with_partial_costs() {
        let consumption = monthly(&[(2021, 12, 10.0), (2022, 1, 20.0), (2022, 2, 30.0)]);
        let costs: MonthlySeries<MonthlyCost> = vec![(
            YearMonth::new(2022, 1),
            MonthlyCost {
                consumption: 20.0,
                cost: 16.0,
            },
        )]
        .into_iter()
        .collect();
        let readings = DailySeries::new(
            NaiveDate::from_ymd_opt(2021, 12, 30).unwrap(),
            vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), None],
        );

        let summaries = summarize_years(Utility::Electricity, &consumption, Some(&costs), &readings);
        assert_eq!(summaries.len(), 2);

        assert_eq!(summaries[0].year, 2021);
        assert_eq!(summaries[0].consumption, 10.0);
        assert_eq!(summaries[0].cost, None);
        assert_eq!(summaries[0].first_day, NaiveDate::from_ymd_opt(2021, 12, 30));
        assert_eq!(summaries[0].last_day, NaiveDate::from_ymd_opt(2021, 12, 31));

        assert_eq!(summaries[1].consumption, 50.0);
        assert_eq!(summaries[1].cost, Some(16.0));
        assert_eq!(summaries[1].first_day, NaiveDate::from_ymd_opt(2022, 1, 1));
        assert_eq!(summaries[1].last_day, NaiveDate::from_ymd_opt(2022, 1, 2));
        assert_eq!(summaries[1].unit, "kWh");
    }
}
