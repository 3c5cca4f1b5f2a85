use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Utility {
    Electricity,
    Water,
    Gas,
}

impl Utility {
    pub const ALL: [Utility; 3] = [Utility::Electricity, Utility::Water, Utility::Gas];

    pub fn as_str(&self) -> &'static str {
        match self {
            Utility::Electricity => "electricity",
            Utility::Water => "water",
            Utility::Gas => "gas",
        }
    }

    /// Short name used for chart files and titles.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Utility::Electricity => "strom",
            Utility::Water => "wasser",
            Utility::Gas => "gas",
        }
    }

    /// Unit of the reported consumption (gas is reported after conversion).
    pub fn unit(&self) -> &'static str {
        match self {
            Utility::Electricity | Utility::Gas => "kWh",
            Utility::Water => "m3",
        }
    }
}

impl fmt::Display for Utility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar month key, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// Serialized as "YYYY-MM" so it can key JSON maps.
impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A parsed date cell: its components plus the composite key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateKey {
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub date: NaiveDate,
}

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            day: date.day(),
            month: date.month(),
            year: date.year(),
            date,
        }
    }
}

/// One row of the readings table. Values are cumulative meter readings.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub date: DateKey,
    pub electricity: Option<f64>,
    pub water: Option<f64>,
    pub gas: Option<f64>,
}

impl Reading {
    pub fn value(&self, utility: Utility) -> Option<f64> {
        match utility {
            Utility::Electricity => self.electricity,
            Utility::Water => self.water,
            Utility::Gas => self.gas,
        }
    }
}

/// A rate valid from `effective_date` until the next entry supersedes it.
#[derive(Debug, Clone, PartialEq)]
pub struct TariffEntry {
    pub effective_date: DateKey,
    pub energy_price: Option<f64>,
    pub base_price: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TariffRate {
    pub energy_price: f64,
    pub base_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyCost {
    pub consumption: f64,
    pub cost: f64,
}

/// Values on a gap-free daily calendar. Gaps are missing values, never
/// missing days.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DailySeries {
    start: Option<NaiveDate>,
    values: Vec<Option<f64>>,
}

impl DailySeries {
    pub fn new(start: NaiveDate, values: Vec<Option<f64>>) -> Self {
        if values.is_empty() {
            return Self::empty();
        }
        Self {
            start: Some(start),
            values,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.start
            .map(|start| start + Duration::days(self.values.len() as i64 - 1))
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn date_at(&self, idx: usize) -> Option<NaiveDate> {
        match self.start {
            Some(start) if idx < self.values.len() => Some(start + Duration::days(idx as i64)),
            _ => None,
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        let start = self.start?;
        let offset = (date - start).num_days();
        if offset < 0 {
            return None;
        }
        self.values.get(offset as usize).copied().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Option<f64>)> + '_ {
        let start = self.start.unwrap_or_default();
        self.values
            .iter()
            .enumerate()
            .map(move |(idx, value)| (start + Duration::days(idx as i64), *value))
    }

    /// Only the days that carry a value.
    pub fn known(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.iter().filter_map(|(date, value)| value.map(|v| (date, v)))
    }

    pub fn known_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Same calendar, every value missing.
    pub fn all_missing(&self) -> Self {
        Self {
            start: self.start,
            values: vec![None; self.values.len()],
        }
    }

    /// Pads the calendar with missing days up to `end`. Never shortens.
    pub fn extend_to(&self, end: NaiveDate) -> Self {
        let mut extended = self.clone();
        if let Some(current_end) = self.end() {
            let extra = (end - current_end).num_days();
            if extra > 0 {
                extended.values.extend(std::iter::repeat(None).take(extra as usize));
            }
        }
        extended
    }
}

/// Values keyed by calendar month, in chronological order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MonthlySeries<T> {
    entries: BTreeMap<YearMonth, T>,
}

impl<T> Default for MonthlySeries<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> MonthlySeries<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, month: YearMonth, value: T) {
        self.entries.insert(month, value);
    }

    pub fn get(&self, month: &YearMonth) -> Option<&T> {
        self.entries.get(month)
    }

    pub fn contains(&self, month: &YearMonth) -> bool {
        self.entries.contains_key(month)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&YearMonth, &T)> {
        self.entries.iter()
    }

    pub fn map<U, F: Fn(&T) -> U>(&self, f: F) -> MonthlySeries<U> {
        MonthlySeries {
            entries: self.entries.iter().map(|(k, v)| (*k, f(v))).collect(),
        }
    }
}

impl<T> FromIterator<(YearMonth, T)> for MonthlySeries<T> {
    fn from_iter<I: IntoIterator<Item = (YearMonth, T)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_year_month_order_and_display() {
        let dec = YearMonth::new(2021, 12);
        let jan = YearMonth::new(2022, 1);
        assert!(dec < jan);
        assert_eq!(jan.to_string(), "2022-01");
        assert_eq!(YearMonth::from_date(date(2022, 5, 31)), YearMonth::new(2022, 5));
    }

    #[test]
    fn test_daily_series_calendar() {
        let series = DailySeries::new(date(2022, 2, 27), vec![Some(1.0), None, Some(3.0)]);
        assert_eq!(series.end(), Some(date(2022, 3, 1)));
        assert_eq!(series.get(date(2022, 3, 1)), Some(3.0));
        assert_eq!(series.get(date(2022, 2, 28)), None);
        assert_eq!(series.get(date(2022, 2, 1)), None);
        assert_eq!(series.known_count(), 2);

        let dates: Vec<_> = series.iter().map(|(d, _)| d).collect();
        assert_eq!(dates, vec![date(2022, 2, 27), date(2022, 2, 28), date(2022, 3, 1)]);
    }

    #[test]
    fn test_extend_to_pads_with_missing() {
        let series = DailySeries::new(date(2022, 1, 1), vec![Some(1.0)]);
        let extended = series.extend_to(date(2022, 1, 3));
        assert_eq!(extended.values(), &[Some(1.0), None, None]);
        assert_eq!(series.extend_to(date(2021, 12, 1)), series);
    }

    #[test]
    fn test_empty_series() {
        let series = DailySeries::new(date(2022, 1, 1), vec![]);
        assert!(series.is_empty());
        assert_eq!(series.start(), None);
        assert_eq!(series.end(), None);
        assert_eq!(series.iter().count(), 0);
    }

    #[test]
    fn test_monthly_series_serializes_with_month_keys() {
        let series: MonthlySeries<f64> =
            vec![(YearMonth::new(2022, 2), 2.0), (YearMonth::new(2022, 1), 1.0)]
                .into_iter()
                .collect();
        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(json, r#"{"2022-01":1.0,"2022-02":2.0}"#);
    }
}
