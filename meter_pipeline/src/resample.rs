use crate::models::DailySeries;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Reindexes irregular readings onto one row per calendar day.
///
/// Readings sharing a day are averaged (missing ones are ignored), days
/// without a reading become missing. The calendar runs from the earliest to
/// the latest date in the input, whatever order the readings arrive in.
pub fn resample_daily<I>(points: I) -> DailySeries
where
    I: IntoIterator<Item = (NaiveDate, Option<f64>)>,
{
    // date -> (sum, count of known values)
    let mut by_day: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for (date, value) in points {
        let entry = by_day.entry(date).or_insert((0.0, 0));
        if let Some(v) = value {
            entry.0 += v;
            entry.1 += 1;
        }
    }

    let (first, last) = match (by_day.keys().next(), by_day.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return DailySeries::empty(),
    };

    let values = first
        .iter_days()
        .take_while(|d| *d <= last)
        .map(|day| match by_day.get(&day) {
            Some((sum, count)) if *count > 0 => Some(sum / *count as f64),
            _ => None,
        })
        .collect();

    DailySeries::new(first, values)
}
