use crate::config::ResetPolicy;
use crate::models::DailySeries;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct Deltas {
    pub series: DailySeries,
    /// Days on which the cumulative reading went down, with the raw delta.
    pub negative: Vec<(NaiveDate, f64)>,
}

/// First difference of a cumulative series. The first day has no
/// predecessor and is always missing; so is any day where either side of
/// the difference is missing.
pub fn difference(series: &DailySeries, policy: ResetPolicy) -> Deltas {
    let values = series.values();
    let mut negative = Vec::new();
    let mut deltas = Vec::with_capacity(values.len());

    for idx in 0..values.len() {
        let delta = match (idx.checked_sub(1).and_then(|p| values[p]), values[idx]) {
            (Some(prev), Some(current)) => Some(current - prev),
            _ => None,
        };

        let delta = match delta {
            Some(d) if d < 0.0 => {
                if let Some(date) = series.date_at(idx) {
                    negative.push((date, d));
                }
                match policy {
                    ResetPolicy::PassThrough => Some(d),
                    ResetPolicy::Clamp => Some(0.0),
                    ResetPolicy::Discard => None,
                }
            }
            other => other,
        };
        deltas.push(delta);
    }

    let series = match series.start() {
        Some(start) => DailySeries::new(start, deltas),
        None => DailySeries::empty(),
    };
    Deltas { series, negative }
}
