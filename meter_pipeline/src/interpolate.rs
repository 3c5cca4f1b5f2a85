use crate::models::DailySeries;

/// Fills every run of missing days that has a known value on both sides,
/// weighting by day offset. Leading and trailing gaps stay missing.
pub fn interpolate_linear(series: &DailySeries) -> DailySeries {
    let values = series.values();
    let mut filled = values.to_vec();
    let mut previous: Option<(usize, f64)> = None;

    for (idx, value) in values.iter().enumerate() {
        let Some(current) = *value else {
            continue;
        };
        if let Some((prev_idx, prev_value)) = previous {
            let span = (idx - prev_idx) as f64;
            for gap_idx in prev_idx + 1..idx {
                let weight = (gap_idx - prev_idx) as f64 / span;
                filled[gap_idx] = Some(prev_value + (current - prev_value) * weight);
            }
        }
        previous = Some((idx, current));
    }

    rebuild(series, filled)
}

/// Each missing day takes the last known value before it. Leading gaps stay
/// missing.
pub fn forward_fill(series: &DailySeries) -> DailySeries {
    let mut last = None;
    let filled = series
        .values()
        .iter()
        .map(|value| {
            if value.is_some() {
                last = *value;
            }
            last
        })
        .collect();

    rebuild(series, filled)
}

fn rebuild(series: &DailySeries, values: Vec<Option<f64>>) -> DailySeries {
    match series.start() {
        Some(start) => DailySeries::new(start, values),
        None => DailySeries::empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(values: Vec<Option<f64>>) -> DailySeries {
        DailySeries::new(NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(), values)
    }

    #[test]
    fn test_linear_leaves_unbounded_edges_missing() {
        let input = series(vec![None, Some(2.0), None, Some(4.0), None]);
        let result = interpolate_linear(&input);
        assert_eq!(result.values(), &[None, Some(2.0), Some(3.0), Some(4.0), None]);
    }

    #[test]
    fn test_linear_weights_by_day_offset() {
        let input = series(vec![Some(100.0), None, None, None, Some(108.0)]);
        let result = interpolate_linear(&input);
        assert_eq!(
            result.values(),
            &[Some(100.0), Some(102.0), Some(104.0), Some(106.0), Some(108.0)]
        );
    }

    #[test]
    fn test_linear_is_idempotent_on_known_series() {
        let input = series(vec![Some(1.0), Some(5.0), Some(2.0)]);
        assert_eq!(interpolate_linear(&input), input);
        assert_eq!(forward_fill(&input), input);
    }

    #[test]
    fn test_linear_single_point_stays_put() {
        let input = series(vec![None, Some(7.0), None]);
        assert_eq!(interpolate_linear(&input), input);
    }

    #[test]
    fn test_forward_fill() {
        let input = series(vec![None, Some(10.0), None, None, Some(20.0)]);
        let result = forward_fill(&input);
        assert_eq!(
            result.values(),
            &[None, Some(10.0), Some(10.0), Some(10.0), Some(20.0)]
        );
    }

    #[test]
    fn test_empty_series() {
        assert!(interpolate_linear(&DailySeries::empty()).is_empty());
        assert!(forward_fill(&DailySeries::empty()).is_empty());
    }
}
