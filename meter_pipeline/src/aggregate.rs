use crate::models::{DailySeries, MonthlySeries, TariffRate, YearMonth};
use std::collections::BTreeMap;

/// Sums daily deltas per calendar month. Every month touched by the
/// calendar gets an entry; missing days add nothing, so a month with no
/// known day sums to zero.
pub fn sum_by_month(series: &DailySeries) -> MonthlySeries<f64> {
    let mut sums: BTreeMap<YearMonth, f64> = BTreeMap::new();
    for (date, value) in series.iter() {
        *sums.entry(YearMonth::from_date(date)).or_insert(0.0) += value.unwrap_or(0.0);
    }
    sums.into_iter().collect()
}

/// Mean of the known daily values per calendar month. Months without any
/// known day are left out.
pub fn mean_by_month(series: &DailySeries) -> MonthlySeries<f64> {
    let mut groups: BTreeMap<YearMonth, (f64, usize)> = BTreeMap::new();
    for (date, value) in series.known() {
        let entry = groups.entry(YearMonth::from_date(date)).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }
    groups
        .into_iter()
        .map(|(month, (sum, count))| (month, sum / count as f64))
        .collect()
}

/// Pairs the monthly mean energy price with the monthly mean base price.
/// A month needs both to be priced.
pub fn monthly_tariff(energy_price: &DailySeries, base_price: &DailySeries) -> MonthlySeries<TariffRate> {
    let energy = mean_by_month(energy_price);
    let base = mean_by_month(base_price);
    energy
        .iter()
        .filter_map(|(month, energy_price)| {
            base.get(month).map(|base_price| {
                (
                    *month,
                    TariffRate {
                        energy_price: *energy_price,
                        base_price: *base_price,
                    },
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_sum_by_month_spans_month_boundary() {
        // Jan 30 .. Feb 2
        let deltas = DailySeries::new(
            date(2022, 1, 30),
            vec![None, Some(2.0), Some(3.0), Some(4.0)],
        );
        let monthly = sum_by_month(&deltas);
        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly.get(&YearMonth::new(2022, 1)), Some(&2.0));
        assert_eq!(monthly.get(&YearMonth::new(2022, 2)), Some(&7.0));
    }

    #[test]
    fn test_all_missing_month_sums_to_zero() {
        let deltas = DailySeries::new(date(2022, 1, 31), vec![Some(1.0), None, None]);
        let monthly = sum_by_month(&deltas);
        assert_eq!(monthly.get(&YearMonth::new(2022, 2)), Some(&0.0));
    }

    #[test]
    fn test_monthly_sum_matches_daily_total() {
        let values: Vec<Option<f64>> = (0..365).map(|i| Some((i % 7) as f64 * 0.37)).collect();
        let deltas = DailySeries::new(date(2022, 1, 1), values);
        let daily_total: f64 = deltas.known().map(|(_, v)| v).sum();
        let monthly_total: f64 = sum_by_month(&deltas).iter().map(|(_, v)| *v).sum();
        assert_eq!(sum_by_month(&deltas).len(), 12);
        assert!((daily_total - monthly_total).abs() < 1e-9);
    }

    #[test]
    fn test_mean_by_month_skips_missing() {
        let rates = DailySeries::new(date(2022, 1, 30), vec![None, None, Some(0.3), Some(0.5)]);
        let monthly = mean_by_month(&rates);
        assert!(!monthly.contains(&YearMonth::new(2022, 1)));
        let feb = monthly.get(&YearMonth::new(2022, 2)).unwrap();
        assert!((feb - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_monthly_tariff_averages_rate_change() {
        // 0.30 for 10 days, 0.40 for the remaining 20 days of June
        let mut energy = vec![Some(0.3); 10];
        energy.extend(vec![Some(0.4); 20]);
        let energy = DailySeries::new(date(2022, 6, 1), energy);
        let base = DailySeries::new(date(2022, 6, 1), vec![Some(12.0); 30]);

        let tariff = monthly_tariff(&energy, &base);
        let june = tariff.get(&YearMonth::new(2022, 6)).unwrap();
        assert!((june.energy_price - (0.3 * 10.0 + 0.4 * 20.0) / 30.0).abs() < 1e-12);
        assert_eq!(june.base_price, 12.0);
    }
}
