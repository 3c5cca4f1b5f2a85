use crate::models::{MonthlyCost, MonthlySeries, TariffRate, YearMonth};

#[derive(Debug, Clone, PartialEq)]
pub struct CostJoin {
    /// Consumption (after conversion) and cost per priced month.
    pub costs: MonthlySeries<MonthlyCost>,
    /// Consumption months that had no tariff and were dropped.
    pub unpriced: Vec<YearMonth>,
}

/// Inner join of monthly consumption with monthly tariffs.
///
/// `energy_factor` converts consumption into the unit the energy price is
/// quoted in (kWh per m3 for gas, 1.0 otherwise):
/// `cost = consumption * energy_factor * energy_price + base_price`.
pub fn join_costs(
    consumption: &MonthlySeries<f64>,
    tariff: &MonthlySeries<TariffRate>,
    energy_factor: f64,
) -> CostJoin {
    let mut costs = MonthlySeries::new();
    let mut unpriced = Vec::new();

    for (month, amount) in consumption.iter() {
        match tariff.get(month) {
            Some(rate) => {
                let converted = amount * energy_factor;
                costs.insert(
                    *month,
                    MonthlyCost {
                        consumption: converted,
                        cost: converted * rate.energy_price + rate.base_price,
                    },
                );
            }
            None => unpriced.push(*month),
        }
    }

    CostJoin { costs, unpriced }
}
