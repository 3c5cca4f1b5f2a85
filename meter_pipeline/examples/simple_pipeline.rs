use meter_pipeline::{InMemorySource, Pipeline, PipelineConfig, Utility};

fn main() {
    let config = PipelineConfig {
        gas_factor_kwh_per_m3: 10.5,
        ..Default::default()
    };

    // A few irregular readings, one of them with the gas cell left empty
    let source = InMemorySource::new()
        .with_range(
            &config.readings_range,
            &[
                &["Datum", "Strom", "Wasser", "Gas"],
                &["01.01.2022", "12000", "830.2", "5400"],
                &["19.01.2022", "12210", "834.9", ""],
                &["03.02.2022", "12395", "838.0", "5688"],
                &["28.02.2022", "12650", "842.7", "5890"],
                &["31.03.2022", "12960", "848.1", "6080"],
            ],
        )
        .with_range(
            &config.tariff_ranges.electricity,
            &[
                &["Datum", "Arbeitspreis", "Grundpreis"],
                &["01.01.2022", "0.32", "11.90"],
                &["01.03.2022", "0.41", "12.50"],
            ],
        )
        .with_range(
            &config.tariff_ranges.water,
            &[&["Datum", "Arbeitspreis", "Grundpreis"], &["01.01.2022", "4.10", "6.00"]],
        )
        .with_range(
            &config.tariff_ranges.gas,
            &[&["Datum", "Arbeitspreis", "Grundpreis"], &["01.01.2022", "0.08", "15.00"]],
        );

    let pipeline = Pipeline::new(config);
    let report = match pipeline.run(&source) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Pipeline failed: {}", e);
            return;
        }
    };

    println!("Monthly consumption and cost");
    println!("============================");
    for utility in Utility::ALL {
        let Some(result) = report.utility(utility) else {
            continue;
        };
        println!("{} [{}]", utility, utility.unit());
        for (month, consumption) in result.consumption.iter() {
            let cost = result
                .costs
                .as_ref()
                .and_then(|c| c.get(month))
                .map(|c| format!("{:.2} EUR", c.cost))
                .unwrap_or_else(|| "-".to_string());
            println!("  {}: {:>9.1}  {}", month, consumption, cost);
        }
    }

    for warning in &report.warnings {
        println!("warning: {}", warning);
    }
}
