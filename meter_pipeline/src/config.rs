use crate::error::{PipelineError, Result};
use crate::models::Utility;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What to do with a negative day-over-day delta (a meter reset or a
/// typo in the readings).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResetPolicy {
    /// Keep the negative value.
    #[default]
    PassThrough,
    /// Replace it with zero.
    Clamp,
    /// Replace it with a missing value.
    Discard,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TariffRanges {
    pub electricity: String,
    pub water: String,
    pub gas: String,
}

impl TariffRanges {
    pub fn for_utility(&self, utility: Utility) -> &str {
        match utility {
            Utility::Electricity => &self.electricity,
            Utility::Water => &self.water,
            Utility::Gas => &self.gas,
        }
    }
}

impl Default for TariffRanges {
    fn default() -> Self {
        Self {
            electricity: "Tarif Strom!A1:C50".to_string(),
            water: "Tarif Wasser!A1:C50".to_string(),
            gas: "Tarif Gas!A1:C50".to_string(),
        }
    }
}

/// Header names of the readings table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadingColumns {
    pub electricity: String,
    pub water: String,
    pub gas: String,
}

impl Default for ReadingColumns {
    fn default() -> Self {
        Self {
            electricity: "Strom".to_string(),
            water: "Wasser".to_string(),
            gas: "Gas".to_string(),
        }
    }
}

/// Header names of the tariff tables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TariffColumns {
    pub energy_price: String,
    pub base_price: String,
}

impl Default for TariffColumns {
    fn default() -> Self {
        Self {
            energy_price: "Arbeitspreis".to_string(),
            base_price: "Grundpreis".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub spreadsheet_id: String,
    pub readings_range: String,
    pub tariff_ranges: TariffRanges,
    pub output_dir: PathBuf,
    /// kWh per m3 of gas.
    pub gas_factor_kwh_per_m3: f64,
    pub date_column: String,
    /// chrono format string of the date cells.
    pub date_format: String,
    pub reading_columns: ReadingColumns,
    pub tariff_columns: TariffColumns,
    /// Restrict the analysis to a single year.
    pub year: Option<i32>,
    pub reset_policy: ResetPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            readings_range: "A1:D100".to_string(),
            tariff_ranges: TariffRanges::default(),
            output_dir: PathBuf::from("plots"),
            gas_factor_kwh_per_m3: 10.0,
            date_column: "Datum".to_string(),
            date_format: "%d.%m.%Y".to_string(),
            reading_columns: ReadingColumns::default(),
            tariff_columns: TariffColumns::default(),
            year: None,
            reset_policy: ResetPolicy::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.gas_factor_kwh_per_m3.is_finite() || self.gas_factor_kwh_per_m3 <= 0.0 {
            return Err(PipelineError::Config(format!(
                "gas conversion factor must be positive, got {}",
                self.gas_factor_kwh_per_m3
            )));
        }
        if self.date_format.trim().is_empty() {
            return Err(PipelineError::Config("date format is empty".to_string()));
        }
        if self.date_column.trim().is_empty() {
            return Err(PipelineError::Config("date column is empty".to_string()));
        }
        Ok(())
    }

    /// Factor applied to monthly consumption before costing.
    pub fn energy_factor(&self, utility: Utility) -> f64 {
        match utility {
            Utility::Gas => self.gas_factor_kwh_per_m3,
            Utility::Electricity | Utility::Water => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.readings_range, "A1:D100");
        assert_eq!(config.date_column, "Datum");
        assert_eq!(config.reset_policy, ResetPolicy::PassThrough);
        assert_eq!(config.energy_factor(Utility::Gas), 10.0);
        assert_eq!(config.energy_factor(Utility::Water), 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_factor() {
        let config = PipelineConfig {
            gas_factor_kwh_per_m3: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"gas_factor_kwh_per_m3": 11.2, "year": 2022, "reset_policy": "clamp"}}"#
        )
        .unwrap();

        let config = PipelineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.gas_factor_kwh_per_m3, 11.2);
        assert_eq!(config.year, Some(2022));
        assert_eq!(config.reset_policy, ResetPolicy::Clamp);
        assert_eq!(config.date_format, "%d.%m.%Y");
    }
}
