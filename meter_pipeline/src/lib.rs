pub mod aggregate;
pub mod config;
pub mod cost;
pub mod data_loader;
pub mod difference;
pub mod error;
pub mod interpolate;
pub mod models;
pub mod pipeline;
pub mod pivot;
pub mod resample;
pub mod table;

pub use config::{PipelineConfig, ResetPolicy};
pub use data_loader::{CsvRangeSource, InMemorySource, RangeSource};
pub use error::{PipelineError, PipelineWarning, Result};
pub use models::{DailySeries, MonthlyCost, MonthlySeries, TariffRate, Utility, YearMonth};
pub use pipeline::{Pipeline, PipelineReport, UtilityReport};
pub use pivot::{YearSummary, YearlyMatrix};
