use crate::error::{PipelineError, Result};
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Anything that can hand over a named range as rows of string cells, the
/// first row being the header.
pub trait RangeSource {
    fn fetch(&self, range: &str) -> Result<Vec<Vec<String>>>;
}

/// Reads range exports from a directory, one CSV file per range.
///
/// The file name is the range reference with every character that is not
/// alphanumeric, `-` or `_` replaced by `_`, e.g. `Tarif Gas!A1:C50` is
/// read from `Tarif_Gas_A1_C50.csv`.
pub struct CsvRangeSource {
    dir: PathBuf,
}

impl CsvRangeSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, range: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", file_stem(range)))
    }

    fn read_rows(path: &Path) -> std::result::Result<Vec<Vec<String>>, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }
        Ok(rows)
    }
}

impl RangeSource for CsvRangeSource {
    fn fetch(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let path = self.path_for(range);
        debug!("Reading range {} from {}", range, path.display());
        Self::read_rows(&path).map_err(|e| PipelineError::Fetch {
            range: range.to_string(),
            message: format!("{}: {}", path.display(), e),
        })
    }
}

pub fn file_stem(range: &str) -> String {
    range
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Ranges held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    ranges: HashMap<String, Vec<Vec<String>>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, range: &str, rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect();
        self.ranges.insert(range.to_string(), rows);
        self
    }

    pub fn insert(&mut self, range: &str, rows: Vec<Vec<String>>) {
        self.ranges.insert(range.to_string(), rows);
    }
}

impl RangeSource for InMemorySource {
    fn fetch(&self, range: &str) -> Result<Vec<Vec<String>>> {
        self.ranges
            .get(range)
            .cloned()
            .ok_or_else(|| PipelineError::Fetch {
                range: range.to_string(),
                message: "range not available".to_string(),
            })
    }
}
