use crate::config::{ReadingColumns, TariffColumns};
use crate::error::{PipelineError, Result};
use crate::models::{DateKey, Reading, TariffEntry};
use chrono::NaiveDate;
use log::debug;

/// One fetched range: string cells, first row holds the column names.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn from_rows(name: &str, mut rows: Vec<Vec<String>>) -> Self {
        let headers = if rows.is_empty() {
            Vec::new()
        } else {
            rows.remove(0).into_iter().map(|h| h.trim().to_string()).collect()
        };
        Self {
            name: name.to_string(),
            headers,
            rows,
        }
    }

    fn column_index(&self, column: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| PipelineError::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }
}

#[derive(Debug, Clone)]
struct DatedRow {
    /// 1-based row number in the sheet, header row included.
    line: usize,
    date: DateKey,
    cells: Vec<String>,
}

/// A range whose rows have been checked against the header and whose date
/// column has been parsed.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    headers: Vec<String>,
    rows: Vec<DatedRow>,
}

impl Table {
    pub fn parse(raw: RawTable, date_column: &str, date_format: &str) -> Result<Self> {
        let date_idx = raw.column_index(date_column)?;
        let expected = raw.headers.len();
        let mut rows = Vec::with_capacity(raw.rows.len());

        for (idx, cells) in raw.rows.into_iter().enumerate() {
            let line = idx + 2;
            if cells.iter().all(|c| c.trim().is_empty()) {
                debug!("{}: skipping blank row {}", raw.name, line);
                continue;
            }
            if cells.len() != expected {
                return Err(PipelineError::MalformedRow {
                    table: raw.name,
                    row: line,
                    expected,
                    found: cells.len(),
                });
            }
            let date = parse_date(&cells[date_idx], date_format, line)?;
            rows.push(DatedRow { line, date, cells });
        }

        debug!("{}: parsed {} rows", raw.name, rows.len());
        Ok(Self {
            name: raw.name,
            headers: raw.headers,
            rows,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The values of one column paired with their row's date.
    pub fn numeric_column(&self, column: &str) -> Result<Vec<(DateKey, Option<f64>)>> {
        let col_idx = self
            .headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| PipelineError::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })?;

        self.rows
            .iter()
            .map(|row| Ok((row.date, parse_value(&row.cells[col_idx], column, row.line)?)))
            .collect()
    }

    pub fn readings(&self, columns: &ReadingColumns) -> Result<Vec<Reading>> {
        let electricity = self.numeric_column(&columns.electricity)?;
        let water = self.numeric_column(&columns.water)?;
        let gas = self.numeric_column(&columns.gas)?;

        Ok(electricity
            .into_iter()
            .zip(water)
            .zip(gas)
            .map(|(((date, electricity), (_, water)), (_, gas))| Reading {
                date,
                electricity,
                water,
                gas,
            })
            .collect())
    }

    pub fn tariffs(&self, columns: &TariffColumns) -> Result<Vec<TariffEntry>> {
        let energy = self.numeric_column(&columns.energy_price)?;
        let base = self.numeric_column(&columns.base_price)?;

        Ok(energy
            .into_iter()
            .zip(base)
            .map(|((effective_date, energy_price), (_, base_price))| TariffEntry {
                effective_date,
                energy_price,
                base_price,
            })
            .collect())
    }
}

pub fn parse_date(cell: &str, format: &str, row: usize) -> Result<DateKey> {
    NaiveDate::parse_from_str(cell.trim(), format)
        .map(DateKey::new)
        .map_err(|_| PipelineError::InvalidDate {
            row,
            value: cell.to_string(),
            format: format.to_string(),
        })
}

/// Empty cells are missing values. Accepts a decimal comma, and with both
/// separators present the later one is the decimal mark (`12.345,6`,
/// `12,345.6`). A lone dot is always decimal.
pub fn parse_value(cell: &str, column: &str, row: usize) -> Result<Option<f64>> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match normalize_number(trimmed).parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(PipelineError::InvalidNumber {
            row,
            column: column.to_string(),
            value: cell.to_string(),
        }),
    }
}

fn normalize_number(cell: &str) -> String {
    match (cell.rfind(','), cell.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => cell.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cell.replace(',', ""),
        (Some(_), None) => cell.replace(',', "."),
        _ => cell.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn readings_table() -> RawTable {
        RawTable::from_rows(
            "A1:D100",
            rows(&[
                &["Datum", "Strom", "Wasser", "Gas"],
                &["01.01.2022", "100", "50,5", ""],
                &["15.01.2022", "130.5", "", "2000"],
            ]),
        )
    }

    #[test]
    fn test_parse_readings() {
        let table = Table::parse(readings_table(), "Datum", "%d.%m.%Y").unwrap();
        assert_eq!(table.len(), 2);

        let readings = table.readings(&ReadingColumns::default()).unwrap();
        assert_eq!(readings[0].date.day, 1);
        assert_eq!(readings[0].date.month, 1);
        assert_eq!(readings[0].date.year, 2022);
        assert_eq!(readings[0].electricity, Some(100.0));
        assert_eq!(readings[0].water, Some(50.5));
        assert_eq!(readings[0].gas, None);
        assert_eq!(readings[1].electricity, Some(130.5));
        assert_eq!(readings[1].water, None);
    }

    #[test]
    fn test_row_width_mismatch_is_malformed() {
        let raw = RawTable::from_rows(
            "A1:D100",
            rows(&[&["Datum", "Strom", "Wasser", "Gas"], &["01.01.2022", "100"]]),
        );
        let err = Table::parse(raw, "Datum", "%d.%m.%Y").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MalformedRow {
                row: 2,
                expected: 4,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let raw = RawTable::from_rows(
            "A1:D100",
            rows(&[&["Datum", "Strom"], &["2022-01-01", "100"]]),
        );
        let err = Table::parse(raw, "Datum", "%d.%m.%Y").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidDate { row: 2, .. }));
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let raw = RawTable::from_rows(
            "A1:B10",
            rows(&[&["Datum", "Strom"], &["", ""], &["02.01.2022", "1"]]),
        );
        let table = Table::parse(raw, "Datum", "%d.%m.%Y").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.name(), "A1:B10");

        let header_only = RawTable::from_rows("A1:B10", rows(&[&["Datum", "Strom"], &["", ""]]));
        assert!(Table::parse(header_only, "Datum", "%d.%m.%Y").unwrap().is_empty());
    }

    #[test]
    fn test_missing_columns() {
        let raw = RawTable::from_rows("A1:B10", rows(&[&["Date", "Strom"]]));
        assert!(matches!(
            Table::parse(raw, "Datum", "%d.%m.%Y"),
            Err(PipelineError::MissingColumn { .. })
        ));

        let table = Table::parse(readings_table(), "Datum", "%d.%m.%Y").unwrap();
        assert!(matches!(
            table.numeric_column("Oil"),
            Err(PipelineError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("  ", "Gas", 2).unwrap(), None);
        assert_eq!(parse_value("12,25", "Gas", 2).unwrap(), Some(12.25));
        assert_eq!(parse_value("12.345,6", "Gas", 2).unwrap(), Some(12345.6));
        assert_eq!(parse_value("12,345.6", "Gas", 2).unwrap(), Some(12345.6));
        assert_eq!(parse_value("1.5", "Gas", 2).unwrap(), Some(1.5));
        assert!(parse_value("1,2,3", "Gas", 2).is_err());
        assert!(parse_value("abc", "Gas", 2).is_err());
        assert!(parse_value("NaN", "Gas", 2).is_err());
    }

    #[test]
    fn test_empty_range() {
        let raw = RawTable::from_rows("A1:D100", Vec::new());
        assert!(raw.headers.is_empty());
        assert!(Table::parse(raw, "Datum", "%d.%m.%Y").is_err());
    }
}
