//! CSV file data adapter.
//!
//! Each series lives in `<base>/<name>.csv`. The date column becomes the
//! timestamp vector; every other column is numeric when all of its non-empty
//! cells parse as `f64`, and text otherwise.

use crate::domain::error::PipelineError;
use crate::domain::series::{Column, Series};
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

pub const DEFAULT_DATE_COLUMN: &str = "Date";

const MISSING_MARKERS: [&str; 5] = ["", "NA", "NaN", "nan", "null"];

pub struct CsvAdapter {
    base_path: PathBuf,
    date_column: String,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            date_column: DEFAULT_DATE_COLUMN.to_string(),
        }
    }

    pub fn with_date_column(mut self, name: &str) -> Self {
        self.date_column = name.to_string();
        self
    }

    fn csv_path(&self, name: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", name))
    }

    /// Parse a CSV stream into a series sorted by timestamp.
    pub fn read_series<R: Read>(&self, reader: R) -> Result<Series, PipelineError> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| data_error(format!("CSV header error: {}", e)))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let date_idx = headers
            .iter()
            .position(|h| *h == self.date_column)
            .ok_or_else(|| data_error(format!("missing date column '{}'", self.date_column)))?;

        let mut dates = Vec::new();
        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| data_error(format!("CSV parse error: {}", e)))?;

            let raw_date = record
                .get(date_idx)
                .ok_or_else(|| data_error(format!("row {}: missing date", line + 1)))?;
            dates.push(parse_date(raw_date).ok_or_else(|| {
                data_error(format!("row {}: invalid date '{}'", line + 1, raw_date))
            })?);

            for (idx, column) in cells.iter_mut().enumerate() {
                column.push(record.get(idx).unwrap_or("").trim().to_string());
            }
        }

        // stable sort keeps the file order of equal timestamps
        let mut order: Vec<usize> = (0..dates.len()).collect();
        order.sort_by_key(|&i| dates[i]);

        let timestamps = order.iter().map(|&i| dates[i]).collect();
        let columns = headers
            .iter()
            .zip(cells)
            .enumerate()
            .filter(|(idx, _)| *idx != date_idx)
            .map(|(_, (name, raw))| {
                let raw: Vec<String> = order.iter().map(|&i| raw[i].clone()).collect();
                infer_column(name, raw)
            })
            .collect();

        let series = Series::new(timestamps, columns);
        debug!(rows = series.len(), columns = series.columns.len(), "parsed csv series");
        Ok(series)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_series(&self, name: &str) -> Result<Series, PipelineError> {
        let path = self.csv_path(name);
        let content = fs::read(&path)
            .map_err(|e| data_error(format!("failed to read {}: {}", path.display(), e)))?;
        self.read_series(content.as_slice())
    }

    fn list_series(&self) -> Result<Vec<String>, PipelineError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            data_error(format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| data_error(format!("directory entry error: {}", e)))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("csv") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }
}

fn data_error(reason: String) -> PipelineError {
    PipelineError::Data { reason }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell)
}

fn infer_column(name: &str, raw: Vec<String>) -> Column {
    let parsed: Option<Vec<Option<f64>>> = raw
        .iter()
        .map(|cell| {
            if is_missing(cell) {
                Some(None)
            } else {
                cell.parse::<f64>().ok().map(Some)
            }
        })
        .collect();

    match parsed {
        Some(values) => Column::numeric_opt(name, values),
        None => Column::text(
            name,
            raw.into_iter()
                .map(|cell| (!is_missing(&cell)).then_some(cell))
                .collect(),
        ),
    }
}
