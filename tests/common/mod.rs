#![allow(dead_code)]

use chrono::NaiveDate;
use quantpipe::domain::error::PipelineError;
use quantpipe::domain::series::{Column, Series, CLOSE, VOLUME};
use quantpipe::ports::data_port::DataPort;
use std::collections::HashMap;

pub const SAMPLE_CLOSE: [f64; 10] = [
    151.0, 153.0, 156.0, 155.0, 157.0, 159.0, 161.0, 163.0, 166.0, 165.0,
];
pub const SAMPLE_VOLUME: [f64; 10] = [
    1000.0, 1200.0, 1300.0, 1100.0, 1250.0, 1400.0, 1500.0, 1600.0, 1700.0, 1650.0,
];

pub struct MockDataPort {
    pub data: HashMap<String, Series>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, name: &str, series: Series) -> Self {
        self.data.insert(name.to_string(), series);
        self
    }

    pub fn with_error(mut self, name: &str, reason: &str) -> Self {
        self.errors.insert(name.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(&self, name: &str) -> Result<Series, PipelineError> {
        if let Some(reason) = self.errors.get(name) {
            return Err(PipelineError::Data {
                reason: reason.clone(),
            });
        }
        self.data
            .get(name)
            .cloned()
            .ok_or_else(|| PipelineError::Data {
                reason: format!("unknown series '{}'", name),
            })
    }

    fn list_series(&self) -> Result<Vec<String>, PipelineError> {
        let mut names: Vec<String> = self.data.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive calendar days starting 2024-01-01.
pub fn make_dates(n: usize) -> Vec<NaiveDate> {
    let start = date(2024, 1, 1);
    (0..n)
        .map(|i| start + chrono::Duration::days(i as i64))
        .collect()
}

pub fn make_series(close: &[f64], volume: &[f64]) -> Series {
    Series::new(make_dates(close.len()), vec![])
        .with_column(Column::numeric(CLOSE, close))
        .with_column(Column::numeric(VOLUME, volume))
}

pub fn sample_series() -> Series {
    make_series(&SAMPLE_CLOSE, &SAMPLE_VOLUME)
}

/// Render a series as CSV with a `Date` column, `NA` for missing numbers.
pub fn series_to_csv(series: &Series) -> String {
    let mut out = String::from("Date");
    for name in series.column_names() {
        out.push(',');
        out.push_str(name);
    }
    out.push('\n');
    for (row, ts) in series.timestamps.iter().enumerate() {
        out.push_str(&ts.format("%Y-%m-%d").to_string());
        for column in &series.columns {
            out.push(',');
            if let Some(values) = column.as_numeric() {
                match values[row] {
                    Some(v) => out.push_str(&v.to_string()),
                    None => out.push_str("NA"),
                }
            }
        }
        out.push('\n');
    }
    out
}
