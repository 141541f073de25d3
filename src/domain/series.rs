//! Time-indexed tabular series.
//!
//! A [`Series`] is a timestamp vector plus named columns of equal length.
//! Numeric columns hold `Option<f64>` so that a missing cell stays distinct
//! from any real value; text columns hold identifiers and other labels that
//! are summarized but never fed into numeric computations.

use chrono::NaiveDate;

pub const CLOSE: &str = "Close";
pub const VOLUME: &str = "Volume";

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    /// Numeric column with every cell present.
    pub fn numeric(name: &str, values: &[f64]) -> Self {
        Self {
            name: name.to_string(),
            data: ColumnData::Numeric(values.iter().copied().map(Some).collect()),
        }
    }

    /// Numeric column that may contain missing cells.
    pub fn numeric_opt(name: &str, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.to_string(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn text(name: &str, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.to_string(),
            data: ColumnData::Text(values),
        }
    }

    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v),
            ColumnData::Text(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.data, ColumnData::Numeric(_))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub timestamps: Vec<NaiveDate>,
    pub columns: Vec<Column>,
}

impl Series {
    pub fn new(timestamps: Vec<NaiveDate>, columns: Vec<Column>) -> Self {
        Self {
            timestamps,
            columns,
        }
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Number of observations (rows).
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Values of a numeric column; `None` if absent or non-numeric.
    pub fn numeric(&self, name: &str) -> Option<&[Option<f64>]> {
        self.column(name).and_then(Column::as_numeric)
    }

    /// Numeric columns in declaration order.
    pub fn numeric_columns(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> {
        self.columns
            .iter()
            .filter_map(|c| c.as_numeric().map(|v| (c.name.as_str(), v)))
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Present values of a numeric column, dropping missing and NaN cells.
pub fn present_values(values: &[Option<f64>]) -> Vec<f64> {
    values
        .iter()
        .filter_map(|v| v.filter(|x| !x.is_nan()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect()
    }

    fn sample_series() -> Series {
        Series::new(dates(3), vec![])
            .with_column(Column::text(
                "Ticker",
                vec![Some("BHP".into()), Some("BHP".into()), None],
            ))
            .with_column(Column::numeric(CLOSE, &[10.0, 11.0, 12.0]))
            .with_column(Column::numeric_opt(VOLUME, vec![Some(100.0), None, Some(300.0)]))
    }

    #[test]
    fn len_counts_rows() {
        let series = sample_series();
        assert_eq!(series.len(), 3);
        assert!(!series.is_empty());
        assert!(Series::default().is_empty());
    }

    #[test]
    fn numeric_lookup_skips_text_columns() {
        let series = sample_series();
        assert!(series.numeric("Ticker").is_none());
        assert!(series.numeric("Missing").is_none());
        assert_eq!(
            series.numeric(CLOSE).unwrap(),
            &[Some(10.0), Some(11.0), Some(12.0)]
        );
    }

    #[test]
    fn numeric_columns_in_order() {
        let series = sample_series();
        let names: Vec<&str> = series.numeric_columns().map(|(n, _)| n).collect();
        assert_eq!(names, vec![CLOSE, VOLUME]);
    }

    #[test]
    fn column_names_include_text() {
        assert_eq!(sample_series().column_names(), vec!["Ticker", CLOSE, VOLUME]);
    }

    #[test]
    fn present_values_drops_missing_and_nan() {
        let values = [Some(1.0), None, Some(f64::NAN), Some(3.0)];
        assert_eq!(present_values(&values), vec![1.0, 3.0]);
    }
}
