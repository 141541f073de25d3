//! Optional preprocessing applied before analysis.

use crate::domain::analysis::mean;
use crate::domain::series::{present_values, Column, ColumnData, Series};

/// Replace missing numeric cells with the column mean. Text columns and
/// all-missing numeric columns are left as they are.
pub fn fill_missing_with_mean(series: Series) -> Series {
    let Series {
        timestamps,
        columns,
    } = series;

    let columns = columns
        .into_iter()
        .map(|column| match column.data {
            ColumnData::Numeric(values) => {
                let fill = mean(&present_values(&values));
                let values = values
                    .into_iter()
                    .map(|v| match v {
                        Some(x) if !x.is_nan() => Some(x),
                        _ => fill,
                    })
                    .collect();
                Column::numeric_opt(&column.name, values)
            }
            ColumnData::Text(_) => column,
        })
        .collect();

    Series::new(timestamps, columns)
}
