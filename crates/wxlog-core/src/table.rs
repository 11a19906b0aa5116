use polars::prelude::*;
use wxlog_parser::Field;

use crate::aggregation::HourlyTable;

pub const HOUR_COLUMN: &str = "FechaHora";
pub const OFFSET_COLUMN: &str = "utc_offset_seconds";

impl HourlyTable {
    /// Converts the table into a DataFrame with one row per hour:
    /// `FechaHora` (wall-clock datetime) followed by the ten averaged fields.
    /// A `utc_offset_seconds` column is appended when any hour carries an
    /// offset.
    pub fn to_dataframe(&self) -> Result<DataFrame, PolarsError> {
        let hours: Vec<i64> = self
            .rows
            .iter()
            .map(|row| row.hour.local().and_utc().timestamp_micros())
            .collect();
        let hour_series = Series::new(HOUR_COLUMN.into(), hours)
            .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;

        let mut columns: Vec<Column> = Vec::with_capacity(Field::NUMERIC.len() + 2);
        columns.push(hour_series.into());

        for field in Field::NUMERIC {
            let values: Vec<Option<f64>> = self.rows.iter().map(|row| row.mean(field)).collect();
            columns.push(Series::new(field.canonical_name().into(), values).into());
        }

        if self.has_offsets() {
            let offsets: Vec<Option<i32>> = self
                .rows
                .iter()
                .map(|row| row.hour.offset_seconds())
                .collect();
            columns.push(Series::new(OFFSET_COLUMN.into(), offsets).into());
        }

        DataFrame::new(columns)
    }
}
