use std::io::Write;
use std::path::{Path, PathBuf};

use polars::prelude::ParquetWriter;
use wxlog_parser::Field;

use crate::aggregation::HourlyTable;
use crate::error::Result;
use crate::table::HOUR_COLUMN;

/// File name used when the input has no path of its own (stdin).
pub const DEFAULT_OUTPUT_STEM: &str = "promedios_horarios";
const OUTPUT_SUFFIX: &str = "_promedios";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }
}

/// Formatting knobs for delimited output. Parquet ignores them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub delimiter: u8,
    /// Fixed number of decimals; `None` writes the shortest exact form.
    pub precision: Option<usize>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            precision: None,
        }
    }
}

/// `<dir>/<stem>_promedios.<ext>` next to the input file.
pub fn default_output_path(input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| format!("{}{OUTPUT_SUFFIX}", stem.to_string_lossy()))
        .unwrap_or_else(|| DEFAULT_OUTPUT_STEM.to_string());
    input.with_file_name(format!("{stem}.{}", format.extension()))
}

pub fn write_table<W: Write>(
    table: &HourlyTable,
    format: OutputFormat,
    writer: W,
    options: &ExportOptions,
) -> Result<()> {
    match format {
        OutputFormat::Csv => write_csv(table, writer, options),
        OutputFormat::Parquet => write_parquet(table, writer),
    }
}

/// Header `FechaHora` plus the averaged field names; missing means are
/// written as empty cells.
pub fn write_csv<W: Write>(table: &HourlyTable, writer: W, options: &ExportOptions) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_writer(writer);

    let mut header = Vec::with_capacity(Field::NUMERIC.len() + 1);
    header.push(HOUR_COLUMN);
    header.extend(Field::NUMERIC.iter().map(Field::canonical_name));
    csv_writer.write_record(&header)?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(header.len());
        record.push(row.hour.to_string());
        record.extend(row.means.iter().map(|mean| {
            mean.map(|value| format_value(value, options.precision))
                .unwrap_or_default()
        }));
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn write_parquet<W: Write>(table: &HourlyTable, writer: W) -> Result<()> {
    let mut df = table.to_dataframe()?;
    ParquetWriter::new(writer).finish(&mut df)?;
    Ok(())
}

fn format_value(value: f64, precision: Option<usize>) -> String {
    match precision {
        Some(digits) => format!("{value:.digits$}"),
        None if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 => {
            format!("{value:.1}")
        }
        None => value.to_string(),
    }
}
