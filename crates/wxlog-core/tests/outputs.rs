use std::io::Cursor;

use anyhow::Result;
use polars::prelude::*;
use wxlog_core::outputs::{write_csv, write_parquet, write_table, ExportOptions, OutputFormat};
use wxlog_core::table::{HOUR_COLUMN, OFFSET_COLUMN};
use wxlog_core::{process_bytes, process_lines, HourlyTable};

fn fixture_table() -> HourlyTable {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../wxlog-parser/tests/data/station_sample.txt");
    let bytes = std::fs::read(path).expect("read fixture");
    process_bytes(&bytes).expect("fixture aggregates").table
}

#[test]
fn csv_matches_expected_layout() -> Result<()> {
    let mut buffer = Vec::new();
    write_csv(&fixture_table(), &mut buffer, &ExportOptions::default())?;

    let expected = "\
FechaHora,DirViento,VelViento,DirVientoCorr,Presion,Humedad,Temp,PuntoRocio,PrecipTotal,IntensidadPrec,Irradiancia
2024-01-02 09:00:00,190.0,1.0,190.0,1014.0,50.0,10.0,5.0,0.0,0.0,100.0
2024-01-02 10:00:00,185.0,3.0,186.0,1014.0,65.0,21.0,15.5,0.1,0.5,450.0
2024-01-02 11:00:00,205.0,4.0,206.0,1011.5,80.0,-2.0,-5.0,0.5,0.25,5.0
";
    assert_eq!(String::from_utf8(buffer)?, expected);
    Ok(())
}

#[test]
fn csv_honours_delimiter_and_precision() -> Result<()> {
    let options = ExportOptions {
        delimiter: b';',
        precision: Some(2),
    };
    let mut buffer = Vec::new();
    write_table(&fixture_table(), OutputFormat::Csv, &mut buffer, &options)?;

    let text = String::from_utf8(buffer)?;
    let mut lines = text.lines();
    assert!(lines
        .next()
        .is_some_and(|header| header.starts_with("FechaHora;DirViento;")));
    assert_eq!(
        lines.next(),
        Some("2024-01-02 09:00:00;190.00;1.00;190.00;1014.00;50.00;10.00;5.00;0.00;0.00;100.00")
    );
    Ok(())
}

#[test]
fn missing_means_are_empty_cells() -> Result<()> {
    let frame = "Tue 02 Jan 2024 10:15:03, Q,180,2.0,181,1013.0,///,+20.0,+15.0,0.0,0.0,400,2024-01-02T10:15:00,00,OK";
    let table = process_lines([frame])?.table;

    let mut buffer = Vec::new();
    write_csv(&table, &mut buffer, &ExportOptions::default())?;
    let text = String::from_utf8(buffer)?;
    assert_eq!(
        text.lines().nth(1),
        Some("2024-01-02 10:00:00,180.0,2.0,181.0,1013.0,,20.0,15.0,0.0,0.0,400.0")
    );
    Ok(())
}

#[test]
fn dataframe_exposes_hour_and_numeric_columns() -> Result<()> {
    let df = fixture_table().to_dataframe()?;

    assert_eq!(df.height(), 3);
    assert_eq!(df.width(), 11);
    assert_eq!(df.get_column_names()[0].as_str(), HOUR_COLUMN);
    assert!(df.column(OFFSET_COLUMN).is_err());

    let temps: Vec<Option<f64>> = df.column("Temp")?.f64()?.into_iter().collect();
    assert_eq!(temps, vec![Some(10.0), Some(21.0), Some(-2.0)]);
    assert!(matches!(
        df.column(HOUR_COLUMN)?.dtype(),
        DataType::Datetime(TimeUnit::Microseconds, None)
    ));
    Ok(())
}

#[test]
fn dataframe_carries_offsets_when_present() -> Result<()> {
    let frame = "Tue 02 Jan 2024 10:15:03, Q,180,2.0,181,1013.0,60,+20.0,+15.0,0.0,0.0,400,2024-01-02T10:15:00+02:00,00,OK";
    let df = process_lines([frame])?.table.to_dataframe()?;

    let offsets: Vec<Option<i32>> = df.column(OFFSET_COLUMN)?.i32()?.into_iter().collect();
    assert_eq!(offsets, vec![Some(7200)]);
    Ok(())
}

#[test]
fn parquet_output_reads_back() -> Result<()> {
    let table = fixture_table();
    let mut buffer = Vec::new();
    write_parquet(&table, &mut buffer)?;

    let df = ParquetReader::new(Cursor::new(buffer)).finish()?;
    assert_eq!(df.height(), table.len());
    let humidity: Vec<Option<f64>> = df.column("Humedad")?.f64()?.into_iter().collect();
    assert_eq!(humidity, vec![Some(50.0), Some(65.0), Some(80.0)]);
    Ok(())
}
