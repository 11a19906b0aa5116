use std::collections::HashSet;

use tracing::info;

use crate::aggregation::{aggregate_hourly, HourlyTable};
use crate::collector::{collect_from_bytes, collect_records, CollectedRecords, CollectionReport};
use crate::error::AggregateError;
use crate::ingestion::{ingest_files, FileInput, FileReport};

#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub table: HourlyTable,
    pub collection: CollectionReport,
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub table: HourlyTable,
    pub files: Vec<FileReport>,
    pub new_hashes: Vec<String>,
}

/// Lines in, hourly means out.
pub fn process_lines<I>(lines: I) -> Result<ProcessOutcome, AggregateError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    finish(collect_records(lines))
}

/// Same as [`process_lines`] for an undecoded buffer such as an upload.
pub fn process_bytes(bytes: &[u8]) -> Result<ProcessOutcome, AggregateError> {
    finish(collect_from_bytes(bytes))
}

/// Aggregates the records of every non-duplicate input into one table.
pub fn process_batch(
    inputs: &[FileInput<'_>],
    existing_hashes: &HashSet<String>,
) -> Result<BatchOutcome, AggregateError> {
    let batch = ingest_files(inputs, existing_hashes);
    let summary = batch.collection_summary();
    let table = aggregate_hourly(&batch.records)?;
    log_summary(&table, &summary);

    Ok(BatchOutcome {
        table,
        files: batch.reports,
        new_hashes: batch.new_hashes,
    })
}

fn finish(collected: CollectedRecords) -> Result<ProcessOutcome, AggregateError> {
    let table = aggregate_hourly(&collected.records)?;
    log_summary(&table, &collected.report);
    Ok(ProcessOutcome {
        table,
        collection: collected.report,
    })
}

fn log_summary(table: &HourlyTable, report: &CollectionReport) {
    info!(
        hours = table.len(),
        records = table.records_used,
        dropped_timestamps = table.dropped_timestamps,
        rejected_lines = report.rejected_total(),
        "processed hourly means"
    );
}
