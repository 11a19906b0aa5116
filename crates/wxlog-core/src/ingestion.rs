use std::collections::HashSet;

use blake3::Hasher;
use tracing::info;
use wxlog_parser::Record;

use crate::collector::{collect_from_bytes, CollectionReport};

#[derive(Debug)]
pub struct FileInput<'a> {
    pub path: &'a str,
    pub contents: &'a [u8],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Duplicate,
    Parsed,
    Empty,
}

#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: String,
    pub hash: String,
    pub status: FileStatus,
    /// Absent for duplicates, which are never read.
    pub collection: Option<CollectionReport>,
}

#[derive(Debug, Default)]
pub struct IngestionBatch {
    pub records: Vec<Record>,
    pub reports: Vec<FileReport>,
    pub new_hashes: Vec<String>,
}

impl IngestionBatch {
    /// Line counts summed over every file that was read.
    pub fn collection_summary(&self) -> CollectionReport {
        let mut summary = CollectionReport::default();
        for report in self.reports.iter().filter_map(|r| r.collection.as_ref()) {
            summary.merge(report);
        }
        summary
    }
}

/// Collects records from several raw logs. Content already seen, either in
/// `existing_hashes` or earlier in the same batch, is reported as a duplicate
/// and skipped.
pub fn ingest_files(inputs: &[FileInput<'_>], existing_hashes: &HashSet<String>) -> IngestionBatch {
    let mut batch = IngestionBatch::default();
    let mut seen: HashSet<String> = existing_hashes.clone();

    for input in inputs {
        let hash = compute_hash(input.contents);
        if !seen.insert(hash.clone()) {
            info!(path = input.path, hash = %hash, "skipping duplicate log");
            batch.reports.push(FileReport {
                path: input.path.to_string(),
                hash,
                status: FileStatus::Duplicate,
                collection: None,
            });
            continue;
        }

        let collected = collect_from_bytes(input.contents);
        let status = if collected.is_empty() {
            FileStatus::Empty
        } else {
            FileStatus::Parsed
        };
        info!(
            path = input.path,
            accepted = collected.report.accepted,
            rejected = collected.report.rejected_total(),
            "collected records"
        );

        batch.new_hashes.push(hash.clone());
        batch.records.extend(collected.records);
        batch.reports.push(FileReport {
            path: input.path.to_string(),
            hash,
            status,
            collection: Some(collected.report),
        });
    }

    batch
}

fn compute_hash(contents: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(contents);
    let hash = hasher.finalize();
    hash.to_hex().to_string()
}
