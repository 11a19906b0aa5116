use std::borrow::Cow;
use std::collections::BTreeMap;
use std::iter;

use serde::Serialize;
use tracing::debug;
use wxlog_parser::{parse_line_detailed, Record, RejectionKind};

/// Line counts from one collection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionReport {
    pub lines: usize,
    pub blank: usize,
    pub accepted: usize,
    pub rejected: BTreeMap<RejectionKind, usize>,
}

impl CollectionReport {
    pub fn rejected_total(&self) -> usize {
        self.rejected.values().sum()
    }

    pub fn rejected_for(&self, kind: RejectionKind) -> usize {
        self.rejected.get(&kind).copied().unwrap_or(0)
    }

    pub fn merge(&mut self, other: &CollectionReport) {
        self.lines += other.lines;
        self.blank += other.blank;
        self.accepted += other.accepted;
        for (kind, count) in &other.rejected {
            *self.rejected.entry(*kind).or_insert(0) += count;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CollectedRecords {
    pub records: Vec<Record>,
    pub report: CollectionReport,
}

impl CollectedRecords {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parses every line, keeping accepted records in input order.
pub fn collect_records<I>(lines: I) -> CollectedRecords
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut collected = CollectedRecords::default();

    for (idx, line) in lines.into_iter().enumerate() {
        let line = line.as_ref();
        collected.report.lines += 1;

        if line.trim().is_empty() {
            collected.report.blank += 1;
            continue;
        }

        match parse_line_detailed(line) {
            Ok(record) => {
                collected.report.accepted += 1;
                collected.records.push(record);
            }
            Err(rejection) => {
                debug!(line = idx + 1, reason = %rejection, "skipping line");
                *collected.report.rejected.entry(rejection.kind()).or_insert(0) += 1;
            }
        }
    }

    collected
}

/// Splits a raw byte buffer into lines, replacing invalid UTF-8 sequences
/// rather than failing the whole read. `\n`, `\r\n` and a bare `\r` all end
/// a line; terminators are not part of the yielded text.
pub fn decode_lines(bytes: &[u8]) -> impl Iterator<Item = Cow<'_, str>> {
    let mut rest = bytes;
    iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let (line, tail) = match rest.iter().position(|byte| matches!(byte, b'\n' | b'\r')) {
            Some(end) => {
                let width = if rest[end..].starts_with(b"\r\n") { 2 } else { 1 };
                (&rest[..end], &rest[end + width..])
            }
            None => (rest, &rest[rest.len()..]),
        };
        rest = tail;
        Some(String::from_utf8_lossy(line))
    })
}

pub fn collect_from_bytes(bytes: &[u8]) -> CollectedRecords {
    collect_records(decode_lines(bytes))
}
