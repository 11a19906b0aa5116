use std::collections::BTreeMap;

use tracing::{debug, warn};
use wxlog_parser::{Field, Record, NUMERIC_FIELD_COUNT};

use crate::coercion::{coerce_numeric, parse_record_timestamp, HourBoundary};
use crate::error::AggregateError;

/// Hourly means for one hour boundary. `None` marks a field with no valid
/// value in that hour.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyRow {
    pub hour: HourBoundary,
    pub means: [Option<f64>; NUMERIC_FIELD_COUNT],
}

impl HourlyRow {
    /// Mean for a numeric field; `None` for missing values and for the
    /// non-averaged fields.
    pub fn mean(&self, field: Field) -> Option<f64> {
        if field.is_numeric() {
            self.means[field.index()]
        } else {
            None
        }
    }
}

/// Ordered hourly rows plus the bookkeeping from building them.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyTable {
    pub rows: Vec<HourlyRow>,
    /// Records that were bucketed.
    pub records_used: usize,
    /// Records dropped because their FechaISO could not be parsed.
    pub dropped_timestamps: usize,
}

impl HourlyTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_offsets(&self) -> bool {
        self.rows.iter().any(|row| row.hour.offset().is_some())
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

type HourBucket = [MeanAccumulator; NUMERIC_FIELD_COUNT];

/// Buckets records by the hour of their FechaISO and averages each numeric
/// field within the bucket. Rows come back in ascending hour order.
pub fn aggregate_hourly(records: &[Record]) -> Result<HourlyTable, AggregateError> {
    if records.is_empty() {
        return Err(AggregateError::NoValidRecords);
    }

    let mut buckets: BTreeMap<HourBoundary, HourBucket> = BTreeMap::new();
    let mut dropped_timestamps = 0usize;

    for record in records {
        let Some(hour) = parse_record_timestamp(record.fecha_iso())
            .and_then(|timestamp| timestamp.floor_to_hour())
        else {
            warn!(
                fecha_iso = record.fecha_iso(),
                "dropping record with unparseable timestamp"
            );
            dropped_timestamps += 1;
            continue;
        };

        let bucket = buckets.entry(hour).or_default();
        for field in Field::NUMERIC {
            match coerce_numeric(record.get(field)) {
                Some(value) => bucket[field.index()].push(value),
                None => debug!(
                    field = field.canonical_name(),
                    value = record.get(field),
                    "field treated as missing"
                ),
            }
        }
    }

    if buckets.is_empty() {
        return Err(AggregateError::NoValidTimestamps {
            records: records.len(),
        });
    }

    let rows = buckets
        .into_iter()
        .map(|(hour, bucket)| HourlyRow {
            hour,
            means: bucket.map(|acc| acc.mean()),
        })
        .collect();

    Ok(HourlyTable {
        rows,
        records_used: records.len() - dropped_timestamps,
        dropped_timestamps,
    })
}
