pub mod aggregation;
pub mod coercion;
pub mod collector;
pub mod error;
pub mod ingestion;
pub mod outputs;
pub mod pipeline;
pub mod table;

pub use aggregation::{aggregate_hourly, HourlyRow, HourlyTable};
pub use error::{AggregateError, OutputError};
pub use pipeline::{process_batch, process_bytes, process_lines, BatchOutcome, ProcessOutcome};
