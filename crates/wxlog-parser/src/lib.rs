pub mod errors;
pub mod formats;
pub mod model;
mod registry;

pub use errors::{LineRejection, RejectionKind};
pub use formats::StationFrameParser;
pub use model::{Field, Record, NUMERIC_FIELD_COUNT, RECORD_WIDTH};
pub use registry::{parse_line, parse_line_detailed, FrameParser};
