use crate::errors::LineRejection;
use crate::formats::StationFrameParser;
use crate::model::Record;

pub trait FrameParser {
    fn parse(&self, line: &str) -> Result<Record, LineRejection>;
}

/// Decodes one raw log line, reporting why it was rejected.
pub fn parse_line_detailed(line: &str) -> Result<Record, LineRejection> {
    StationFrameParser.parse(line)
}

/// Decodes one raw log line. Noise lines (banners, partial frames, control
/// messages) yield `None`.
pub fn parse_line(line: &str) -> Option<Record> {
    parse_line_detailed(line).ok()
}
