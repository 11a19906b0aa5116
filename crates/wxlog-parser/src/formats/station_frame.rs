use crate::errors::LineRejection;
use crate::model::Record;
use crate::registry::FrameParser;

use super::common::{
    check_arity, drop_reserved_slot, normalize_signs, split_payload, strip_checksum,
    strip_query_marker, tokenize,
};

/// Parser for the station logger's comma-separated data frames:
///
/// ```text
/// Tue 02 Jan 2024 10:15:03, \x02Q,183,2.4,181,1013.2,67,+21.5,+15.1,0.0,0.0,412,2024-01-02T10:15:00,00,0,\x03 4C
/// ```
///
/// The leading transport timestamp is discarded; the record timestamp is the
/// ISO field inside the frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct StationFrameParser;

impl StationFrameParser {
    fn tokens(line: &str) -> Result<Vec<String>, LineRejection> {
        let payload = split_payload(line)?;
        let mut tokens = tokenize(payload);
        strip_query_marker(&mut tokens);
        strip_checksum(&mut tokens);
        check_arity(&tokens)?;
        normalize_signs(&mut tokens);
        drop_reserved_slot(&mut tokens);
        Ok(tokens)
    }
}

impl FrameParser for StationFrameParser {
    fn parse(&self, line: &str) -> Result<Record, LineRejection> {
        let tokens = Self::tokens(line)?;
        let found = tokens.len();
        Record::try_from(tokens).map_err(|_| LineRejection::WrongArity {
            expected: crate::model::RECORD_WIDTH,
            found,
        })
    }
}
