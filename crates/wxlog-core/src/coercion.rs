use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Timelike};

/// Numeric coercion for averaged fields. Anything that does not parse, and
/// NaN, is treated as missing.
pub fn coerce_numeric(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|parsed| !parsed.is_nan())
}

/// A record timestamp as written by the logger: wall-clock time plus the UTC
/// offset when the text carried one. No timezone conversion is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordTimestamp {
    pub local: NaiveDateTime,
    pub offset: Option<FixedOffset>,
}

impl RecordTimestamp {
    /// `None` when the hour cannot be placed on the UTC timeline, which only
    /// happens at the edges of the representable date range.
    pub fn floor_to_hour(&self) -> Option<HourBoundary> {
        let local = self
            .local
            .with_minute(0)?
            .with_second(0)?
            .with_nanosecond(0)?;
        let instant = match self.offset {
            Some(offset) => local
                .checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))?,
            None => local,
        };
        Some(HourBoundary {
            local,
            offset: self.offset,
            instant,
        })
    }
}

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

pub fn parse_record_timestamp(value: &str) -> Option<RecordTimestamp> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(with_offset(dt));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, fmt) {
            return Some(with_offset(dt));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(local) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(RecordTimestamp {
                local,
                offset: None,
            });
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|local| RecordTimestamp {
            local,
            offset: None,
        })
}

fn with_offset(dt: DateTime<FixedOffset>) -> RecordTimestamp {
    RecordTimestamp {
        local: dt.naive_local(),
        offset: Some(*dt.offset()),
    }
}

/// Start of the hour containing a record timestamp.
///
/// Boundaries order by the instant they denote (an offset-less boundary is
/// read as UTC), then by offset, so two boundaries compare equal only when
/// both the wall-clock hour and the offset match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HourBoundary {
    local: NaiveDateTime,
    offset: Option<FixedOffset>,
    instant: NaiveDateTime,
}

impl HourBoundary {
    pub fn local(&self) -> NaiveDateTime {
        self.local
    }

    pub fn offset(&self) -> Option<FixedOffset> {
        self.offset
    }

    pub fn offset_seconds(&self) -> Option<i32> {
        self.offset.map(|offset| offset.local_minus_utc())
    }
}

impl Ord for HourBoundary {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant
            .cmp(&other.instant)
            .then_with(|| self.offset_seconds().cmp(&other.offset_seconds()))
    }
}

impl PartialOrd for HourBoundary {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for HourBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.local.format("%Y-%m-%d %H:%M:%S"))?;
        if let Some(offset) = self.offset {
            write!(f, "{offset}")?;
        }
        Ok(())
    }
}
