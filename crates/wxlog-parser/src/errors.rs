use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Why a raw line did not produce a [`crate::Record`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineRejection {
    #[error("line does not start with a logger timestamp preamble")]
    MissingPreamble,

    #[error("preamble is not followed by a comma-separated payload")]
    MissingDelimiter,

    #[error("expected {expected} payload tokens, found {found}")]
    WrongArity { expected: usize, found: usize },
}

impl LineRejection {
    pub fn kind(&self) -> RejectionKind {
        match self {
            LineRejection::MissingPreamble => RejectionKind::MissingPreamble,
            LineRejection::MissingDelimiter => RejectionKind::MissingDelimiter,
            LineRejection::WrongArity { .. } => RejectionKind::WrongArity,
        }
    }
}

/// Payload-free classification of a [`LineRejection`], suitable as a counter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    MissingPreamble,
    MissingDelimiter,
    WrongArity,
}

impl RejectionKind {
    pub const ALL: [RejectionKind; 3] = [
        RejectionKind::MissingPreamble,
        RejectionKind::MissingDelimiter,
        RejectionKind::WrongArity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionKind::MissingPreamble => "missing_preamble",
            RejectionKind::MissingDelimiter => "missing_delimiter",
            RejectionKind::WrongArity => "wrong_arity",
        }
    }
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
