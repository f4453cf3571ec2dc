use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("invalid convertor config: {0}")]
    Config(String),

    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything that can make a beatmap fail to load. All of these are fatal.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("missing required section [{0}]")]
    MissingSection(&'static str),

    #[error("{record} record needs at least {expected} fields, found {found}: {line:?}")]
    FieldCount {
        record: &'static str,
        expected: usize,
        found: usize,
        line: String,
    },

    #[error("invalid {field} value {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("unrecognized hit object type bits {0:#010b}")]
    UnknownObjectType(u32),

    #[error("unrecognized slider path type {0:?}")]
    UnknownPathType(String),

    #[error("no timing points declared")]
    EmptyTimingPoints,

    #[error("first timing point at {0}ms is inherited")]
    InheritedFirstPoint(i32),

    #[error("{what} at {time}ms comes after one at {previous}ms")]
    OutOfOrder {
        what: &'static str,
        time: i32,
        previous: i32,
    },

    #[error("spinner ends at {end}ms before it starts at {start}ms")]
    SpinReversed { start: i32, end: i32 },

    #[error("slider at {time}ms would take {duration}ms per pass")]
    InvalidSlideDuration { time: i32, duration: f64 },
}

impl ParseError {
    pub(crate) fn number(field: &'static str, value: &str) -> Self {
        ParseError::InvalidNumber {
            field,
            value: value.to_string(),
        }
    }
}

/// Parses one CSV/`key:value` field, reporting which field was bad.
pub(crate) fn parse_field<T: std::str::FromStr>(
    field: &'static str,
    value: &str,
) -> std::result::Result<T, ParseError> {
    value
        .trim()
        .parse()
        .map_err(|_| ParseError::number(field, value))
}
