use thiserror::Error;

use crate::zones::ZoneId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("unknown aircraft type '{0}'")]
    UnknownAircraft(String),

    #[error("runway must be split into at least one zone")]
    NoZones,

    #[error("zone {0} is not part of the runway")]
    UnknownZone(ZoneId),

    #[error(
        "tick interval of {interval_minutes} min with ±{jitter_minutes} min jitter can stall or reverse the clock"
    )]
    NonPositiveInterval {
        interval_minutes: i64,
        jitter_minutes: i64,
    },

    #[error("invalid range for {field}: [{min}, {max}]")]
    InvalidRange { field: String, min: f64, max: f64 },

    #[error("aircraft catalog is empty")]
    EmptyCatalog,

    #[error("aircraft type '{0}' defined more than once")]
    DuplicateAircraft(String),

    #[error("aircraft '{code}' has invalid {factor}: {value}")]
    InvalidFactor {
        code: String,
        factor: &'static str,
        value: f64,
    },

    #[error("simulated window must be at least one hour long")]
    InvalidDuration,

    #[error("schedule {field} of {value} does not fit on the calendar")]
    ScheduleOutOfRange { field: &'static str, value: i64 },

    #[error("month {0} is outside 1..=12")]
    InvalidMonth(u32),
}

pub type SimResult<T> = std::result::Result<T, SimError>;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("record io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("record json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected csv header: {0}")]
    Header(String),

    #[error("line {line}: expected {expected} columns, found {found}")]
    Column {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: invalid {column} value '{value}'")]
    Field {
        line: usize,
        column: &'static str,
        value: String,
    },
}
