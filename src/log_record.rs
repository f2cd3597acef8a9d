//! Log record representation consumed by the appender.
//!
//! `FlumeLogRecord` carries what the translator needs to build a transport
//! event: the logger name, a timestamp, a level, an optional message and the
//! optional rendered frames of an associated error.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::level::FlumeLevel;

#[derive(Clone, Debug)]
pub struct FlumeLogRecord {
    /// Name of the logger that created this record.
    pub logger: String,
    /// Time the record was created.
    pub timestamp: SystemTime,
    pub level: FlumeLevel,
    /// The log message. `None` records are never delivered.
    pub message: Option<String>,
    /// Rendered error frames, one line per entry.
    pub throwable: Option<Vec<String>>,
}

impl FlumeLogRecord {
    /// Construct a record stamped with the current time.
    pub fn new(logger: &str, level: FlumeLevel, message: &str) -> Self {
        Self {
            logger: logger.to_owned(),
            timestamp: SystemTime::now(),
            level,
            message: Some(message.to_owned()),
            throwable: None,
        }
    }

    /// Construct a record without a message.
    pub fn without_message(logger: &str, level: FlumeLevel) -> Self {
        Self {
            message: None,
            ..Self::new(logger, level, "")
        }
    }

    /// Attach the rendered frames of an error.
    pub fn with_throwable<I, S>(mut self, frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.throwable = Some(frames.into_iter().map(Into::into).collect());
        self
    }

    /// Override the creation time, e.g. when replaying captured records.
    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Milliseconds since the Unix epoch; negative for pre-epoch timestamps.
    pub fn timestamp_millis(&self) -> i64 {
        match self.timestamp.duration_since(UNIX_EPOCH) {
            Ok(after) => millis_i64(after),
            Err(err) => -millis_i64(err.duration()),
        }
    }
}

fn millis_i64(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
