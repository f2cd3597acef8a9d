//! Severity levels carried by [`FlumeLogRecord`](crate::log_record::FlumeLogRecord).
//!
//! Levels are ordered and map onto the integer codes log4j collectors expect
//! in the `flume.client.log4j.log.level` header.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FlumeLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
}

impl FlumeLevel {
    /// Numeric code sent on the wire.
    pub const fn code(self) -> i32 {
        match self {
            FlumeLevel::Trace => 5_000,
            FlumeLevel::Debug => 10_000,
            FlumeLevel::Info => 20_000,
            FlumeLevel::Warn => 30_000,
            FlumeLevel::Error => 40_000,
            FlumeLevel::Fatal => 50_000,
        }
    }
}

impl From<log::Level> for FlumeLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace => FlumeLevel::Trace,
            log::Level::Debug => FlumeLevel::Debug,
            log::Level::Info => FlumeLevel::Info,
            log::Level::Warn => FlumeLevel::Warn,
            log::Level::Error => FlumeLevel::Error,
        }
    }
}
