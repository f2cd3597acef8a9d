//! Header keys attached to every transport event.

use std::fmt;

/// Closed set of header names understood by log4j-aware Flume collectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventHeader {
    LoggerName,
    Timestamp,
    LogLevel,
    MessageEncoding,
    Type,
    Format,
    Version,
}

impl EventHeader {
    /// Every header, in the order they are documented.
    pub const ALL: [EventHeader; 7] = [
        EventHeader::LoggerName,
        EventHeader::Timestamp,
        EventHeader::LogLevel,
        EventHeader::MessageEncoding,
        EventHeader::Type,
        EventHeader::Format,
        EventHeader::Version,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            EventHeader::LoggerName => "flume.client.log4j.logger.name",
            EventHeader::Timestamp => "flume.client.log4j.timestamp",
            EventHeader::LogLevel => "flume.client.log4j.log.level",
            EventHeader::MessageEncoding => "flume.client.log4j.message.encoding",
            EventHeader::Type => "flume.client.log4j.type",
            EventHeader::Format => "flume.client.log4j.format",
            EventHeader::Version => "flume.client.log4j.version",
        }
    }
}

impl fmt::Display for EventHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for EventHeader {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
