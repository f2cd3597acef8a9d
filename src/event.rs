//! Translation of log records into transport events.
//!
//! Nothing here touches the network: the functions are pure and
//! deterministic for a given record and configuration.

use std::collections::BTreeMap;

use crate::{config::AppenderConfig, headers::EventHeader, log_record::FlumeLogRecord};

/// Value of the message encoding header. Bodies are always UTF-8.
pub const MESSAGE_ENCODING: &str = "UTF8";

/// Wire-ready unit delivered to the collector.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransportEvent {
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl TransportEvent {
    pub fn header(&self, name: EventHeader) -> Option<&str> {
        self.headers.get(name.as_str()).map(String::as_str)
    }

    /// Body as text. Lossy only if a connection fabricated invalid bytes.
    pub fn body_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Build the seven headers describing `record`.
pub fn build_headers(record: &FlumeLogRecord, config: &AppenderConfig) -> BTreeMap<String, String> {
    EventHeader::ALL
        .into_iter()
        .map(|header| {
            let value = match header {
                EventHeader::LoggerName => record.logger.clone(),
                EventHeader::Timestamp => record.timestamp_millis().to_string(),
                EventHeader::LogLevel => record.level.code().to_string(),
                EventHeader::MessageEncoding => MESSAGE_ENCODING.to_owned(),
                EventHeader::Type => config.event_type.clone(),
                EventHeader::Format => config.format.clone(),
                EventHeader::Version => config.version.clone(),
            };
            (header.as_str().to_owned(), value)
        })
        .collect()
}

/// Render the message followed by any error frames, one per line.
///
/// A record without frames yields the message verbatim, with no trailing
/// newline.
pub fn build_body(record: &FlumeLogRecord) -> String {
    let message = record.message.as_deref().unwrap_or_default();
    let Some(frames) = &record.throwable else {
        return message.to_owned();
    };
    let capacity = message.len() + 1 + frames.iter().map(|f| f.len() + 1).sum::<usize>();
    let mut body = String::with_capacity(capacity);
    body.push_str(message);
    body.push('\n');
    for frame in frames {
        body.push_str(frame);
        body.push('\n');
    }
    body
}

pub fn build_event(record: &FlumeLogRecord, config: &AppenderConfig) -> TransportEvent {
    TransportEvent {
        headers: build_headers(record, config),
        body: build_body(record).into_bytes(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::level::FlumeLevel;

    #[fixture]
    fn tagged_config() -> AppenderConfig {
        AppenderConfig::new("collector", 41414).with_tags("t", "f", "1")
    }

    fn record_at(message: &str, millis: u64) -> FlumeLogRecord {
        FlumeLogRecord::new("app.core", FlumeLevel::Info, message)
            .with_timestamp(UNIX_EPOCH + Duration::from_millis(millis))
    }

    #[rstest]
    fn info_record_without_error(tagged_config: AppenderConfig) {
        let event = build_event(&record_at("hello", 1_700_000_000_000), &tagged_config);

        let expected: BTreeMap<String, String> = [
            ("flume.client.log4j.logger.name", "app.core"),
            ("flume.client.log4j.timestamp", "1700000000000"),
            ("flume.client.log4j.log.level", "20000"),
            ("flume.client.log4j.message.encoding", "UTF8"),
            ("flume.client.log4j.type", "t"),
            ("flume.client.log4j.format", "f"),
            ("flume.client.log4j.version", "1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();
        assert_eq!(event.headers, expected);
        assert_eq!(event.body, b"hello");
    }

    #[rstest]
    fn error_frames_follow_message(tagged_config: AppenderConfig) {
        let record = record_at("boom", 0)
            .with_throwable(["java.lang.RuntimeException: x", "\tat A.b"]);
        let event = build_event(&record, &tagged_config);
        assert_eq!(event.body_str(), "boom\njava.lang.RuntimeException: x\n\tat A.b\n");
    }

    #[test]
    fn empty_frame_list_still_adds_separator() {
        let record = record_at("boom", 0).with_throwable(Vec::<String>::new());
        assert_eq!(build_body(&record), "boom\n");
    }

    #[test]
    fn empty_tags_are_kept() {
        let config = AppenderConfig::new("collector", 41414);
        let headers = build_headers(&record_at("x", 0), &config);
        assert_eq!(headers.len(), 7);
        assert_eq!(headers["flume.client.log4j.type"], "");
        assert_eq!(headers["flume.client.log4j.format"], "");
        assert_eq!(headers["flume.client.log4j.version"], "");
    }

    proptest! {
        #[test]
        fn headers_always_complete(
            logger in ".*",
            millis in 0u64..4_000_000_000_000,
            event_type in ".*",
            format in ".*",
            version in ".*",
        ) {
            let config = AppenderConfig::new("h", 1).with_tags(&event_type, &format, &version);
            let mut record = record_at("m", millis);
            record.logger = logger.clone();
            let headers = build_headers(&record, &config);
            prop_assert_eq!(headers.len(), 7);
            prop_assert_eq!(headers[EventHeader::MessageEncoding.as_str()].as_str(), "UTF8");
            prop_assert_eq!(&headers[EventHeader::LoggerName.as_str()], &logger);
            prop_assert_eq!(&headers[EventHeader::Timestamp.as_str()], &millis.to_string());
            prop_assert_eq!(&headers[EventHeader::Type.as_str()], &event_type);
            prop_assert_eq!(&headers[EventHeader::Format.as_str()], &format);
            prop_assert_eq!(&headers[EventHeader::Version.as_str()], &version);
        }

        #[test]
        fn body_appends_each_frame_with_newline(
            message in ".*",
            frames in proptest::option::of(proptest::collection::vec(".*", 0..8)),
        ) {
            let mut record = record_at(&message, 0);
            record.throwable = frames.clone();
            let body = build_body(&record);
            let expected = match frames {
                None => message.clone(),
                Some(frames) => {
                    let mut s = format!("{message}\n");
                    for frame in frames {
                        s.push_str(&frame);
                        s.push('\n');
                    }
                    s
                }
            };
            prop_assert_eq!(body, expected);
        }
    }
}
