//! Compatibility bridge for the Rust `log` crate.
//!
//! This module provides `FlumeLogAdapter`, an implementation of `log::Log`
//! that converts each `log::Record` into a [`FlumeLogRecord`] and hands it to
//! an [`Appender`]. Diagnostics emitted by this crate go to a diagnostics sink
//! (stderr unless replaced) instead of being appended, so a failing collector
//! cannot feed its own error messages back into itself.

use std::borrow::Cow;
use std::sync::Arc;

use log::{LevelFilter, Metadata, Record, SetLoggerError};

use crate::appender_trait::Appender;
use crate::level::FlumeLevel;
use crate::log_record::FlumeLogRecord;
use crate::rate_limited_warner::RateLimitedWarner;

const CRATE_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Receives the crate's own diagnostics once they have been formatted.
pub type DiagnosticSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Adapter implementing the Rust `log::Log` trait on top of an [`Appender`].
pub struct FlumeLogAdapter {
    appender: Arc<dyn Appender>,
    max_level: LevelFilter,
    warner: RateLimitedWarner,
    diagnostics: DiagnosticSink,
}

fn normalise_target(target: &str) -> Cow<'_, str> {
    if target.contains("::") {
        Cow::Owned(target.replace("::", "."))
    } else {
        Cow::Borrowed(target)
    }
}

fn is_internal(target: &str) -> bool {
    target
        .strip_prefix(CRATE_TARGET)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

fn stderr_sink() -> DiagnosticSink {
    Arc::new(|line: &str| eprintln!("{line}"))
}

impl FlumeLogAdapter {
    pub fn new(appender: Arc<dyn Appender>, max_level: LevelFilter) -> Self {
        Self {
            appender,
            max_level,
            warner: RateLimitedWarner::default(),
            diagnostics: stderr_sink(),
        }
    }

    /// Route internal diagnostics to `sink` instead of stderr.
    pub fn with_diagnostics(mut self, sink: DiagnosticSink) -> Self {
        self.diagnostics = sink;
        self
    }

    /// Convert a `log` record into the appender's record type.
    pub fn convert(record: &Record<'_>) -> FlumeLogRecord {
        FlumeLogRecord::new(
            normalise_target(record.target()).as_ref(),
            FlumeLevel::from(record.level()),
            &record.args().to_string(),
        )
    }

    fn report(&self, line: &str) {
        (self.diagnostics)(line);
    }
}

impl log::Log for FlumeLogAdapter {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if is_internal(record.target()) {
            if record.level() <= log::Level::Warn {
                self.report(&format!(
                    "{CRATE_TARGET}: {} {}",
                    record.level(),
                    record.args()
                ));
            }
            return;
        }
        if let Err(err) = self.appender.append(&Self::convert(record)) {
            self.warner.record_drop();
            self.warner.warn_if_due(|count| {
                self.report(&format!(
                    "{CRATE_TARGET}: {count} records lost; last error: {err}"
                ));
            });
        }
    }

    fn flush(&self) {
        self.warner.flush(|count| {
            self.report(&format!(
                "{CRATE_TARGET}: {count} records lost since the last report"
            ));
        });
    }
}

/// Install `appender` as the global `log` logger, then activate it.
///
/// The logger is installed before activation so that an activation failure
/// is reported through the adapter's diagnostics. A failed activation leaves
/// the appender disabled but installed: logging calls keep working and
/// records are dropped.
pub fn install_log_bridge(
    appender: Arc<dyn Appender>,
    max_level: LevelFilter,
) -> Result<(), SetLoggerError> {
    install_adapter(FlumeLogAdapter::new(appender, max_level))
}

/// Install a configured adapter globally, then activate its appender.
pub fn install_adapter(adapter: FlumeLogAdapter) -> Result<(), SetLoggerError> {
    let appender = Arc::clone(&adapter.appender);
    let max_level = adapter.max_level;
    log::set_boxed_logger(Box::new(adapter))?;
    log::set_max_level(max_level);
    // activate logs its own failure through the adapter installed above.
    let _ = appender.activate();
    Ok(())
}

#[cfg(test)]
mod tests {
    use log::Log;

    use super::*;
    use crate::{
        appender::FlumeAppender, config::AppenderConfig, event::TransportEvent,
        headers::EventHeader, test_utils::ScriptedConnector,
    };

    fn adapter(connector: &ScriptedConnector, max_level: LevelFilter) -> FlumeLogAdapter {
        let appender = FlumeAppender::with_connector(
            AppenderConfig::new("collector", 41414),
            Arc::new(connector.clone()),
        );
        appender.activate().expect("activate");
        FlumeLogAdapter::new(Arc::new(appender), max_level)
    }

    fn header<'a>(event: &'a TransportEvent, name: EventHeader) -> &'a str {
        event.header(name).expect("header present")
    }

    #[test]
    fn forwards_records_with_normalised_target() {
        let connector = ScriptedConnector::new();
        let adapter = adapter(&connector, LevelFilter::Info);
        adapter.log(
            &Record::builder()
                .args(format_args!("hello"))
                .level(log::Level::Warn)
                .target("app::db")
                .build(),
        );
        let sent = connector.appended();
        assert_eq!(sent.len(), 1);
        assert_eq!(header(&sent[0], EventHeader::LoggerName), "app.db");
        assert_eq!(header(&sent[0], EventHeader::LogLevel), "30000");
        assert_eq!(sent[0].body, b"hello");
    }

    #[test]
    fn respects_max_level() {
        let connector = ScriptedConnector::new();
        let adapter = adapter(&connector, LevelFilter::Warn);
        adapter.log(
            &Record::builder()
                .args(format_args!("chatty"))
                .level(log::Level::Debug)
                .target("app")
                .build(),
        );
        assert!(connector.appended().is_empty());
    }

    #[test]
    fn internal_diagnostics_are_not_appended() {
        let connector = ScriptedConnector::new();
        let adapter = adapter(&connector, LevelFilter::Trace);
        adapter.log(
            &Record::builder()
                .args(format_args!("Flume append() failed"))
                .level(log::Level::Error)
                .target("flume_appender::appender")
                .build(),
        );
        assert!(connector.appended().is_empty());
    }

    #[test]
    fn internal_warnings_reach_the_diagnostic_sink() {
        let connector = ScriptedConnector::new();
        let captured = Arc::new(parking_lot::Mutex::new(Vec::<String>::new()));
        let sink = Arc::clone(&captured);
        let adapter = adapter(&connector, LevelFilter::Info)
            .with_diagnostics(Arc::new(move |line: &str| sink.lock().push(line.to_owned())));
        adapter.log(
            &Record::builder()
                .args(format_args!("Connection failed on host:collector"))
                .level(log::Level::Error)
                .target("flume_appender::appender")
                .build(),
        );
        adapter.log(
            &Record::builder()
                .args(format_args!("connected"))
                .level(log::Level::Info)
                .target("flume_appender::transport::tcp")
                .build(),
        );
        let lines = captured.lock().clone();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("ERROR Connection failed on host:collector"));
        assert!(connector.appended().is_empty());
    }

    #[test]
    fn similarly_named_targets_are_forwarded() {
        assert!(is_internal("flume_appender"));
        assert!(is_internal("flume_appender::transport::tcp"));
        assert!(!is_internal("flume_appender_ext"));
    }
}
