//! Activation failures surface through the installed `log` bridge.
//!
//! Lives in its own test binary because a process can install only one
//! global logger.

use std::sync::Arc;

use flume_appender::{
    AppenderConfig, FlumeAppender, FlumeLevel, FlumeLogAdapter, FlumeLogRecord, install_adapter,
    test_utils::ScriptedConnector,
};
use log::LevelFilter;
use parking_lot::Mutex;

#[test]
fn bridge_reports_activation_failure() {
    let connector = ScriptedConnector::refusing();
    let appender = Arc::new(FlumeAppender::with_connector(
        AppenderConfig::new("collector.invalid", 41414),
        Arc::new(connector.clone()),
    ));
    let captured = Arc::new(Mutex::new(Vec::<String>::new()));
    let sink = Arc::clone(&captured);
    let adapter = FlumeLogAdapter::new(appender.clone(), LevelFilter::Info)
        .with_diagnostics(Arc::new(move |line: &str| sink.lock().push(line.to_owned())));

    install_adapter(adapter).expect("install logger");

    assert_eq!(connector.connect_count(), 1);
    assert!(!appender.is_configured());
    let report = captured.lock().join("\n");
    assert!(report.contains("Connection failed"), "report: {report}");
    assert!(report.contains("host:collector.invalid"), "report: {report}");
    assert!(report.contains("port:41414"), "report: {report}");
    assert!(
        report.contains("log4j.appender.flume.hostname"),
        "report: {report}"
    );

    // The disabled appender still accepts records and drops them.
    log::info!(target: "billing", "dropped");
    assert!(connector.appended().is_empty());
    let record = FlumeLogRecord::new("billing", FlumeLevel::Info, "direct");
    assert!(appender.append(&record).is_ok());
}
