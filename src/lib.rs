//! Log appender forwarding records to an Apache Flume collector.
//!
//! Each record is translated into a transport event (seven string headers and
//! a UTF-8 body) and sent over a single persistent connection. Delivery is
//! best effort: an unreachable collector disables the appender instead of
//! failing the caller, and a dead connection is replaced once per append.

pub mod appender;
pub mod appender_trait;
pub mod config;
pub mod error;
pub mod event;
pub mod file_config;
pub mod headers;
pub mod level;
#[cfg(feature = "log-compat")]
pub mod log_compat;
pub mod log_record;
pub mod rate_limited_warner;
pub mod transport;

#[cfg(any(test, feature = "test-util"))]
pub mod test_utils;

pub use appender::FlumeAppender;
pub use appender_trait::Appender;
pub use config::{AppenderConfig, TlsOptions};
pub use error::{ConfigError, ConnectError, DeliveryError};
pub use event::{TransportEvent, build_body, build_event, build_headers};
pub use file_config::{DEFAULT_SECTION, load_config, parse_config};
pub use headers::EventHeader;
pub use level::FlumeLevel;
#[cfg(feature = "log-compat")]
pub use log_compat::{DiagnosticSink, FlumeLogAdapter, install_adapter, install_log_bridge};
pub use log_record::FlumeLogRecord;
pub use transport::{RpcConnection, RpcConnector, TcpConnector};
