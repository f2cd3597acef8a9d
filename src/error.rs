//! Error types surfaced by configuration, activation and delivery.

use std::io;

use thiserror::Error;

/// Invalid or unreadable appender configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("host must not be empty")]
    MissingHost,
    #[error("port must be between 1 and 65535, got {0}")]
    InvalidPort(String),
    #[error("{field} must be a positive number of milliseconds, got {value}")]
    InvalidTimeout { field: &'static str, value: String },
    #[error("unknown appender property: {0}")]
    UnknownProperty(String),
    #[error("section [{0}] not found")]
    MissingSection(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{path} is invalid: {message}")]
    Parse { path: String, message: String },
    #[error("{path} could not be decoded as {encoding}")]
    Encoding { path: String, encoding: String },
}

/// Failure to open a connection to the collector.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
    #[error("could not resolve {host}:{port}: {source}")]
    Resolve {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("connection failed on {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("TLS handshake failed: {0}")]
    Tls(String),
}

/// Failure to hand an event to a connection believed to be alive.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("no active connection to the collector")]
    NotConnected,
    #[error("flume append failed: {source}")]
    Send {
        #[source]
        source: io::Error,
    },
}
