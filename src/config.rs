//! Configuration consumed by [`FlumeAppender`](crate::appender::FlumeAppender).
//!
//! The recognised keys mirror the log4j properties surface of the Flume
//! appender: `hostname`, `port`, `type`, `format` and `version`. Timeouts and
//! TLS are optional transport settings.

use std::time::Duration;

use crate::error::ConfigError;

/// Default connection timeout, matching the Flume RPC client.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(20);
/// Default timeout applied to each append on the wire.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
/// Default maximum encoded event size (in bytes).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1 << 20; // 1 MiB

/// Hint appended to activation failures so operators can fix their config.
pub const CONFIG_HINT: &str = "Check your appender configuration, e.g.\n\
    log4j.appender.flume.hostname=0.0.0.0\n\
    log4j.appender.flume.port=41414\n\
    log4j.appender.flume.type=error\n\
    log4j.appender.flume.format=text\n\
    log4j.appender.flume.version=1";

/// TLS connection options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlsOptions {
    /// Domain name presented during the TLS handshake.
    pub domain: String,
    /// Skip certificate validation when true (intended for tests).
    pub insecure_skip_verify: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppenderConfig {
    /// First hop the client connects to.
    pub host: String,
    /// Port on `host`; zero means unset.
    pub port: u16,
    /// Event type tag (e.g. `error`).
    pub event_type: String,
    /// Event format tag (e.g. `json`).
    pub format: String,
    /// Event version tag.
    pub version: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_frame_size: usize,
    pub tls: Option<TlsOptions>,
}

impl Default for AppenderConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 0,
            event_type: String::new(),
            format: String::new(),
            version: String::new(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            tls: None,
        }
    }
}

impl AppenderConfig {
    /// Configuration targeting `host:port` with empty tags.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Set the type, format and version tags in one go.
    pub fn with_tags(
        mut self,
        event_type: impl Into<String>,
        format: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        self.event_type = event_type.into();
        self.format = format.into();
        self.version = version.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_frame_size(mut self, max_frame_size: usize) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }

    pub fn with_tls(mut self, tls: TlsOptions) -> Self {
        self.tls = Some(tls);
        self
    }

    /// Check the fields required before a connection can be attempted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::MissingHost);
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port.to_string()));
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout {
                field: "connect_timeout",
                value: "0".into(),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout {
                field: "request_timeout",
                value: "0".into(),
            });
        }
        Ok(())
    }

    /// Apply a single `key=value` pair using the properties-file key names.
    ///
    /// Keys are case-insensitive. Timeouts are given in milliseconds.
    pub fn set_property(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "hostname" | "host" => self.host = value.to_owned(),
            "port" => self.port = parse_port(value)?,
            "type" => self.event_type = value.to_owned(),
            "format" => self.format = value.to_owned(),
            "version" => self.version = value.to_owned(),
            "connecttimeout" | "connect_timeout" => {
                self.connect_timeout = parse_millis("connect_timeout", value)?;
            }
            "requesttimeout" | "request_timeout" => {
                self.request_timeout = parse_millis("request_timeout", value)?;
            }
            other => return Err(ConfigError::UnknownProperty(other.to_owned())),
        }
        Ok(())
    }
}

fn parse_port(value: &str) -> Result<u16, ConfigError> {
    match value.parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(ConfigError::InvalidPort(value.to_owned())),
    }
}

fn parse_millis(field: &'static str, value: &str) -> Result<Duration, ConfigError> {
    match value.parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::InvalidTimeout {
            field,
            value: value.to_owned(),
        }),
    }
}
