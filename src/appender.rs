//! Appender delivering log records to a Flume collector.
//!
//! [`FlumeAppender`] owns at most one connection to the collector. Activation
//! failures are logged and leave the appender disabled: records are dropped
//! silently rather than failing the logging call site. Once active, each
//! append checks the connection, reconnects once if it has died, and
//! surfaces send failures to the caller.
//!
//! `append`, `activate`, `close` and the internal reconnect all run under the
//! same lock, so no two threads reconnect at once and no record is written
//! through a connection another thread is closing.

use std::{fmt, sync::Arc};

use log::{debug, error, warn};
use parking_lot::Mutex;

use crate::{
    config::{AppenderConfig, CONFIG_HINT},
    error::{ConfigError, ConnectError, DeliveryError},
    event::build_event,
    log_record::FlumeLogRecord,
    rate_limited_warner::RateLimitedWarner,
    transport::{RpcConnection, RpcConnector, TcpConnector},
};

#[derive(Default)]
struct ChannelState {
    /// True only after a successful activation.
    configured: bool,
    /// Present only while `configured` is true.
    connection: Option<Box<dyn RpcConnection>>,
}

/// Appender forwarding records to a collector as transport events.
pub struct FlumeAppender {
    config: AppenderConfig,
    connector: Arc<dyn RpcConnector>,
    state: Mutex<ChannelState>,
    warner: RateLimitedWarner,
}

impl Default for FlumeAppender {
    /// An unconfigured appender. Set `host` and `port`, then call
    /// [`activate`](FlumeAppender::activate) before appending.
    fn default() -> Self {
        Self::new(AppenderConfig::default())
    }
}

impl FlumeAppender {
    /// Construct an appender using the bundled TCP transport.
    ///
    /// The appender is inert until [`activate`](Self::activate) is called.
    pub fn new(config: AppenderConfig) -> Self {
        Self::with_connector(config, Arc::new(TcpConnector))
    }

    /// Construct an appender opening connections through `connector`.
    pub fn with_connector(config: AppenderConfig, connector: Arc<dyn RpcConnector>) -> Self {
        Self {
            config,
            connector,
            state: Mutex::new(ChannelState::default()),
            warner: RateLimitedWarner::default(),
        }
    }

    pub fn config(&self) -> &AppenderConfig {
        &self.config
    }

    pub fn set_host(&mut self, host: impl Into<String>) {
        self.config.host = host.into();
    }

    pub fn set_port(&mut self, port: u16) {
        self.config.port = port;
    }

    pub fn set_type(&mut self, event_type: impl Into<String>) {
        self.config.event_type = event_type.into();
    }

    pub fn set_format(&mut self, format: impl Into<String>) {
        self.config.format = format.into();
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.config.version = version.into();
    }

    /// Apply a properties-style option. See [`AppenderConfig::set_property`].
    ///
    /// Changes take effect on the next activation.
    pub fn set_property(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.config.set_property(key, value)
    }

    /// Open the connection described by the configuration.
    ///
    /// On failure the error is logged and returned for inspection, and the
    /// appender stays disabled: later appends drop records silently. Any
    /// previously open connection is closed first.
    pub fn activate(&self) -> Result<(), ConnectError> {
        let mut state = self.state.lock();
        self.activate_locked(&mut state)
    }

    /// Deliver `record` to the collector.
    ///
    /// Records without a message, and any record while the appender is not
    /// configured, are dropped and reported as success. A dead connection is
    /// replaced once before sending; send failures are returned.
    pub fn append(&self, record: &FlumeLogRecord) -> Result<(), DeliveryError> {
        if record.message.is_none() {
            return Ok(());
        }

        let mut state = self.state.lock();
        if !state.configured {
            self.warner.record_drop();
            self.warner.warn_if_due(|count| {
                warn!("FlumeAppender dropped {count} records; appender is not configured");
            });
            return Ok(());
        }

        let alive = state
            .connection
            .as_mut()
            .is_some_and(|connection| connection.is_active());
        if !alive {
            debug!(
                "FlumeAppender connection to {}:{} is not active; reconnecting",
                self.config.host, self.config.port
            );
            let _ = self.reconnect_locked(&mut state);
        }

        let event = build_event(record, &self.config);
        let Some(connection) = state.connection.as_mut() else {
            error!("Flume append() failed: no active connection");
            return Err(DeliveryError::NotConnected);
        };
        connection.append(&event).map_err(|source| {
            error!("Flume append() failed: {source}");
            DeliveryError::Send { source }
        })
    }

    /// Close the connection, if any. Safe to call repeatedly.
    pub fn close(&self) {
        let mut state = self.state.lock();
        Self::close_locked(&mut state);
    }

    /// Report pending drop counts. Returns whether a connection is open.
    pub fn flush(&self) -> bool {
        self.warner.flush(|count| {
            warn!("FlumeAppender dropped {count} records in the last interval");
        });
        self.is_connected()
    }

    /// Records are rendered from their fields, never through a layout.
    pub fn requires_layout(&self) -> bool {
        false
    }

    pub fn is_configured(&self) -> bool {
        self.state.lock().configured
    }

    pub fn is_connected(&self) -> bool {
        self.state.lock().connection.is_some()
    }

    fn activate_locked(&self, state: &mut ChannelState) -> Result<(), ConnectError> {
        Self::close_locked(state);
        match self.connector.connect(&self.config) {
            Ok(connection) => {
                state.connection = Some(connection);
                state.configured = true;
                debug!(
                    "FlumeAppender activated for {}:{}",
                    self.config.host, self.config.port
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "[Flume] Client configuration failed! Connection failed on host:{}, port:{}: {err}\n{CONFIG_HINT}",
                    self.config.host, self.config.port
                );
                Err(err)
            }
        }
    }

    fn reconnect_locked(&self, state: &mut ChannelState) -> Result<(), ConnectError> {
        Self::close_locked(state);
        self.activate_locked(state)
    }

    fn close_locked(state: &mut ChannelState) {
        if let Some(mut connection) = state.connection.take() {
            connection.close();
        }
        state.configured = false;
    }
}

impl Drop for FlumeAppender {
    fn drop(&mut self) {
        Self::close_locked(self.state.get_mut());
    }
}

impl fmt::Debug for FlumeAppender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlumeAppender")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
