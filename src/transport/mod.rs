//! Transport capability used by the appender.
//!
//! The appender only needs four operations from an RPC client: connect,
//! a liveness check, append and close. [`RpcConnector`] opens connections
//! and [`RpcConnection`] is the owned handle. [`TcpConnector`] is the bundled
//! implementation: MessagePack-encoded events framed with a big-endian length
//! prefix over plain TCP or TLS.

use std::io;

use crate::{config::AppenderConfig, error::ConnectError, event::TransportEvent};

mod serialise;
mod tcp;

pub use serialise::{decode_event, encode_event, frame_payload};
pub use tcp::{TcpConnection, TcpConnector};

/// Factory for connections to the collector.
pub trait RpcConnector: Send + Sync {
    /// Open a connection to `config.host:config.port`.
    fn connect(&self, config: &AppenderConfig) -> Result<Box<dyn RpcConnection>, ConnectError>;
}

/// An open connection. Owned by exactly one appender.
pub trait RpcConnection: Send {
    /// Cheap check that the connection can still be written to.
    fn is_active(&mut self) -> bool;

    /// Send a single event.
    fn append(&mut self, event: &TransportEvent) -> io::Result<()>;

    /// Release the connection. Must tolerate repeated calls.
    fn close(&mut self);
}
