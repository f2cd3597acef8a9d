//! TCP and TLS connections to the collector.

use std::{
    io::{self, Read, Write},
    net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs},
    time::Duration,
};

use log::debug;
use native_tls::{TlsConnector, TlsStream};

use crate::{
    config::{AppenderConfig, TlsOptions},
    error::ConnectError,
    event::TransportEvent,
};

use super::{
    RpcConnection, RpcConnector,
    serialise::{encode_event, frame_payload},
};

/// Connector opening [`TcpConnection`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct TcpConnector;

impl RpcConnector for TcpConnector {
    fn connect(&self, config: &AppenderConfig) -> Result<Box<dyn RpcConnection>, ConnectError> {
        config.validate()?;
        let stream = connect_tcp(config)?;
        let stream = match &config.tls {
            Some(tls) => Stream::Tls(Box::new(handshake(tls, stream, config.connect_timeout)?)),
            None => Stream::Plain(stream),
        };
        stream
            .tcp()
            .set_write_timeout(Some(config.request_timeout))
            .map_err(|source| connect_error(config, source))?;
        debug!("flume connection opened to {}:{}", config.host, config.port);
        Ok(Box::new(TcpConnection {
            stream: Some(stream),
            max_frame_size: config.max_frame_size,
            broken: false,
        }))
    }
}

enum Stream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl Stream {
    fn tcp(&self) -> &TcpStream {
        match self {
            Stream::Plain(stream) => stream,
            Stream::Tls(stream) => stream.get_ref(),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            Stream::Plain(stream) => stream.write_all(buf),
            Stream::Tls(stream) => stream.write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Stream::Plain(stream) => stream.flush(),
            Stream::Tls(stream) => stream.flush(),
        }
    }
}

/// Connection writing length-prefixed MessagePack frames.
pub struct TcpConnection {
    stream: Option<Stream>,
    max_frame_size: usize,
    broken: bool,
}

/// Reads spent discarding unsolicited bytes in one liveness check.
const MAX_DRAIN_READS: usize = 64;

impl TcpConnection {
    /// Report whether the peer has performed an orderly shutdown.
    ///
    /// The collector never sends application data. On a plain connection any
    /// pending bytes are read and discarded until the socket would block or
    /// reports end of stream, so data queued ahead of a FIN cannot hide the
    /// shutdown. TLS connections are only peeked because reading below the
    /// TLS layer would corrupt its record stream. A TLS peer that sends
    /// records (such as TLS 1.3 session tickets) and then closes therefore
    /// stays active until the next write fails and marks it broken.
    fn peer_closed(stream: &Stream) -> bool {
        let tcp = stream.tcp();
        if tcp.set_nonblocking(true).is_err() {
            return true;
        }
        let closed = match stream {
            Stream::Plain(_) => drain_closed(tcp),
            Stream::Tls(_) => peek_closed(tcp),
        };
        closed || tcp.set_nonblocking(false).is_err()
    }
}

fn peek_closed(tcp: &TcpStream) -> bool {
    let mut buf = [0u8; 1];
    match tcp.peek(&mut buf) {
        Ok(0) => true,
        Ok(_) => false,
        Err(err) => err.kind() != io::ErrorKind::WouldBlock,
    }
}

fn drain_closed(mut tcp: &TcpStream) -> bool {
    let mut buf = [0u8; 512];
    for _ in 0..MAX_DRAIN_READS {
        match tcp.read(&mut buf) {
            Ok(0) => return true,
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return err.kind() != io::ErrorKind::WouldBlock,
        }
    }
    false
}

impl RpcConnection for TcpConnection {
    fn is_active(&mut self) -> bool {
        if self.broken {
            return false;
        }
        match &self.stream {
            Some(stream) => !Self::peer_closed(stream),
            None => false,
        }
    }

    fn append(&mut self, event: &TransportEvent) -> io::Result<()> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "connection already closed",
            ));
        };
        let payload = encode_event(event)?;
        let frame = frame_payload(&payload, self.max_frame_size).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "event of {} bytes exceeds the {} byte frame limit",
                    payload.len(),
                    self.max_frame_size
                ),
            )
        })?;
        let result = stream.write_all(&frame).and_then(|()| stream.flush());
        if result.is_err() {
            self.broken = true;
        }
        result
    }

    fn close(&mut self) {
        let Some(stream) = self.stream.take() else {
            return;
        };
        match stream {
            Stream::Plain(stream) => {
                let _ = stream.shutdown(Shutdown::Both);
            }
            Stream::Tls(mut stream) => {
                let _ = stream.shutdown();
            }
        }
    }
}

impl Drop for TcpConnection {
    fn drop(&mut self) {
        self.close();
    }
}

fn connect_error(config: &AppenderConfig, source: io::Error) -> ConnectError {
    ConnectError::Connect {
        host: config.host.clone(),
        port: config.port,
        source,
    }
}

fn socket_addrs(config: &AppenderConfig) -> Result<Vec<SocketAddr>, ConnectError> {
    (config.host.as_str(), config.port)
        .to_socket_addrs()
        .map(|iter| iter.collect())
        .map_err(|source| ConnectError::Resolve {
            host: config.host.clone(),
            port: config.port,
            source,
        })
}

fn connect_tcp(config: &AppenderConfig) -> Result<TcpStream, ConnectError> {
    let mut last_err = None;
    for addr in socket_addrs(config)? {
        match TcpStream::connect_timeout(&addr, config.connect_timeout) {
            Ok(stream) => {
                stream
                    .set_nodelay(true)
                    .map_err(|source| connect_error(config, source))?;
                return Ok(stream);
            }
            Err(err) => last_err = Some(err),
        }
    }
    let source = last_err.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            "host resolved to no addresses",
        )
    });
    Err(connect_error(config, source))
}

fn tls_connector(tls: &TlsOptions) -> Result<TlsConnector, ConnectError> {
    let mut builder = TlsConnector::builder();
    if tls.insecure_skip_verify {
        builder.danger_accept_invalid_certs(true);
        builder.danger_accept_invalid_hostnames(true);
    }
    builder
        .build()
        .map_err(|err| ConnectError::Tls(err.to_string()))
}

fn handshake(
    tls: &TlsOptions,
    stream: TcpStream,
    timeout: Duration,
) -> Result<TlsStream<TcpStream>, ConnectError> {
    let connector = tls_connector(tls)?;
    let tls_err = |err: io::Error| ConnectError::Tls(err.to_string());
    stream.set_read_timeout(Some(timeout)).map_err(tls_err)?;
    stream.set_write_timeout(Some(timeout)).map_err(tls_err)?;
    let stream = connector
        .connect(&tls.domain, stream)
        .map_err(|err| ConnectError::Tls(err.to_string()))?;
    stream.get_ref().set_read_timeout(None).map_err(tls_err)?;
    Ok(stream)
}
