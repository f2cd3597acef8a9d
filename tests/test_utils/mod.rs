//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use std::{
    io::Read,
    net::{SocketAddr, TcpListener, TcpStream},
    sync::{Arc, mpsc},
    thread,
    time::Duration,
};

use flume_appender::{
    AppenderConfig, FlumeAppender, TransportEvent, test_utils::ScriptedConnector,
    transport::decode_event,
};
use rstest::fixture;

/// Configuration tagged the way most tests expect.
pub fn tagged_config(host: &str, port: u16) -> AppenderConfig {
    AppenderConfig::new(host, port)
        .with_tags("t", "f", "1")
        .with_connect_timeout(Duration::from_millis(500))
        .with_request_timeout(Duration::from_secs(2))
}

/// Return a scripted connector together with an appender using it.
#[fixture]
pub fn scripted_pair() -> (ScriptedConnector, FlumeAppender) {
    let connector = ScriptedConnector::new();
    let appender = FlumeAppender::with_connector(
        tagged_config("collector", 41414),
        Arc::new(connector.clone()),
    );
    (connector, appender)
}

#[fixture]
pub fn tcp_listener() -> TcpListener {
    TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral listener")
}

fn read_frame(stream: &mut TcpStream) -> Option<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    stream.read_exact(&mut len_buf).ok()?;
    let len = u32::from_be_bytes(len_buf) as usize;
    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload).ok()?;
    Some(payload)
}

/// Accept `connections` connections in turn, reading up to `frames_each`
/// frames from each before dropping it. Decoded events are forwarded.
pub fn spawn_collector(
    listener: TcpListener,
    connections: usize,
    frames_each: usize,
) -> (SocketAddr, mpsc::Receiver<TransportEvent>) {
    let addr = listener.local_addr().expect("listener has address");
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for _ in 0..connections {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            for _ in 0..frames_each {
                let Some(payload) = read_frame(&mut stream) else {
                    break;
                };
                let event = decode_event(&payload).expect("decode event");
                if tx.send(event).is_err() {
                    return;
                }
            }
        }
    });
    (addr, rx)
}
