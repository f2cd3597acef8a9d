//! An in-memory transport that records every call made through it.
//!
//! Tests script connect failures, liveness answers and send failures, then
//! assert on the recorded [`TransportCall`] sequence.

use std::{collections::VecDeque, io, sync::Arc};

use parking_lot::Mutex;

use crate::{
    config::AppenderConfig,
    error::ConnectError,
    event::TransportEvent,
    transport::{RpcConnection, RpcConnector},
};

/// One call observed by the scripted transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportCall {
    Connect { host: String, port: u16 },
    IsActive,
    Append(TransportEvent),
    Close,
}

#[derive(Default)]
struct Script {
    calls: Vec<TransportCall>,
    refuse_all: bool,
    refuse_next: usize,
    liveness: VecDeque<bool>,
    fail_next_appends: usize,
    open: usize,
}

/// Connector handing out [`ScriptedConnection`]s that share one script.
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    script: Arc<Mutex<Script>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A connector whose every connect attempt is refused.
    pub fn refusing() -> Self {
        let connector = Self::new();
        connector.script.lock().refuse_all = true;
        connector
    }

    /// Refuse the next `count` connect attempts.
    pub fn refuse_next_connects(&self, count: usize) {
        self.script.lock().refuse_next = count;
    }

    /// Queue answers for upcoming liveness checks. Unscripted checks report
    /// the connection as alive.
    pub fn script_liveness(&self, answers: impl IntoIterator<Item = bool>) {
        self.script.lock().liveness.extend(answers);
    }

    /// Fail the next `count` appends with a broken pipe.
    pub fn fail_next_appends(&self, count: usize) {
        self.script.lock().fail_next_appends = count;
    }

    /// Snapshot of every call made so far.
    pub fn calls(&self) -> Vec<TransportCall> {
        self.script.lock().calls.clone()
    }

    /// Events successfully appended, in order.
    pub fn appended(&self) -> Vec<TransportEvent> {
        self.script
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                TransportCall::Append(event) => Some(event.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn connect_count(&self) -> usize {
        self.count(|call| matches!(call, TransportCall::Connect { .. }))
    }

    pub fn close_count(&self) -> usize {
        self.count(|call| matches!(call, TransportCall::Close))
    }

    /// Connections opened and not yet closed.
    pub fn open_connections(&self) -> usize {
        self.script.lock().open
    }

    fn count(&self, pred: impl Fn(&TransportCall) -> bool) -> usize {
        self.script.lock().calls.iter().filter(|c| pred(c)).count()
    }
}

impl RpcConnector for ScriptedConnector {
    fn connect(&self, config: &AppenderConfig) -> Result<Box<dyn RpcConnection>, ConnectError> {
        let mut script = self.script.lock();
        script.calls.push(TransportCall::Connect {
            host: config.host.clone(),
            port: config.port,
        });
        if script.refuse_all || script.refuse_next > 0 {
            script.refuse_next = script.refuse_next.saturating_sub(1);
            return Err(ConnectError::Connect {
                host: config.host.clone(),
                port: config.port,
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            });
        }
        script.open += 1;
        Ok(Box::new(ScriptedConnection {
            script: Arc::clone(&self.script),
            open: true,
        }))
    }
}

/// Connection produced by [`ScriptedConnector`].
pub struct ScriptedConnection {
    script: Arc<Mutex<Script>>,
    open: bool,
}

impl RpcConnection for ScriptedConnection {
    fn is_active(&mut self) -> bool {
        let mut script = self.script.lock();
        script.calls.push(TransportCall::IsActive);
        let scripted = script.liveness.pop_front().unwrap_or(true);
        self.open && scripted
    }

    fn append(&mut self, event: &TransportEvent) -> io::Result<()> {
        let mut script = self.script.lock();
        if !self.open {
            return Err(io::Error::from(io::ErrorKind::NotConnected));
        }
        if script.fail_next_appends > 0 {
            script.fail_next_appends -= 1;
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        script.calls.push(TransportCall::Append(event.clone()));
        Ok(())
    }

    fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        let mut script = self.script.lock();
        script.open -= 1;
        script.calls.push(TransportCall::Close);
    }
}

impl Drop for ScriptedConnection {
    fn drop(&mut self) {
        self.close();
    }
}
