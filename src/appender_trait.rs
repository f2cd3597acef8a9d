use crate::{
    appender::FlumeAppender,
    error::{ConnectError, DeliveryError},
    log_record::FlumeLogRecord,
};

/// Capability a host logging framework drives.
///
/// Hosts call [`activate`](Appender::activate) once before the first record,
/// [`append`](Appender::append) for every record and [`close`](Appender::close)
/// at shutdown. Implementations are shared across threads.
pub trait Appender: Send + Sync {
    fn activate(&self) -> Result<(), ConnectError>;

    /// Deliver a single record.
    fn append(&self, record: &FlumeLogRecord) -> Result<(), DeliveryError>;

    fn close(&self);

    /// Whether records must be pre-rendered by a layout before `append`.
    fn requires_layout(&self) -> bool;
}

impl Appender for FlumeAppender {
    fn activate(&self) -> Result<(), ConnectError> {
        FlumeAppender::activate(self)
    }

    fn append(&self, record: &FlumeLogRecord) -> Result<(), DeliveryError> {
        FlumeAppender::append(self, record)
    }

    fn close(&self) {
        FlumeAppender::close(self);
    }

    fn requires_layout(&self) -> bool {
        FlumeAppender::requires_layout(self)
    }
}
