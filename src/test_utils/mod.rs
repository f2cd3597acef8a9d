//! Helpers shared by unit and integration tests.

mod scripted_connector;

pub use scripted_connector::{ScriptedConnector, TransportCall};
