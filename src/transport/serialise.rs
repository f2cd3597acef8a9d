//! MessagePack serialisation helpers.

use std::{collections::BTreeMap, io};

use rmp_serde::Serializer;
use serde::{Deserialize, Serialize};

use crate::event::TransportEvent;

#[derive(Serialize)]
struct SerializableEvent<'a> {
    headers: &'a BTreeMap<String, String>,
    #[serde(with = "serde_bytes")]
    body: &'a [u8],
}

#[derive(Deserialize)]
struct OwnedEvent {
    headers: BTreeMap<String, String>,
    body: serde_bytes::ByteBuf,
}

/// Serialise an event into a MessagePack payload.
pub fn encode_event(event: &TransportEvent) -> io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(128 + event.body.len());
    let serialisable = SerializableEvent {
        headers: &event.headers,
        body: &event.body,
    };
    serialisable
        .serialize(&mut Serializer::new(&mut buf).with_struct_map())
        .map_err(io::Error::other)?;
    Ok(buf)
}

/// Decode a payload produced by [`encode_event`]. Used by collectors and tests.
pub fn decode_event(payload: &[u8]) -> io::Result<TransportEvent> {
    let owned: OwnedEvent = rmp_serde::from_slice(payload)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    Ok(TransportEvent {
        headers: owned.headers,
        body: owned.body.into_vec(),
    })
}

/// Frame the payload with a big-endian length prefix.
pub fn frame_payload(payload: &[u8], max_size: usize) -> Option<Vec<u8>> {
    if payload.len() > max_size {
        return None;
    }
    let len = u32::try_from(payload.len()).ok()?;
    let capacity = payload.len().checked_add(4)?;
    let mut framed = Vec::with_capacity(capacity);
    framed.extend(len.to_be_bytes());
    framed.extend_from_slice(payload);
    Some(framed)
}
