//! Correlation headers for REQ/REP and SURVEYOR/RESPONDENT.
//!
//! The requesting side prepends a 32-bit big-endian id with the high bit set;
//! the answering side echoes it back unchanged.

use bytes::{BufMut, Bytes, BytesMut};

const ID_FLAG: u32 = 0x8000_0000;
const HEADER_LEN: usize = 4;

/// Monotonic id source starting at a random point.
#[derive(Debug)]
pub(crate) struct IdSequence {
    next: u32,
}

impl IdSequence {
    pub(crate) fn new() -> Self {
        Self {
            next: rand::random::<u32>(),
        }
    }

    pub(crate) fn next_id(&mut self) -> u32 {
        let id = self.next | ID_FLAG;
        self.next = self.next.wrapping_add(1);
        id
    }
}

pub(crate) fn prepend(id: u32, payload: &Bytes) -> Bytes {
    let mut out = BytesMut::with_capacity(HEADER_LEN + payload.len());
    out.put_u32(id);
    out.extend_from_slice(payload);
    out.freeze()
}

/// Split off the id. `None` for a message without a valid header.
pub(crate) fn split(msg: Bytes) -> Option<(u32, Bytes)> {
    if msg.len() < HEADER_LEN {
        return None;
    }
    let id = u32::from_be_bytes([msg[0], msg[1], msg[2], msg[3]]);
    if id & ID_FLAG == 0 {
        return None;
    }
    Some((id, msg.slice(HEADER_LEN..)))
}
