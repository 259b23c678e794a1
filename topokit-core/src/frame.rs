//! SP wire format, sans-IO.
//!
//! A TCP pipe starts with both sides writing an 8-byte greeting:
//!
//! ```text
//! 00 'S' 'P' 00 <protocol id: u16 BE> 00 00
//! ```
//!
//! Every message after that is a u64 big-endian length followed by the
//! payload. Nothing here touches a socket; the pipe tasks feed these
//! functions fixed-size buffers.

use crate::error::{Error, Result};
use crate::protocol::Protocol;
use bytes::Bytes;
use std::io;

/// Greeting length in bytes.
pub const GREETING_LEN: usize = 8;

/// Frame length prefix in bytes.
pub const LEN_PREFIX: usize = 8;

/// Build the greeting a socket of `protocol` sends on connect.
#[must_use]
pub const fn encode_greeting(protocol: Protocol) -> [u8; GREETING_LEN] {
    let id = protocol.id().to_be_bytes();
    [0x00, b'S', b'P', 0x00, id[0], id[1], 0x00, 0x00]
}

/// Parse a peer greeting.
///
/// # Errors
///
/// `Error::Protocol` if the magic or reserved bytes are wrong or the
/// protocol id is unknown.
pub fn decode_greeting(buf: &[u8; GREETING_LEN]) -> Result<Protocol> {
    if buf[..4] != [0x00, b'S', b'P', 0x00] {
        return Err(Error::protocol("bad SP greeting signature"));
    }
    if buf[6] != 0 || buf[7] != 0 {
        return Err(Error::protocol("reserved greeting bytes set"));
    }
    let id = u16::from_be_bytes([buf[4], buf[5]]);
    Protocol::from_id(id).ok_or_else(|| Error::protocol(format!("unknown protocol id {id:#06x}")))
}

/// Check the peer greeting against the local protocol.
///
/// # Errors
///
/// `Error::Protocol` for a malformed greeting or an incompatible peer.
pub fn check_peer(local: Protocol, buf: &[u8; GREETING_LEN]) -> Result<Protocol> {
    let peer = decode_greeting(buf)?;
    if !local.is_compatible(peer) {
        return Err(Error::protocol(format!(
            "{local} cannot talk to {peer}"
        )));
    }
    Ok(peer)
}

/// Encode one message as length prefix + payload.
#[must_use]
pub fn encode_frame(payload: &Bytes) -> Vec<u8> {
    let mut out = Vec::with_capacity(LEN_PREFIX + payload.len());
    out.extend_from_slice(&(payload.len() as u64).to_be_bytes());
    out.extend_from_slice(payload);
    out
}

/// Decode a length prefix, enforcing the inbound size limit.
///
/// # Errors
///
/// `InvalidData` if the announced size exceeds `max`.
pub fn decode_len(prefix: [u8; LEN_PREFIX], max: usize) -> io::Result<usize> {
    let len = u64::from_be_bytes(prefix);
    match usize::try_from(len) {
        Ok(len) if len <= max => Ok(len),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame of {len} bytes exceeds limit of {max}"),
        )),
    }
}
