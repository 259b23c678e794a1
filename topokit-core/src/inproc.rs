//! In-process transport.
//!
//! Sockets in the same process exchange payloads over flume channels instead
//! of TCP. A listening socket registers its name in a global registry; a
//! dialer looks the name up, checks protocol compatibility and hands the
//! listener one end of a fresh bidirectional channel pair.
//!
//! ```rust
//! use topokit_core::inproc::{bind_inproc, connect_inproc, unbind_inproc};
//! use topokit_core::protocol::Protocol;
//! use bytes::Bytes;
//!
//! # fn main() -> std::io::Result<()> {
//! let incoming = bind_inproc("inproc://doc-pipeline", Protocol::Pull)?;
//! let pusher = connect_inproc("inproc://doc-pipeline", Protocol::Push)?;
//! let puller = incoming.try_recv().unwrap();
//!
//! pusher.tx.send(Bytes::from("job")).unwrap();
//! assert_eq!(puller.rx.try_recv().unwrap(), Bytes::from("job"));
//! unbind_inproc("inproc://doc-pipeline")?;
//! # Ok(())
//! # }
//! ```

use crate::protocol::Protocol;
use bytes::Bytes;
use dashmap::DashMap;
use flume::{Receiver, Sender};
use std::io;

/// One side of an established in-process pipe.
#[derive(Debug)]
pub struct InprocConnection {
    /// Protocol of the socket on the other side
    pub peer: Protocol,
    /// Payloads towards the peer
    pub tx: Sender<Bytes>,
    /// Payloads from the peer; disconnects when the peer drops its sender
    pub rx: Receiver<Bytes>,
}

struct InprocBinding {
    protocol: Protocol,
    accept: Sender<InprocConnection>,
}

/// Global registry of bound inproc names
static INPROC_REGISTRY: once_cell::sync::Lazy<DashMap<String, InprocBinding>> =
    once_cell::sync::Lazy::new(DashMap::new);

/// Register `endpoint` for a socket speaking `protocol`.
///
/// Returns the queue on which new connections arrive. A name whose previous
/// owner has gone away (its queue dropped) can be bound again.
///
/// # Errors
///
/// `InvalidInput` for a malformed endpoint, `AddrInUse` if a live socket
/// already holds the name.
pub fn bind_inproc(endpoint: &str, protocol: Protocol) -> io::Result<Receiver<InprocConnection>> {
    let name = validate_and_extract_name(endpoint)?;
    let (accept, incoming) = flume::unbounded();

    match INPROC_REGISTRY.entry(name.to_string()) {
        dashmap::mapref::entry::Entry::Occupied(mut entry) => {
            if !entry.get().accept.is_disconnected() {
                return Err(io::Error::new(
                    io::ErrorKind::AddrInUse,
                    format!("inproc endpoint '{name}' is already bound"),
                ));
            }
            entry.insert(InprocBinding { protocol, accept });
        }
        dashmap::mapref::entry::Entry::Vacant(entry) => {
            entry.insert(InprocBinding { protocol, accept });
        }
    }

    Ok(incoming)
}

/// Connect a socket speaking `protocol` to a bound inproc endpoint.
///
/// # Errors
///
/// `InvalidInput` for a malformed endpoint, `ConnectionRefused` when nothing
/// is bound under the name (or its owner is gone), `InvalidData` when the
/// bound socket speaks an incompatible protocol.
pub fn connect_inproc(endpoint: &str, protocol: Protocol) -> io::Result<InprocConnection> {
    let name = validate_and_extract_name(endpoint)?;

    let (listener_proto, accept) = match INPROC_REGISTRY.get(name) {
        Some(binding) => (binding.protocol, binding.accept.clone()),
        None => {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("inproc endpoint '{name}' is not bound"),
            ))
        }
    };

    if !protocol.is_compatible(listener_proto) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{protocol} cannot connect to {listener_proto} at inproc://{name}"),
        ));
    }

    let (to_listener, from_dialer) = flume::unbounded();
    let (to_dialer, from_listener) = flume::unbounded();

    let listener_side = InprocConnection {
        peer: protocol,
        tx: to_dialer,
        rx: from_dialer,
    };
    if accept.send(listener_side).is_err() {
        INPROC_REGISTRY.remove_if(name, |_, b| b.accept.is_disconnected());
        return Err(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            format!("inproc endpoint '{name}' is closed"),
        ));
    }

    Ok(InprocConnection {
        peer: listener_proto,
        tx: to_listener,
        rx: from_listener,
    })
}

/// Remove an inproc endpoint from the registry.
pub fn unbind_inproc(endpoint: &str) -> io::Result<()> {
    let name = validate_and_extract_name(endpoint)?;
    INPROC_REGISTRY.remove(name);
    Ok(())
}

/// List all currently bound inproc names (without the scheme).
pub fn list_inproc_endpoints() -> Vec<String> {
    INPROC_REGISTRY
        .iter()
        .map(|entry| entry.key().clone())
        .collect()
}

fn validate_and_extract_name(endpoint: &str) -> io::Result<&str> {
    const PREFIX: &str = "inproc://";

    let Some(name) = endpoint.strip_prefix(PREFIX) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("inproc endpoint must start with '{PREFIX}', got: '{endpoint}'"),
        ));
    };

    if name.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "inproc endpoint name cannot be empty",
        ));
    }

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_endpoint() {
        assert_eq!(validate_and_extract_name("inproc://test").unwrap(), "test");
        assert!(validate_and_extract_name("tcp://test").is_err());
        assert!(validate_and_extract_name("inproc://").is_err());
        assert!(validate_and_extract_name("").is_err());
    }

    #[test]
    fn test_bind_duplicate() {
        let endpoint = "inproc://core-test-duplicate";

        let _incoming = bind_inproc(endpoint, Protocol::Rep).unwrap();
        let err = bind_inproc(endpoint, Protocol::Rep).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AddrInUse);

        unbind_inproc(endpoint).unwrap();
    }

    #[test]
    fn test_rebind_after_owner_dropped() {
        let endpoint = "inproc://core-test-rebind";

        let incoming = bind_inproc(endpoint, Protocol::Pull).unwrap();
        drop(incoming);
        let _incoming = bind_inproc(endpoint, Protocol::Pull).unwrap();

        unbind_inproc(endpoint).unwrap();
    }

    #[test]
    fn test_connect_exchanges_both_ways() {
        let endpoint = "inproc://core-test-connect";

        let incoming = bind_inproc(endpoint, Protocol::Rep).unwrap();
        let req = connect_inproc(endpoint, Protocol::Req).unwrap();
        let rep = incoming.try_recv().unwrap();

        assert_eq!(req.peer, Protocol::Rep);
        assert_eq!(rep.peer, Protocol::Req);

        req.tx.send(Bytes::from("DATE")).unwrap();
        assert_eq!(rep.rx.try_recv().unwrap(), Bytes::from("DATE"));
        rep.tx.send(Bytes::from("now")).unwrap();
        assert_eq!(req.rx.try_recv().unwrap(), Bytes::from("now"));

        drop(rep);
        assert!(req.rx.recv().is_err());

        unbind_inproc(endpoint).unwrap();
    }

    #[test]
    fn test_connect_unbound_refused() {
        let err = connect_inproc("inproc://core-test-nobody", Protocol::Push).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionRefused);
    }

    #[test]
    fn test_connect_incompatible() {
        let endpoint = "inproc://core-test-incompatible";
        let _incoming = bind_inproc(endpoint, Protocol::Pub).unwrap();

        let err = connect_inproc(endpoint, Protocol::Pull).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        unbind_inproc(endpoint).unwrap();
    }

    #[test]
    fn test_list_endpoints() {
        let _a = bind_inproc("inproc://core-test-list-1", Protocol::Bus).unwrap();
        let _b = bind_inproc("inproc://core-test-list-2", Protocol::Bus).unwrap();

        let endpoints = list_inproc_endpoints();
        assert!(endpoints.contains(&"core-test-list-1".to_string()));
        assert!(endpoints.contains(&"core-test-list-2".to_string()));

        unbind_inproc("inproc://core-test-list-1").unwrap();
        unbind_inproc("inproc://core-test-list-2").unwrap();
    }
}
