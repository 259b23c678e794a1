//! In-process registry tests

use bytes::Bytes;
use std::io;
use topokit_core::inproc::{bind_inproc, connect_inproc, list_inproc_endpoints, unbind_inproc};
use topokit_core::protocol::Protocol;

#[test]
fn test_connection_carries_payloads_both_ways() {
    let incoming = bind_inproc("inproc://it-pair", Protocol::Pair).unwrap();
    let dialer = connect_inproc("inproc://it-pair", Protocol::Pair).unwrap();
    let listener = incoming.try_recv().unwrap();

    assert_eq!(dialer.peer, Protocol::Pair);
    assert_eq!(listener.peer, Protocol::Pair);

    dialer.tx.send(Bytes::from_static(b"ping")).unwrap();
    assert_eq!(listener.rx.try_recv().unwrap(), Bytes::from_static(b"ping"));
    listener.tx.send(Bytes::from_static(b"pong")).unwrap();
    assert_eq!(dialer.rx.try_recv().unwrap(), Bytes::from_static(b"pong"));

    drop(dialer);
    assert!(listener.rx.recv().is_err());
}

#[test]
fn test_name_reusable_after_owner_goes_away() {
    let incoming = bind_inproc("inproc://it-reuse", Protocol::Pull).unwrap();
    let err = bind_inproc("inproc://it-reuse", Protocol::Pull).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::AddrInUse);

    drop(incoming);
    let err = connect_inproc("inproc://it-reuse", Protocol::Push).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::ConnectionRefused);

    let _incoming = bind_inproc("inproc://it-reuse", Protocol::Pull).unwrap();
    assert!(list_inproc_endpoints().contains(&"it-reuse".to_string()));
    unbind_inproc("inproc://it-reuse").unwrap();
    assert!(!list_inproc_endpoints().contains(&"it-reuse".to_string()));
}

#[test]
fn test_incompatible_protocols_refused() {
    let _incoming = bind_inproc("inproc://it-survey", Protocol::Surveyor).unwrap();
    let err = connect_inproc("inproc://it-survey", Protocol::Rep).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    assert!(connect_inproc("inproc://it-survey", Protocol::Respondent).is_ok());
}
