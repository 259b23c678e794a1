//! Pipe tasks for the TCP and inproc transports.
//!
//! A pipe is one connection to one peer. Each pipe registers an outbound
//! queue in the socket's peer table and forwards inbound payloads to the
//! socket's shared inbound queue. All tasks stop when the socket's shutdown
//! channel disconnects.

use crate::peer::{PeerTable, PipeId};
use bytes::Bytes;
use compio::buf::BufResult;
use compio::io::{AsyncReadExt, AsyncWriteExt};
use compio::net::{TcpListener, TcpStream};
use compio::runtime::TryClone;
use flume::{Receiver, Sender};
use futures::{pin_mut, select, FutureExt};
use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Duration;
use topokit_core::frame::{self, GREETING_LEN, LEN_PREFIX};
use topokit_core::inproc::InprocConnection;
use topokit_core::protocol::Protocol;
use topokit_core::tcp::enable_tcp_nodelay;
use topokit_core::{Error, Result};
use tracing::{debug, trace, warn};

/// A payload received on a pipe.
#[derive(Debug)]
pub(crate) struct Inbound {
    pub pipe: PipeId,
    pub msg: Bytes,
}

/// What a pipe hands to its socket: a payload, or the read failure that
/// ended the pipe.
pub(crate) type Delivery = Result<Inbound>;

/// Everything a pipe task needs from its socket.
#[derive(Clone)]
pub(crate) struct PipeContext {
    pub protocol: Protocol,
    pub peers: Rc<RefCell<PeerTable>>,
    pub inbound: Sender<Delivery>,
    pub shutdown: Receiver<()>,
    pub handshake_timeout: Duration,
    pub max_msg_size: usize,
}

/// Exchange SP greetings and return the peer protocol.
async fn handshake(stream: &mut TcpStream, local: Protocol) -> Result<Protocol> {
    let BufResult(res, _) = stream.write_all(frame::encode_greeting(local)).await;
    res.map_err(|e| Error::protocol(format!("greeting write failed: {e}")))?;

    let BufResult(res, greeting) = stream.read_exact([0u8; GREETING_LEN]).await;
    res.map_err(|e| Error::protocol(format!("greeting read failed: {e}")))?;

    frame::check_peer(local, &greeting)
}

pub(crate) async fn handshake_with_timeout(
    stream: &mut TcpStream,
    local: Protocol,
    limit: Duration,
) -> Result<Protocol> {
    match compio::time::timeout(limit, handshake(stream, local)).await {
        Ok(res) => res,
        Err(_) => Err(Error::protocol(format!(
            "handshake did not complete within {limit:?}"
        ))),
    }
}

async fn read_frame(stream: &mut TcpStream, max: usize) -> io::Result<Bytes> {
    let BufResult(res, prefix) = stream.read_exact([0u8; LEN_PREFIX]).await;
    res?;
    let len = frame::decode_len(prefix, max)?;
    if len == 0 {
        return Ok(Bytes::new());
    }

    let BufResult(res, body) = stream.read_exact(vec![0u8; len]).await;
    res?;
    Ok(Bytes::from(body))
}

/// Attach a handshaken TCP stream and start its reader and writer.
///
/// Returns `None` if the peer table is full; the stream is dropped.
pub(crate) fn attach_tcp(stream: TcpStream, ctx: &PipeContext) -> io::Result<Option<PipeId>> {
    let reader = stream.try_clone()?;
    let (out_tx, out_rx) = flume::unbounded();

    let Some(pipe) = ctx.peers.borrow_mut().attach(out_tx) else {
        debug!("[{}] Peer limit reached, dropping connection", ctx.protocol);
        return Ok(None);
    };
    debug!("[{}] Pipe {} attached (tcp)", ctx.protocol, pipe);

    compio::runtime::spawn(write_loop(stream, out_rx, pipe, ctx.clone())).detach();
    compio::runtime::spawn(read_loop(reader, pipe, ctx.clone())).detach();
    Ok(Some(pipe))
}

/// Drains the pipe's queue onto the wire until the queue is dropped.
async fn write_loop(mut stream: TcpStream, out: Receiver<Bytes>, pipe: PipeId, ctx: PipeContext) {
    while let Ok(msg) = out.recv_async().await {
        trace!("[{}] Pipe {} writing {} bytes", ctx.protocol, pipe, msg.len());
        let BufResult(res, _) = stream.write_all(frame::encode_frame(&msg)).await;
        if let Err(e) = res {
            debug!("[{}] Pipe {} write failed: {}", ctx.protocol, pipe, e);
            ctx.peers.borrow_mut().detach(pipe);
            break;
        }
    }
    trace!("[{}] Pipe {} writer stopped", ctx.protocol, pipe);
}

async fn read_loop(mut stream: TcpStream, pipe: PipeId, ctx: PipeContext) {
    loop {
        let next = read_frame(&mut stream, ctx.max_msg_size).fuse();
        let stop = ctx.shutdown.recv_async().fuse();
        pin_mut!(next, stop);

        select! {
            res = next => match res {
                Ok(msg) => {
                    trace!("[{}] Pipe {} received {} bytes", ctx.protocol, pipe, msg.len());
                    if ctx.inbound.send(Ok(Inbound { pipe, msg })).is_err() {
                        break;
                    }
                }
                Err(e) if is_departure(&e) => {
                    debug!("[{}] Pipe {} closed: {}", ctx.protocol, pipe, e);
                    break;
                }
                Err(e) => {
                    warn!("[{}] Pipe {} read failed: {}", ctx.protocol, pipe, e);
                    let _ = ctx
                        .inbound
                        .send(Err(Error::receive(format!("pipe {pipe}: {e}"))));
                    break;
                }
            },
            _ = stop => break,
        }
    }
    ctx.peers.borrow_mut().detach(pipe);
}

/// Read errors that just mean the peer went away.
fn is_departure(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
    )
}

/// Accept loop for a bound TCP listener.
pub(crate) async fn accept_tcp(listener: TcpListener, ctx: PipeContext) {
    loop {
        let accept = listener.accept().fuse();
        let stop = ctx.shutdown.recv_async().fuse();
        pin_mut!(accept, stop);

        select! {
            res = accept => match res {
                Ok((stream, addr)) => {
                    debug!("[{}] Accepted connection from {}", ctx.protocol, addr);
                    compio::runtime::spawn(serve_tcp(stream, ctx.clone())).detach();
                }
                Err(e) => {
                    warn!("[{}] Accept failed: {}", ctx.protocol, e);
                    break;
                }
            },
            _ = stop => break,
        }
    }
    debug!("[{}] Listener stopped", ctx.protocol);
}

async fn serve_tcp(mut stream: TcpStream, ctx: PipeContext) {
    if let Err(e) = enable_tcp_nodelay(&stream) {
        trace!("[{}] TCP_NODELAY not set: {}", ctx.protocol, e);
    }
    match handshake_with_timeout(&mut stream, ctx.protocol, ctx.handshake_timeout).await {
        Ok(peer) => {
            trace!("[{}] Handshake complete with {}", ctx.protocol, peer);
            if let Err(e) = attach_tcp(stream, &ctx) {
                debug!("[{}] Could not attach pipe: {}", ctx.protocol, e);
            }
        }
        Err(e) => debug!("[{}] Rejected connection: {}", ctx.protocol, e),
    }
}

/// Attach one end of an inproc connection and start its pump.
pub(crate) fn attach_inproc(conn: InprocConnection, ctx: &PipeContext) -> Option<PipeId> {
    let InprocConnection { peer, tx, rx } = conn;
    let Some(pipe) = ctx.peers.borrow_mut().attach(tx) else {
        debug!("[{}] Peer limit reached, dropping inproc {}", ctx.protocol, peer);
        return None;
    };
    debug!("[{}] Pipe {} attached (inproc, peer {})", ctx.protocol, pipe, peer);

    compio::runtime::spawn(pump_inproc(rx, pipe, ctx.clone())).detach();
    Some(pipe)
}

async fn pump_inproc(rx: Receiver<Bytes>, pipe: PipeId, ctx: PipeContext) {
    loop {
        let next = rx.recv_async().fuse();
        let stop = ctx.shutdown.recv_async().fuse();
        pin_mut!(next, stop);

        select! {
            res = next => match res {
                Ok(msg) => {
                    if ctx.inbound.send(Ok(Inbound { pipe, msg })).is_err() {
                        break;
                    }
                }
                Err(_) => {
                    debug!("[{}] Pipe {} peer went away", ctx.protocol, pipe);
                    break;
                }
            },
            _ = stop => break,
        }
    }
    ctx.peers.borrow_mut().detach(pipe);
}

/// Accept loop for a bound inproc name.
pub(crate) async fn accept_inproc(incoming: Receiver<InprocConnection>, ctx: PipeContext) {
    loop {
        let next = incoming.recv_async().fuse();
        let stop = ctx.shutdown.recv_async().fuse();
        pin_mut!(next, stop);

        select! {
            res = next => match res {
                Ok(conn) => {
                    attach_inproc(conn, &ctx);
                }
                Err(_) => break,
            },
            _ = stop => break,
        }
    }
    debug!("[{}] Inproc listener stopped", ctx.protocol);
}
