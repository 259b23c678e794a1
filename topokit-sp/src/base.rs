//! State shared by every protocol socket.
//!
//! `SocketBase` owns the listeners, the peer table and the inbound queue.
//! Protocol sockets compose it and only decide *which* pipes a message goes
//! to and which inbound messages are surfaced to the caller.

use crate::peer::{PeerTable, PipeId};
use crate::transport::{self, Delivery, Inbound, PipeContext};
use bytes::Bytes;
use compio::net::{TcpListener, TcpStream};
use flume::{Receiver, Sender};
use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Instant;
use topokit_core::endpoint::Endpoint;
use topokit_core::inproc;
use topokit_core::options::{SocketOption, SocketOptions};
use topokit_core::protocol::Protocol;
use topokit_core::reconnect::ReconnectState;
use topokit_core::tcp::enable_tcp_nodelay;
use topokit_core::{Error, Result};
use tracing::{debug, trace};

pub struct SocketBase {
    pub(crate) protocol: Protocol,
    pub(crate) options: SocketOptions,
    peers: Rc<RefCell<PeerTable>>,
    attached_rx: Receiver<PipeId>,
    inbound_tx: Sender<Delivery>,
    inbound_rx: Receiver<Delivery>,
    /// Dropping the sender stops every task of this socket
    shutdown_tx: Option<Sender<()>>,
    shutdown_rx: Receiver<()>,
    inproc_names: Vec<String>,
    closed: bool,
}

impl SocketBase {
    pub fn new(protocol: Protocol, options: SocketOptions) -> Self {
        let (attached_tx, attached_rx) = flume::bounded(1);
        let (inbound_tx, inbound_rx) = flume::unbounded();
        let (shutdown_tx, shutdown_rx) = flume::bounded(1);
        Self {
            protocol,
            options,
            peers: Rc::new(RefCell::new(PeerTable::new(
                protocol.peer_limit(),
                attached_tx,
            ))),
            attached_rx,
            inbound_tx,
            inbound_rx,
            shutdown_tx: Some(shutdown_tx),
            shutdown_rx,
            inproc_names: Vec::new(),
            closed: false,
        }
    }

    fn context(&self) -> PipeContext {
        PipeContext {
            protocol: self.protocol,
            peers: Rc::clone(&self.peers),
            inbound: self.inbound_tx.clone(),
            shutdown: self.shutdown_rx.clone(),
            handshake_timeout: self.options.handshake_timeout,
            max_msg_size: self.options.max_msg_size,
        }
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(Error::Closed)
        } else {
            Ok(())
        }
    }

    pub(crate) fn bad_state(&self, reason: &'static str) -> Error {
        Error::BadState {
            protocol: self.protocol,
            reason,
        }
    }

    /// Start accepting peers on `endpoint`. Returns the bound endpoint, which
    /// differs from the requested one when a TCP port of 0 was given.
    pub async fn listen(&mut self, endpoint: &str) -> Result<Endpoint> {
        self.ensure_open()?;
        let parsed = Endpoint::parse(endpoint).map_err(|e| Error::bind(endpoint, e))?;

        match parsed {
            Endpoint::Tcp(addr) => {
                let listener = TcpListener::bind(addr)
                    .await
                    .map_err(|e| Error::bind(endpoint, e))?;
                let local = listener.local_addr().map_err(|e| Error::bind(endpoint, e))?;
                debug!("[{}] Listening on tcp://{}", self.protocol, local);
                compio::runtime::spawn(transport::accept_tcp(listener, self.context())).detach();
                Ok(Endpoint::Tcp(local))
            }
            Endpoint::Inproc(_) => {
                let incoming = inproc::bind_inproc(endpoint, self.protocol)
                    .map_err(|e| Error::bind(endpoint, e))?;
                debug!("[{}] Listening on {}", self.protocol, parsed);
                self.inproc_names.push(endpoint.to_string());
                compio::runtime::spawn(transport::accept_inproc(incoming, self.context())).detach();
                Ok(parsed)
            }
        }
    }

    /// Connect to a listener, retrying refused attempts per the dial backoff
    /// options. Returns once the pipe is attached on this side.
    pub async fn dial(&mut self, endpoint: &str) -> Result<()> {
        self.ensure_open()?;
        let parsed = Endpoint::parse(endpoint).map_err(|e| Error::connect(endpoint, e))?;
        if self.peers.borrow().is_full() {
            return Err(Error::connect(
                endpoint,
                io::Error::new(io::ErrorKind::AlreadyExists, "peer limit reached"),
            ));
        }

        let mut backoff = ReconnectState::new(&self.options);
        loop {
            match self.try_dial(&parsed).await {
                Ok(()) => return Ok(()),
                Err(DialError::Fatal(e)) => return Err(e),
                Err(DialError::Retry(e)) => match backoff.next_delay() {
                    Some(delay) => {
                        debug!(
                            "[{}] Dial {} attempt {}/{} failed ({}), retrying in {:?}",
                            self.protocol,
                            endpoint,
                            backoff.attempt(),
                            backoff.max_attempts(),
                            e,
                            delay
                        );
                        compio::time::sleep(delay).await;
                    }
                    None => return Err(Error::connect(endpoint, e)),
                },
            }
        }
    }

    async fn try_dial(&mut self, endpoint: &Endpoint) -> std::result::Result<(), DialError> {
        let ctx = self.context();
        match endpoint {
            Endpoint::Tcp(addr) => {
                let mut stream = TcpStream::connect(*addr).await.map_err(DialError::Retry)?;
                if let Err(e) = enable_tcp_nodelay(&stream) {
                    trace!("[{}] TCP_NODELAY not set: {}", self.protocol, e);
                }
                let peer = transport::handshake_with_timeout(
                    &mut stream,
                    self.protocol,
                    self.options.handshake_timeout,
                )
                .await
                .map_err(DialError::Fatal)?;
                trace!("[{}] Handshake complete with {}", self.protocol, peer);

                match transport::attach_tcp(stream, &ctx) {
                    Ok(Some(_)) => Ok(()),
                    Ok(None) => Err(DialError::Fatal(Error::connect(
                        endpoint.to_string(),
                        io::Error::new(io::ErrorKind::AlreadyExists, "peer limit reached"),
                    ))),
                    Err(e) => Err(DialError::Fatal(Error::connect(endpoint.to_string(), e))),
                }
            }
            Endpoint::Inproc(_) => {
                let url = endpoint.to_string();
                let conn = inproc::connect_inproc(&url, self.protocol).map_err(|e| {
                    if e.kind() == io::ErrorKind::InvalidData {
                        DialError::Fatal(Error::protocol(e.to_string()))
                    } else {
                        DialError::Retry(e)
                    }
                })?;
                match transport::attach_inproc(conn, &ctx) {
                    Some(_) => Ok(()),
                    None => Err(DialError::Fatal(Error::connect(
                        url,
                        io::Error::new(io::ErrorKind::AlreadyExists, "peer limit reached"),
                    ))),
                }
            }
        }
    }

    /// Deadline for a `recv()` starting now.
    pub(crate) fn recv_deadline(&self) -> Option<Instant> {
        self.options.recv_timeout.map(|d| Instant::now() + d)
    }

    /// Next inbound message, waiting until `deadline` (forever if `None`).
    ///
    /// A pipe that failed while reading surfaces here as `Error::Receive`,
    /// after every message it delivered before failing.
    pub(crate) async fn recv_inbound(&self, deadline: Option<Instant>) -> Result<Inbound> {
        self.ensure_open()?;
        // The socket holds its own inbound sender, so the queue never disconnects
        match deadline {
            None => self.inbound_rx.recv_async().await.map_err(|_| Error::Closed)?,
            Some(deadline) => {
                let now = Instant::now();
                if deadline <= now {
                    self.inbound_rx.try_recv().map_err(|_| Error::Timeout)?
                } else {
                    compio::time::timeout(deadline - now, self.inbound_rx.recv_async())
                        .await
                        .map_err(|_| Error::Timeout)?
                        .map_err(|_| Error::Closed)?
                }
            }
        }
    }

    /// Hand `msg` to the next peer in round-robin order, waiting for one to
    /// attach up to the send deadline.
    pub(crate) async fn send_one(&mut self, msg: Bytes) -> Result<()> {
        self.ensure_open()?;
        let deadline = self.options.send_timeout.map(|d| Instant::now() + d);

        loop {
            let next = self.peers.borrow_mut().next_round_robin();
            if let Some((pipe, tx)) = next {
                if tx.send(msg).is_err() {
                    trace!("[{}] Pipe {} gone during send", self.protocol, pipe);
                    self.peers.borrow_mut().detach(pipe);
                }
                return Ok(());
            }
            self.wait_for_peer(deadline).await?;
        }
    }

    async fn wait_for_peer(&self, deadline: Option<Instant>) -> Result<()> {
        trace!("[{}] No peer attached, waiting", self.protocol);
        // Table is empty, so anything queued refers to a pipe that already left
        let _ = self.attached_rx.drain();
        let Some(deadline) = deadline else {
            return self
                .attached_rx
                .recv_async()
                .await
                .map(|_| ())
                .map_err(|_| Error::Closed);
        };

        let remaining = deadline.saturating_duration_since(Instant::now());
        match compio::time::timeout(remaining, self.attached_rx.recv_async()).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(_)) => Err(Error::Closed),
            Err(_) => Err(Error::send(format!(
                "no {} peer connected",
                self.protocol.peer()
            ))),
        }
    }

    /// Hand a clone of `msg` to every attached peer. Zero peers is fine.
    pub(crate) fn broadcast(&mut self, msg: &Bytes) -> Result<()> {
        self.ensure_open()?;
        let senders = self.peers.borrow().senders();
        trace!("[{}] Broadcasting to {} peers", self.protocol, senders.len());
        for (pipe, tx) in senders {
            if tx.send(msg.clone()).is_err() {
                self.peers.borrow_mut().detach(pipe);
            }
        }
        Ok(())
    }

    /// Hand `msg` to one specific pipe; dropped silently if it has gone.
    pub(crate) fn send_to(&mut self, pipe: PipeId, msg: Bytes) -> Result<()> {
        self.ensure_open()?;
        let tx = self.peers.borrow().get(pipe);
        match tx {
            Some(tx) if tx.send(msg).is_ok() => {}
            Some(_) => {
                self.peers.borrow_mut().detach(pipe);
            }
            None => trace!("[{}] Pipe {} gone, reply dropped", self.protocol, pipe),
        }
        Ok(())
    }

    /// Apply a protocol-independent option.
    pub(crate) fn set_option(&mut self, option: SocketOption) -> Result<()> {
        option
            .apply_to(&mut self.options)
            .map_err(|rejected| Error::UnsupportedOption {
                option: rejected.name(),
                protocol: self.protocol,
            })
    }

    pub fn peer_count(&self) -> usize {
        self.peers.borrow().len()
    }

    /// Disconnect every pipe, stop listeners and release inproc names.
    /// Safe to call more than once.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.shutdown_tx = None;
        self.peers.borrow_mut().clear();
        for name in self.inproc_names.drain(..) {
            let _ = inproc::unbind_inproc(&name);
        }
        debug!("[{}] Socket closed", self.protocol);
    }
}

impl Drop for SocketBase {
    fn drop(&mut self) {
        self.close();
    }
}

enum DialError {
    /// Nothing listening yet; worth another attempt
    Retry(io::Error),
    Fatal(Error),
}
