//! Per-socket peer table.
//!
//! Each attached pipe gets a `PipeId` and an outbound queue. Attach order is
//! the round-robin order used by single-destination sends.

use bytes::Bytes;
use flume::Sender;

/// Identifier of one attached pipe, unique within its socket.
pub type PipeId = u64;

#[derive(Debug)]
pub struct PeerTable {
    limit: Option<usize>,
    next_id: PipeId,
    pipes: Vec<(PipeId, Sender<Bytes>)>,
    cursor: usize,
    /// Wakes senders waiting for a first peer; capacity 1, extra
    /// notifications are dropped
    attached: Sender<PipeId>,
}

impl PeerTable {
    pub fn new(limit: Option<usize>, attached: Sender<PipeId>) -> Self {
        Self {
            limit,
            next_id: 1,
            pipes: Vec::new(),
            cursor: 0,
            attached,
        }
    }

    /// Register a pipe's outbound queue.
    ///
    /// Returns `None` when the peer limit is reached.
    pub fn attach(&mut self, tx: Sender<Bytes>) -> Option<PipeId> {
        if self.is_full() {
            return None;
        }
        let pipe = self.next_id;
        self.next_id += 1;
        self.pipes.push((pipe, tx));
        let _ = self.attached.try_send(pipe);
        Some(pipe)
    }

    /// Remove a pipe. Dropping its queue stops the pipe's writer.
    pub fn detach(&mut self, pipe: PipeId) -> bool {
        let Some(idx) = self.pipes.iter().position(|(id, _)| *id == pipe) else {
            return false;
        };
        self.pipes.remove(idx);
        if idx < self.cursor {
            self.cursor -= 1;
        }
        true
    }

    pub fn get(&self, pipe: PipeId) -> Option<Sender<Bytes>> {
        self.pipes
            .iter()
            .find(|(id, _)| *id == pipe)
            .map(|(_, tx)| tx.clone())
    }

    /// Next pipe in attach order, wrapping around.
    pub fn next_round_robin(&mut self) -> Option<(PipeId, Sender<Bytes>)> {
        if self.pipes.is_empty() {
            return None;
        }
        if self.cursor >= self.pipes.len() {
            self.cursor = 0;
        }
        let (pipe, tx) = &self.pipes[self.cursor];
        self.cursor += 1;
        Some((*pipe, tx.clone()))
    }

    pub fn senders(&self) -> Vec<(PipeId, Sender<Bytes>)> {
        self.pipes.clone()
    }

    pub fn clear(&mut self) {
        self.pipes.clear();
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.pipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.limit.is_some_and(|limit| self.pipes.len() >= limit)
    }
}
