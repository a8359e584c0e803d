//! In-process local group backend
//!
//! A [`LocalGroup`] wires a fixed-size set of endpoints over
//! `std::sync::mpsc` channels plus one shared [`Barrier`]. Each endpoint
//! implements [`Backend`] for exactly one participant; the intended use
//! is one endpoint per OS thread.
//!
//! Delivery semantics:
//!
//! - Each endpoint owns a single inbox; senders push envelopes tagged
//!   with their own rank. A receive for `(source, tag)` takes the oldest
//!   matching envelope, stashing non-matching envelopes without
//!   reordering them, so identically tagged messages between an ordered
//!   pair of endpoints are observed in send order.
//! - A received message must carry exactly the requested element type
//!   and count; a mismatch is reported as an error rather than being
//!   truncated or padded.

use crate::{Backend, BackendError, InitOptions, Result};
use commlink_common::wire::{ElementType, TypedBuffer};
use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Barrier};

/// One point-to-point message in flight inside a local group.
#[derive(Debug)]
struct Envelope {
    source: i32,
    tag: i32,
    payload: TypedBuffer,
}

/// Factory for a fully wired in-process group.
pub struct LocalGroup;

impl LocalGroup {
    /// Creates `size` connected endpoints, one per participant. Rank is
    /// assigned by position in the returned vector.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn connect(size: usize) -> Vec<LocalEndpoint> {
        assert!(size > 0, "a local group needs at least one participant");

        let (senders, inboxes): (Vec<_>, Vec<_>) = (0..size).map(|_| channel()).unzip();
        let barrier = Arc::new(Barrier::new(size));

        inboxes
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| LocalEndpoint {
                rank: rank as i32,
                size: size as i32,
                peers: senders.clone(),
                inbox,
                stashed: VecDeque::new(),
                barrier: Arc::clone(&barrier),
                initialized: false,
                finalized: false,
                startup_args: None,
            })
            .collect()
    }
}

/// One participant's handle into a [`LocalGroup`].
pub struct LocalEndpoint {
    rank: i32,
    size: i32,
    peers: Vec<Sender<Envelope>>,
    inbox: Receiver<Envelope>,
    stashed: VecDeque<Envelope>,
    barrier: Arc<Barrier>,
    initialized: bool,
    finalized: bool,
    startup_args: Option<Vec<String>>,
}

impl LocalEndpoint {
    /// The startup argument list recorded at `initialize`, if any.
    /// Observable so callers can verify what reached the backend.
    pub fn startup_args(&self) -> Option<&[String]> {
        self.startup_args.as_deref()
    }

    fn ensure_ready(&self) -> Result<()> {
        if !self.initialized {
            Err(BackendError::NotInitialized)
        } else if self.finalized {
            Err(BackendError::Finalized)
        } else {
            Ok(())
        }
    }

    fn check_delivery(&self, env: Envelope, ty: ElementType, len: usize) -> Result<TypedBuffer> {
        if env.payload.element_type() != ty || env.payload.len() != len {
            return Err(BackendError::Mismatch(format!(
                "expected {} x{}, got {} x{}",
                ty.describe(),
                len,
                env.payload.element_type().describe(),
                env.payload.len()
            )));
        }
        Ok(env.payload)
    }
}

impl Backend for LocalEndpoint {
    fn initialize(&mut self, options: &InitOptions) -> Result<()> {
        if self.initialized {
            return Err(BackendError::AlreadyInitialized);
        }
        let args = options.to_backend_args();
        tracing::debug!(rank = self.rank, ?args, "local endpoint initialized");
        self.startup_args = Some(args);
        self.initialized = true;
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.ensure_ready()?;
        tracing::debug!(rank = self.rank, "local endpoint finalized");
        self.finalized = true;
        Ok(())
    }

    fn group_size(&self) -> Result<i32> {
        self.ensure_ready()?;
        Ok(self.size)
    }

    fn self_rank(&self) -> Result<i32> {
        self.ensure_ready()?;
        Ok(self.rank)
    }

    fn barrier(&self) -> Result<()> {
        self.ensure_ready()?;
        self.barrier.wait();
        Ok(())
    }

    fn send(&mut self, buffer: &TypedBuffer, dest: i32, tag: i32) -> Result<()> {
        self.ensure_ready()?;
        let peer = usize::try_from(dest)
            .ok()
            .and_then(|d| self.peers.get(d))
            .ok_or(BackendError::NoSuchRank(dest))?;
        peer.send(Envelope {
            source: self.rank,
            tag,
            payload: buffer.clone(),
        })
        .map_err(|_| BackendError::Disconnected)
    }

    fn recv(&mut self, ty: ElementType, len: usize, source: i32, tag: i32) -> Result<TypedBuffer> {
        self.ensure_ready()?;
        if source < 0 || source >= self.size {
            return Err(BackendError::NoSuchRank(source));
        }

        // Oldest stashed match first, so stashing never reorders a pair.
        if let Some(pos) = self
            .stashed
            .iter()
            .position(|e| e.source == source && e.tag == tag)
        {
            let env = self.stashed.remove(pos).expect("position came from iter");
            return self.check_delivery(env, ty, len);
        }

        loop {
            let env = self.inbox.recv().map_err(|_| BackendError::Disconnected)?;
            if env.source == source && env.tag == tag {
                return self.check_delivery(env, ty, len);
            }
            self.stashed.push_back(env);
        }
    }
}
