//! # Commlink Backend
//!
//! The messaging collaborator interface the command layer drives, plus a
//! complete in-process implementation.
//!
//! The [`Backend`] trait is the seam between the command layer and
//! whatever actually moves bytes between participants: every command
//! handler invokes exactly one backend primitive. Implementations own
//! the blocking behavior (`barrier`, `send` and `recv` may block the
//! calling thread indefinitely) and the per-pair FIFO ordering
//! guarantee for identically tagged point-to-point messages.
//!
//! [`LocalGroup`] wires a fixed-size group of endpoints over in-process
//! channels, one endpoint per participant, typically one per OS thread.
//! It is the backend used by the CLI driver and by tests.

pub mod local;

use commlink_common::wire::{ElementType, TypedBuffer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use local::{LocalEndpoint, LocalGroup};

/// Failures reported by a messaging backend.
///
/// The command layer wraps these with the failing command's name; the
/// backend only describes what went wrong at its own level.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("not initialized")]
    NotInitialized,

    #[error("already initialized")]
    AlreadyInitialized,

    #[error("already finalized")]
    Finalized,

    #[error("no such rank {0}")]
    NoSuchRank(i32),

    #[error("peer disconnected")]
    Disconnected,

    #[error("message mismatch: {0}")]
    Mismatch(String),
}

pub type Result<T> = std::result::Result<T, BackendError>;

/// Structured startup options for backend initialization.
///
/// Each option independently contributes its own entry to the backend's
/// native argument list: the queue flag and the niceness value do not
/// gate each other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitOptions {
    /// Request message-queue startup behavior (`-mpiqueue`).
    pub queue: bool,
    /// Request version reporting at startup (`-mpiversion`).
    pub version: bool,
    /// Niceness to run at, strictly positive (`-mpinice N`).
    pub nice: Option<u32>,
}

impl InitOptions {
    /// Translates the options into the backend's native startup
    /// argument list.
    pub fn to_backend_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.queue {
            args.push("-mpiqueue".to_string());
        }
        if self.version {
            args.push("-mpiversion".to_string());
        }
        if let Some(nice) = self.nice {
            args.push("-mpinice".to_string());
            args.push(nice.to_string());
        }
        args
    }
}

/// The messaging primitives the command layer requires.
///
/// One instance belongs to one participant. All operations are blocking;
/// none expose a timeout or cancellation. Implementations must deliver
/// identically tagged messages between a given ordered pair of
/// participants in send order.
pub trait Backend: Send {
    /// Brings the messaging environment up for this participant.
    fn initialize(&mut self, options: &InitOptions) -> Result<()>;

    /// Tears the messaging environment down. After a successful return
    /// no other operation is valid.
    fn finalize(&mut self) -> Result<()>;

    /// Number of participants in the global group.
    fn group_size(&self) -> Result<i32>;

    /// This participant's rank, in `[0, group_size)`.
    fn self_rank(&self) -> Result<i32>;

    /// Blocks until every participant in the group has called `barrier`.
    fn barrier(&self) -> Result<()>;

    /// Blocking send of a typed buffer to `dest`. May block until the
    /// destination has posted a matching receive.
    fn send(&mut self, buffer: &TypedBuffer, dest: i32, tag: i32) -> Result<()>;

    /// Blocking receive of `len` elements of `ty` from `source`. Blocks
    /// until a matching message arrives.
    fn recv(&mut self, ty: ElementType, len: usize, source: i32, tag: i32) -> Result<TypedBuffer>;
}
