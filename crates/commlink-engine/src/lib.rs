//! # Commlink Engine
//!
//! The command layer proper: seven handlers (`init`, `finalize`, `size`,
//! `rank`, `barrier`, `send`, `recv`), the session lifecycle state
//! machine, and the dispatch table that maps command names to handlers.
//!
//! A [`Session`] owns one [`Backend`](commlink_backend::Backend)
//! instance and a lifecycle state. Callers drive it through
//! [`Session::dispatch`], handing over a command name and a dynamic
//! argument list; every invocation yields exactly one result value or
//! one structured error. `barrier`, `send` and `recv` block the calling
//! thread until the backend's distributed condition is satisfied.

mod commands;
mod registry;
mod session;

pub use registry::{command_names, CommandSpec};
pub use session::{Session, SessionState};

/// Message tag used for all point-to-point traffic. The command surface
/// exposes no tag selection; type, source and destination rank alone
/// distinguish messages.
pub const MESSAGE_TAG: i32 = 0;
