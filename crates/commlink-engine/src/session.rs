use commlink_backend::Backend;
use commlink_common::protocol::Result;
use serde_json::Value;
use std::fmt;

/// Lifecycle of a session: `Uninitialized -> Ready -> Finalized`, one
/// way only.
///
/// The reference environment left this implicit in global backend state;
/// here the transitions are explicit so a double `init`, a `finalize`
/// before `init`, or any use after `finalize` is rejected at the command
/// boundary instead of reaching the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Ready,
    Finalized,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Ready => "ready",
            SessionState::Finalized => "finalized",
        };
        f.write_str(name)
    }
}

/// One participant's command session: a messaging backend plus the
/// lifecycle state guarding it.
///
/// A session is single-threaded by construction (dispatch takes
/// `&mut self`) and nothing inside it survives an invocation except
/// the lifecycle state itself.
pub struct Session {
    backend: Box<dyn Backend>,
    state: SessionState,
}

impl Session {
    pub fn new(backend: impl Backend + 'static) -> Self {
        Session {
            backend: Box::new(backend),
            state: SessionState::Uninitialized,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Resolves and runs one command. This is the only entry point; see
    /// the crate docs for blocking behavior.
    pub fn dispatch(&mut self, name: &str, args: &[Value]) -> Result<Value> {
        crate::registry::dispatch(self, name, args)
    }

    pub(crate) fn backend_mut(&mut self) -> &mut dyn Backend {
        self.backend.as_mut()
    }

    pub(crate) fn mark_ready(&mut self) {
        self.state = SessionState::Ready;
    }

    pub(crate) fn mark_finalized(&mut self) {
        self.state = SessionState::Finalized;
    }
}
