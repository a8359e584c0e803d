//! The dispatch table.
//!
//! All seven commands are declared once, as data, in [`COMMANDS`]: name,
//! required lifecycle state, argument grammar, and handler. The name
//! index is built exactly once per process on first dispatch;
//! re-registration is not a supported operation.

use crate::session::{Session, SessionState};
use crate::commands;
use commlink_common::options::{CommandSyntax, FlagKind, FlagSpec, RequestDescriptor};
use commlink_common::protocol::{CommlinkError, Result};
use commlink_common::wire::ElementType;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

type HandlerFn = fn(&mut Session, &RequestDescriptor) -> Result<Value>;

/// One registered command: its name, the session state it requires, its
/// declared argument grammar, and its handler.
pub struct CommandSpec {
    pub name: &'static str,
    pub requires: SessionState,
    pub syntax: CommandSyntax,
    run: HandlerFn,
}

const TYPE_FLAG: FlagSpec = FlagSpec {
    name: "-type",
    kind: FlagKind::Keyword(&ElementType::KEYWORDS),
};

const NO_ARGS: CommandSyntax = CommandSyntax {
    min_args: 0,
    max_args: 0,
    positionals: 0,
    flags: &[],
};

static COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "init",
        requires: SessionState::Uninitialized,
        syntax: CommandSyntax {
            min_args: 0,
            max_args: 4,
            positionals: 0,
            flags: &[
                FlagSpec {
                    name: "-mpiqueue",
                    kind: FlagKind::Unit,
                },
                FlagSpec {
                    name: "-mpiversion",
                    kind: FlagKind::Unit,
                },
                FlagSpec {
                    name: "-mpinice",
                    kind: FlagKind::PositiveInt,
                },
            ],
        },
        run: commands::init,
    },
    CommandSpec {
        name: "finalize",
        requires: SessionState::Ready,
        syntax: NO_ARGS,
        run: commands::finalize,
    },
    CommandSpec {
        name: "size",
        requires: SessionState::Ready,
        syntax: NO_ARGS,
        run: commands::size,
    },
    CommandSpec {
        name: "rank",
        requires: SessionState::Ready,
        syntax: NO_ARGS,
        run: commands::rank,
    },
    CommandSpec {
        name: "barrier",
        requires: SessionState::Ready,
        syntax: NO_ARGS,
        run: commands::barrier,
    },
    CommandSpec {
        name: "send",
        requires: SessionState::Ready,
        syntax: CommandSyntax {
            min_args: 4,
            max_args: 5,
            positionals: 2,
            flags: &[
                TYPE_FLAG,
                FlagSpec {
                    name: "-list",
                    kind: FlagKind::Unit,
                },
            ],
        },
        run: commands::send,
    },
    CommandSpec {
        name: "recv",
        requires: SessionState::Ready,
        syntax: CommandSyntax {
            min_args: 3,
            max_args: 5,
            positionals: 1,
            flags: &[
                TYPE_FLAG,
                FlagSpec {
                    name: "-length",
                    kind: FlagKind::PositiveInt,
                },
            ],
        },
        run: commands::recv,
    },
];

static INDEX: OnceLock<HashMap<&'static str, &'static CommandSpec>> = OnceLock::new();

fn index() -> &'static HashMap<&'static str, &'static CommandSpec> {
    INDEX.get_or_init(|| COMMANDS.iter().map(|spec| (spec.name, spec)).collect())
}

/// The registered command names, in declaration order.
pub fn command_names() -> impl Iterator<Item = &'static str> {
    COMMANDS.iter().map(|spec| spec.name)
}

/// Resolves a command and runs it against the session.
///
/// Order of gates: name lookup, argument-count/flag parse, lifecycle
/// check, handler. The parse runs before the lifecycle check so a
/// malformed invocation is reported the same way in every state.
pub(crate) fn dispatch(session: &mut Session, name: &str, args: &[Value]) -> Result<Value> {
    let spec = index()
        .get(name)
        .copied()
        .ok_or_else(|| CommlinkError::UnknownCommand(name.to_string()))?;

    let req = spec.syntax.parse(spec.name, args)?;

    if session.state() != spec.requires {
        return Err(CommlinkError::Lifecycle {
            command: spec.name.to_string(),
            state: session.state().to_string(),
        });
    }

    tracing::debug!(command = spec.name, "dispatching");
    (spec.run)(session, &req)
}
