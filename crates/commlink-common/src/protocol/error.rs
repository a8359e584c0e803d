use thiserror::Error;

/// The command-boundary error taxonomy.
///
/// Every failure inside the command layer is recovered at the command
/// boundary as exactly one of these kinds; nothing lower-level escapes.
/// Each variant carries enough context to identify the command and the
/// offending argument.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommlinkError {
    /// The argument count is outside the command's declared bounds.
    /// Checked before any flag or positional processing.
    #[error("{command}: wrong number of arguments: expected {expected}, got {actual}")]
    ArityMismatch {
        command: String,
        expected: String,
        actual: usize,
    },

    /// A token in the flag region did not match any declared flag.
    #[error("{command}: unknown option {option}")]
    UnknownOption { command: String, option: String },

    /// A flag's value token failed its declared validation.
    #[error("{command}: invalid value for {option}: {reason}")]
    InvalidValue {
        command: String,
        option: String,
        reason: String,
    },

    /// A payload element could not be converted to the declared element
    /// type. Reports the first offending index.
    #[error("element {index} is not representable as {expected}")]
    TypeMismatch { index: usize, expected: &'static str },

    /// The required `-type` option was absent on `send` or `recv`.
    #[error("{command}: missing required -type option")]
    MissingType { command: String },

    /// The messaging backend reported a failure.
    #[error("{command} failed: {reason}")]
    Backend { command: String, reason: String },

    /// Dispatch found no handler registered under this name.
    #[error("unknown command {0}")]
    UnknownCommand(String),

    /// The command is not valid in the session's current lifecycle state.
    #[error("{command}: invalid in {state} session")]
    Lifecycle { command: String, state: String },
}

pub type Result<T> = std::result::Result<T, CommlinkError>;
