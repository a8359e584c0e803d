//! Command reply envelope.
//!
//! A command invocation produces exactly one reply: a result value on
//! success, or an error message on failure. The envelope is serializable
//! so front ends can print it as one JSON object per invocation.

use serde::{Deserialize, Serialize};

/// Result value of a successful command (JSON value).
pub type CommandResult = serde_json::Value;

/// The success-or-error envelope for a single command invocation.
///
/// Exactly one of `result` and `error` is populated.
///
/// # Example
///
/// ```
/// use commlink_common::protocol::reply::Reply;
/// use serde_json::json;
///
/// let ok = Reply::success(json!(1));
/// assert!(ok.success);
///
/// let failed = Reply::error("send failed: no such rank 7");
/// assert!(!failed.success);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reply {
    /// Result value (present on success)
    pub result: Option<CommandResult>,
    /// Error message (present on failure)
    pub error: Option<String>,
    /// Whether the command succeeded
    pub success: bool,
}

impl Reply {
    /// Creates a successful reply carrying the command's result value.
    pub fn success(result: CommandResult) -> Self {
        Reply {
            result: Some(result),
            error: None,
            success: true,
        }
    }

    /// Creates an error reply carrying the rendered error message.
    pub fn error(error: impl Into<String>) -> Self {
        Reply {
            result: None,
            error: Some(error.into()),
            success: false,
        }
    }

    /// Folds a command outcome into a reply.
    pub fn from_outcome(outcome: super::Result<CommandResult>) -> Self {
        match outcome {
            Ok(value) => Reply::success(value),
            Err(e) => Reply::error(e.to_string()),
        }
    }
}
