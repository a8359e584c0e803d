//! # Commlink Common
//!
//! Shared building blocks for the Commlink command layer:
//!
//! - **protocol**: the command call and reply envelopes plus the error
//!   taxonomy every command resolves to
//! - **options**: the table-driven option parser that turns a dynamic
//!   argument list into a structured request descriptor
//! - **wire**: the value marshaller that converts dynamic values to and
//!   from fixed-width typed buffers
//!
//! Dynamic values are represented as `serde_json::Value` throughout: a
//! command's arguments are an ordered list of values, and a command's
//! result is a single value. Everything in this crate is synchronous and
//! allocation happens per invocation; no state survives across calls.

pub mod options;
pub mod protocol;
pub mod wire;

pub use options::{CommandSyntax, FlagKind, FlagSpec, FlagValue, RequestDescriptor};
pub use protocol::{CommandArgs, CommandCall, CommlinkError, Reply, Result};
pub use wire::{ElementType, TypedBuffer};
