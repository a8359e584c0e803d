//! The seven command handlers.
//!
//! Every handler follows the same shape: the dispatch table has already
//! applied the argument-count gate and the flag scan, so a handler
//! receives a validated [`RequestDescriptor`], optionally marshals the
//! payload, invokes exactly one backend primitive, and builds the result
//! value. Failure at any step short-circuits the rest via `?`; the typed
//! buffer, when one exists, is dropped before the handler returns.

use crate::session::Session;
use crate::MESSAGE_TAG;
use commlink_backend::{BackendError, InitOptions};
use commlink_common::options::RequestDescriptor;
use commlink_common::protocol::{CommlinkError, Result};
use commlink_common::wire::{marshal_list, marshal_scalar, unmarshal, ElementType};
use serde_json::Value;

fn backend_err(command: &'static str) -> impl FnOnce(BackendError) -> CommlinkError {
    move |e| CommlinkError::Backend {
        command: command.to_string(),
        reason: e.to_string(),
    }
}

/// Resolves the mandatory `-type` flag. The parser has already vetted
/// the keyword, so the only failure left is its absence.
fn required_type(command: &'static str, req: &RequestDescriptor) -> Result<ElementType> {
    match req.keyword_flag("-type") {
        Some(keyword) => {
            ElementType::from_keyword(keyword).ok_or_else(|| CommlinkError::InvalidValue {
                command: command.to_string(),
                option: "-type".to_string(),
                reason: format!("unsupported element type {keyword}"),
            })
        }
        None => Err(CommlinkError::MissingType {
            command: command.to_string(),
        }),
    }
}

/// Converts a positional rank argument to a backend rank. Range checking
/// belongs to the backend; this only demands an exact integer.
fn rank_arg(command: &'static str, what: &'static str, value: &Value) -> Result<i32> {
    value
        .as_i64()
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| CommlinkError::InvalidValue {
            command: command.to_string(),
            option: what.to_string(),
            reason: format!("expected integer rank, got {value}"),
        })
}

/// `init ?-mpiqueue? ?-mpiversion? ?-mpinice nn?`
///
/// Translates the recognized flags into the backend's startup option
/// list and brings the environment up. On failure the session stays
/// uninitialized.
pub(crate) fn init(session: &mut Session, req: &RequestDescriptor) -> Result<Value> {
    let options = InitOptions {
        queue: req.is_set("-mpiqueue"),
        version: req.is_set("-mpiversion"),
        nice: req.int_flag("-mpinice").map(|n| n as u32),
    };
    tracing::debug!(?options, "initializing backend");
    session
        .backend_mut()
        .initialize(&options)
        .map_err(backend_err("init"))?;
    session.mark_ready();
    Ok(Value::from(1))
}

/// `finalize`
///
/// Tears the environment down. The session is retired even when the
/// backend reports failure; there is no rollback into a usable state.
pub(crate) fn finalize(session: &mut Session, _req: &RequestDescriptor) -> Result<Value> {
    let outcome = session.backend_mut().finalize();
    session.mark_finalized();
    outcome.map_err(backend_err("finalize"))?;
    Ok(Value::from(1))
}

/// `size`
pub(crate) fn size(session: &mut Session, _req: &RequestDescriptor) -> Result<Value> {
    let size = session
        .backend_mut()
        .group_size()
        .map_err(backend_err("size"))?;
    Ok(Value::from(size))
}

/// `rank`
pub(crate) fn rank(session: &mut Session, _req: &RequestDescriptor) -> Result<Value> {
    let rank = session
        .backend_mut()
        .self_rank()
        .map_err(backend_err("rank"))?;
    Ok(Value::from(rank))
}

/// `barrier`
///
/// Blocks until every participant has entered the barrier.
pub(crate) fn barrier(session: &mut Session, _req: &RequestDescriptor) -> Result<Value> {
    session
        .backend_mut()
        .barrier()
        .map_err(backend_err("barrier"))?;
    Ok(Value::from(1))
}

/// `send -type integer|double ?-list? value dest`
///
/// Marshals the payload into a typed buffer and hands it to the backend.
/// Marshalling failures surface before any backend call.
pub(crate) fn send(session: &mut Session, req: &RequestDescriptor) -> Result<Value> {
    let ty = required_type("send", req)?;
    let positionals = req.positionals();
    let payload = &positionals[0];
    let dest = rank_arg("send", "destination rank", &positionals[1])?;

    let buffer = if req.is_set("-list") {
        let items = payload
            .as_array()
            .ok_or_else(|| CommlinkError::InvalidValue {
                command: "send".to_string(),
                option: "-list".to_string(),
                reason: format!("payload is not a list: {payload}"),
            })?;
        marshal_list(items, ty)?
    } else {
        marshal_scalar(payload, ty)?
    };

    tracing::debug!(dest, len = buffer.len(), "sending buffer");
    session
        .backend_mut()
        .send(&buffer, dest, MESSAGE_TAG)
        .map_err(backend_err("send"))?;
    Ok(Value::from(1))
}

/// `recv -type integer|double ?-length n? source`
///
/// Receives a buffer of `-length` elements (one in scalar mode) and
/// unmarshals it in the caller's declared mode: `-length` always yields
/// a list, even for a single element.
pub(crate) fn recv(session: &mut Session, req: &RequestDescriptor) -> Result<Value> {
    let ty = required_type("recv", req)?;
    let (list_mode, len) = match req.int_flag("-length") {
        Some(n) => (true, n as usize),
        None => (false, 1),
    };
    let source = rank_arg("recv", "source rank", &req.positionals()[0])?;

    tracing::debug!(source, len, "receiving buffer");
    let buffer = session
        .backend_mut()
        .recv(ty, len, source, MESSAGE_TAG)
        .map_err(backend_err("recv"))?;
    Ok(unmarshal(&buffer, list_mode))
}
