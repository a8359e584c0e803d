//! Table-driven option parsing
//!
//! Every command declares its argument grammar once, as data: the
//! accepted argument-count bounds, the number of trailing positional
//! arguments, and the set of recognized flags with their arities and
//! value validators. Parsing walks the grammar instead of ad hoc string
//! comparison chains, so all commands fail the same way on the same
//! classes of malformed input.
//!
//! Parsing order is fixed:
//!
//! 1. the argument-count gate (fails with `ArityMismatch` before
//!    anything else is looked at),
//! 2. the flag scan over the prefix of the argument list,
//! 3. capture of the trailing positional arguments.
//!
//! The parser has no side effects: it produces either a
//! [`RequestDescriptor`] or an error, and never touches the backend.

use crate::protocol::error::{CommlinkError, Result};
use serde_json::Value;

/// Value validation a flag declares for its trailing token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    /// 0-ary flag; its presence is the value.
    Unit,
    /// 1-ary flag taking any integer.
    Int,
    /// 1-ary flag taking a strictly positive integer.
    PositiveInt,
    /// 1-ary flag taking one keyword out of a fixed set.
    Keyword(&'static [&'static str]),
}

/// One recognized flag: its name and the validation of its value.
#[derive(Debug, Clone, Copy)]
pub struct FlagSpec {
    pub name: &'static str,
    pub kind: FlagKind,
}

/// A command's declared argument grammar.
///
/// `min_args`/`max_args` bound the total argument count (the command
/// name itself is not counted); `positionals` trailing arguments are
/// reserved and everything before them must be flags.
#[derive(Debug, Clone, Copy)]
pub struct CommandSyntax {
    pub min_args: usize,
    pub max_args: usize,
    pub positionals: usize,
    pub flags: &'static [FlagSpec],
}

/// A validated flag value.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagValue {
    /// A 0-ary flag was present.
    Set,
    /// A validated integer value.
    Int(i64),
    /// A validated keyword, borrowed from the declared set.
    Keyword(&'static str),
}

/// Structured result of option parsing: the recognized flag values plus
/// the residual positional arguments, still in caller order.
#[derive(Debug)]
pub struct RequestDescriptor<'a> {
    flags: Vec<(&'static str, FlagValue)>,
    positionals: &'a [Value],
}

impl<'a> RequestDescriptor<'a> {
    /// Looks up a flag's value. When a flag was given more than once the
    /// last occurrence wins, matching a left-to-right overwrite scan.
    pub fn flag(&self, name: &str) -> Option<&FlagValue> {
        self.flags
            .iter()
            .rev()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    /// Whether a 0-ary flag was present.
    pub fn is_set(&self, name: &str) -> bool {
        self.flag(name).is_some()
    }

    pub fn int_flag(&self, name: &str) -> Option<i64> {
        match self.flag(name) {
            Some(FlagValue::Int(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn keyword_flag(&self, name: &str) -> Option<&'static str> {
        match self.flag(name) {
            Some(FlagValue::Keyword(k)) => Some(k),
            _ => None,
        }
    }

    /// The residual positional arguments, in caller order.
    pub fn positionals(&self) -> &'a [Value] {
        self.positionals
    }
}

impl CommandSyntax {
    /// Parses an argument list against this grammar.
    ///
    /// `command` is only used for error context. See the module docs for
    /// the parsing order; the argument-count gate always runs first.
    pub fn parse<'a>(&self, command: &str, args: &'a [Value]) -> Result<RequestDescriptor<'a>> {
        if args.len() < self.min_args || args.len() > self.max_args {
            return Err(CommlinkError::ArityMismatch {
                command: command.to_string(),
                expected: self.describe_bounds(),
                actual: args.len(),
            });
        }

        // The count gate guarantees len >= min_args >= positionals.
        let flag_end = args.len() - self.positionals;
        let mut flags = Vec::new();
        let mut i = 0;
        while i < flag_end {
            let spec = self.recognize(command, &args[i])?;
            match spec.kind {
                FlagKind::Unit => flags.push((spec.name, FlagValue::Set)),
                kind => {
                    i += 1;
                    if i >= flag_end {
                        return Err(CommlinkError::InvalidValue {
                            command: command.to_string(),
                            option: spec.name.to_string(),
                            reason: "missing value".to_string(),
                        });
                    }
                    flags.push((spec.name, validate_value(command, spec.name, kind, &args[i])?));
                }
            }
            i += 1;
        }

        Ok(RequestDescriptor {
            flags,
            positionals: &args[flag_end..],
        })
    }

    fn recognize(&self, command: &str, token: &Value) -> Result<&FlagSpec> {
        token
            .as_str()
            .and_then(|name| self.flags.iter().find(|f| f.name == name))
            .ok_or_else(|| CommlinkError::UnknownOption {
                command: command.to_string(),
                option: render_token(token),
            })
    }

    fn describe_bounds(&self) -> String {
        match (self.min_args, self.max_args) {
            (0, 0) => "no arguments".to_string(),
            (0, max) => format!("at most {max}"),
            (min, max) if min == max => format!("exactly {min}"),
            (min, max) => format!("{min} to {max}"),
        }
    }
}

fn validate_value(command: &str, option: &str, kind: FlagKind, token: &Value) -> Result<FlagValue> {
    let invalid = |reason: String| CommlinkError::InvalidValue {
        command: command.to_string(),
        option: option.to_string(),
        reason,
    };

    match kind {
        FlagKind::Unit => unreachable!("unit flags consume no value"),
        FlagKind::Int => token
            .as_i64()
            .map(FlagValue::Int)
            .ok_or_else(|| invalid(format!("expected integer, got {}", render_token(token)))),
        FlagKind::PositiveInt => match token.as_i64() {
            Some(n) if n > 0 => Ok(FlagValue::Int(n)),
            _ => Err(invalid(format!(
                "expected positive integer, got {}",
                render_token(token)
            ))),
        },
        FlagKind::Keyword(allowed) => token
            .as_str()
            .and_then(|s| allowed.iter().copied().find(|k| *k == s))
            .map(FlagValue::Keyword)
            .ok_or_else(|| {
                invalid(format!(
                    "expected {}, got {}",
                    allowed.join("|"),
                    render_token(token)
                ))
            }),
    }
}

fn render_token(token: &Value) -> String {
    match token {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
