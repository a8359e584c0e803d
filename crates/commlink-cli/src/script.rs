//! Script-line tokenizing.
//!
//! A script is a sequence of lines, one command per line. The first
//! token is the command name; the rest become the dynamic argument
//! list. Tokens split on whitespace, except inside `[...]`/`{...}`
//! nesting and double-quoted strings, so JSON arrays like `[1, 2, 3]`
//! survive as single tokens. Each argument token is parsed as JSON
//! where possible and falls back to a plain string otherwise, which is
//! what turns `-type` into a string and `3` into a number.
//!
//! Blank lines and lines starting with `#` are skipped.

use commlink_common::protocol::CommandCall;
use serde_json::Value;

/// Splits one line into raw tokens, honoring bracket nesting and
/// double-quoted strings.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for c in line.chars() {
        if in_string {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                current.push(c);
            }
            '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ']' | '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn token_to_value(token: &str) -> Value {
    serde_json::from_str(token).unwrap_or_else(|_| Value::String(token.to_string()))
}

/// Parses one script line into a command call. Returns `None` for blank
/// lines and `#` comments.
pub fn parse_line(line: &str) -> Option<CommandCall> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let mut tokens = tokenize(trimmed).into_iter();
    let name = tokens.next()?;
    let args = tokens.map(|t| token_to_value(&t)).collect();
    Some(CommandCall::new(name, args))
}
