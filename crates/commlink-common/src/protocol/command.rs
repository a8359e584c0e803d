use serde::{Deserialize, Serialize};

pub type CommandName = String;
pub type CommandArgs = Vec<serde_json::Value>;

/// A named command invocation: the command name plus its ordered dynamic
/// argument list, exactly as the host environment supplied it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandCall {
    pub name: CommandName,
    pub args: CommandArgs,
}

impl CommandCall {
    pub fn new(name: impl Into<String>, args: CommandArgs) -> Self {
        CommandCall {
            name: name.into(),
            args,
        }
    }
}
