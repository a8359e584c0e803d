pub mod command;
pub mod error;
pub mod reply;


pub use command::{CommandArgs, CommandCall, CommandName};
pub use error::{CommlinkError, Result};
pub use reply::Reply;
