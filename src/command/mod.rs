//! Chat command pipeline
//!
//! Raw message -> `parse` -> `Command` -> `execute` -> `Reply`

pub mod executor;
pub mod parser;
pub mod reply;

pub use executor::{execute, Invoker};
pub use parser::{parse, Command, ParseError};
pub use reply::Reply;
