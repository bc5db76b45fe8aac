//! Inbound realtime message types, validation, and parsing.

pub mod parser;
pub mod types;
pub mod validator;

pub use parser::parse_push;
pub use types::PushEvent;
