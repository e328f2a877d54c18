//! Internal implementation details.

mod message_parser;

pub use message_parser::parse_message;
