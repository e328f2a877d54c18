//! Type definitions for messages, content and options.

mod content;
mod message;
mod options;

pub use content::*;
pub use message::*;
pub use options::*;
