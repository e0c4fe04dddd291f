//! Message framing: one decoded line of the wire protocol.

mod parse;
mod serialize;
mod types;

pub use parse::parse_line;
pub use serialize::serialize_line;
pub use types::{Message, MAX_LINE_LEN, MAX_PARAMS};
