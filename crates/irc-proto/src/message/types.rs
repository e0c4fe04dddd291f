use crate::command::Command;
use crate::prefix::Prefix;

/// Maximum line length including the `\r\n` terminator (spec §4.A / §6).
pub const MAX_LINE_LEN: usize = 512;

/// Maximum number of space-separated parameters before a trailing marker.
pub const MAX_PARAMS: usize = 15;

/// One decoded line of the IRC wire protocol.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    /// `:<source>`, if present.
    pub prefix: Option<Prefix>,
    /// Command name/numeric and its parameters.
    pub command: Command,
}

impl Message {
    /// Construct a message with no prefix.
    pub fn new(command: Command) -> Self {
        Message {
            prefix: None,
            command,
        }
    }

    /// Construct a message with an explicit prefix.
    pub fn with_prefix(prefix: impl Into<String>, command: Command) -> Self {
        Message {
            prefix: Some(Prefix::parse(&prefix.into())),
            command,
        }
    }

    /// The nickname from the prefix, if this was sent by a client.
    pub fn source_nick(&self) -> Option<&str> {
        self.prefix.as_ref().and_then(Prefix::nick)
    }
}

impl From<Command> for Message {
    fn from(command: Command) -> Self {
        Message::new(command)
    }
}
