//! Wire protocol types for a TS6-style IRC daemon.
//!
//! This crate has no knowledge of sockets, registries, or server state — it
//! only knows how to turn a line of bytes into a [`Message`] and back, and
//! how to validate and case-fold the identifiers ([`nick`], [`channel`],
//! [`sid`], [`uid`]) that appear in those messages.
//!
//! ```
//! use irc_proto::Message;
//!
//! let msg: Message = ":alice!alice@host PRIVMSG #test :hello there".parse().unwrap();
//! assert_eq!(msg.source_nick(), Some("alice"));
//! assert_eq!(msg.command.name(), "PRIVMSG");
//! ```

pub mod casemap;
pub mod command;
pub mod error;
pub mod message;
pub mod mode;
pub mod prefix;
pub mod response;
pub mod validation;

#[cfg(feature = "tokio")]
pub mod codec;

pub use casemap::{casefold, casefold_eq};
pub use command::Command;
pub use error::{MessageParseError, ValidationError};
pub use message::{Message, MAX_LINE_LEN, MAX_PARAMS};
pub use mode::{ChannelMode, ChannelModeChange, ModeSign, UserMode};
pub use prefix::Prefix;
pub use response::Response;
pub use validation::{glob_match, mask_match, Sid, Uid};

#[cfg(feature = "tokio")]
pub use codec::LineCodec;
