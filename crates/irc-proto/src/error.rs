//! Error types shared across the protocol crate.

use thiserror::Error;

/// Failure to parse a line into a [`crate::Message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageParseError {
    /// The line had no command token.
    #[error("empty command")]
    EmptyCommand,

    /// The line (excluding terminator) exceeded 510 bytes.
    #[error("line too long ({0} bytes)")]
    LineTooLong(usize),

    /// More than 15 parameters were given before a trailing marker.
    #[error("too many parameters")]
    TooManyParams,

    /// A prefix was introduced with `:` but contained nothing.
    #[error("empty prefix")]
    EmptyPrefix,

    /// The command token was neither all-letters nor a 3-digit numeric.
    #[error("invalid command token: {0}")]
    InvalidCommand(String),

    /// Catch-all for other grammar violations.
    #[error("malformed message: {0}")]
    Malformed(String),
}

/// Failure to validate or serialize an identifier / parameter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Nickname fails the grammar in the spec (length, first char, charset).
    #[error("invalid nickname: {0}")]
    InvalidNick(String),

    /// Channel name fails the grammar (prefix, length, forbidden bytes).
    #[error("invalid channel name: {0}")]
    InvalidChannel(String),

    /// SID is not exactly 3 chars of the required shape.
    #[error("invalid server id: {0}")]
    InvalidSid(String),

    /// UID is not exactly 9 chars of the required shape.
    #[error("invalid user id: {0}")]
    InvalidUid(String),

    /// A parameter destined for the wire contains CR, LF, or NUL.
    #[error("parameter contains a forbidden byte")]
    ForbiddenByte,

    /// A non-trailing parameter contains a space.
    #[error("non-trailing parameter contains a space")]
    UnexpectedSpace,
}
