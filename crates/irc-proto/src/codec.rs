//! `tokio_util` framing: newline-terminated lines, decoded straight into
//! [`Message`] (spec §4.A: CRLF-terminated, 512 bytes including terminator).

use bytes::BytesMut;
use std::io;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::MessageParseError;
use crate::message::{parse_line, serialize_line, Message, MAX_LINE_LEN};

/// Everything that can go wrong turning bytes into a [`Message`] or back.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Underlying socket I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A complete line was not valid UTF-8.
    #[error("line is not valid utf-8")]
    InvalidUtf8,

    /// The line did not parse as a [`Message`].
    #[error(transparent)]
    Parse(#[from] MessageParseError),

    /// A [`Message`] refused to serialize (forbidden byte, embedded space).
    #[error(transparent)]
    Validation(#[from] crate::error::ValidationError),
}

/// Frames a byte stream into `\r\n`-terminated [`Message`]s, enforcing the
/// wire protocol's maximum line length on both read and write.
///
/// A bare `\n` is also accepted as a terminator, matching the leniency most
/// deployed clients rely on; only `\r\n` is ever written.
pub struct LineCodec {
    next_index: usize,
    max_len: usize,
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl LineCodec {
    /// A codec enforcing the standard 512-byte line limit.
    pub fn new() -> Self {
        Self {
            next_index: 0,
            max_len: MAX_LINE_LEN,
        }
    }

    /// A codec with a non-standard line length limit, for tests.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }
}

impl Decoder for LineCodec {
    type Item = Message;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>, CodecError> {
        let newline_at = src[self.next_index..].iter().position(|b| *b == b'\n');
        let Some(offset) = newline_at else {
            self.next_index = src.len();
            if src.len() > self.max_len {
                return Err(MessageParseError::LineTooLong(src.len()).into());
            }
            return Ok(None);
        };

        let line_end = self.next_index + offset;
        let raw = src.split_to(line_end + 1);
        self.next_index = 0;

        if raw.len() > self.max_len {
            return Err(MessageParseError::LineTooLong(raw.len()).into());
        }

        let trimmed = raw
            .strip_suffix(b"\r\n")
            .or_else(|| raw.strip_suffix(b"\n"))
            .unwrap_or(&raw[..]);
        let text = std::str::from_utf8(trimmed).map_err(|_| CodecError::InvalidUtf8)?;
        if text.is_empty() {
            return Ok(None);
        }
        Ok(Some(parse_line(text)?))
    }
}

impl Encoder<&Message> for LineCodec {
    type Error = CodecError;

    fn encode(&mut self, msg: &Message, dst: &mut BytesMut) -> Result<(), CodecError> {
        let line = serialize_line(msg)?;
        if line.len() + 2 > self.max_len {
            return Err(MessageParseError::LineTooLong(line.len() + 2).into());
        }
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}

impl Encoder<Message> for LineCodec {
    type Error = CodecError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> Result<(), CodecError> {
        Encoder::<&Message>::encode(self, &msg, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;

    #[test]
    fn decodes_one_buffered_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :token\r\n");
        let msg = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(msg.command, Command::Ping("token".to_string()));
        assert!(buf.is_empty());
    }

    #[test]
    fn holds_partial_line_until_newline() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :to");
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        buf.extend_from_slice(b"ken\r\n");
        let msg = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(msg.command, Command::Ping("token".to_string()));
    }

    #[test]
    fn rejects_line_over_limit() {
        let mut codec = LineCodec::with_max_len(16);
        let mut buf = BytesMut::from("PRIVMSG #c :this is way too long\r\n");
        assert!(matches!(
            codec.decode(&mut buf),
            Err(CodecError::Parse(MessageParseError::LineTooLong(_)))
        ));
    }

    #[test]
    fn encodes_with_crlf_terminator() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();
        let msg = Message::new(Command::Pong("token".to_string()));
        Encoder::<&Message>::encode(&mut codec, &msg, &mut buf).unwrap();
        assert_eq!(&buf[..], b"PONG :token\r\n");
    }
}
