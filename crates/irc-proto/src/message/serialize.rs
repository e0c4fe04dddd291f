use super::types::Message;
use crate::error::ValidationError;
use std::fmt;

fn has_forbidden_byte(s: &str) -> bool {
    s.bytes().any(|b| matches!(b, b'\r' | b'\n' | 0))
}

/// Render a message to its wire form, without the `\r\n` terminator.
///
/// Refuses to serialize a parameter containing CR, LF, or NUL, and refuses
/// a non-trailing parameter containing a space (spec §4.A).
pub fn serialize_line(msg: &Message) -> Result<String, ValidationError> {
    let mut out = String::new();
    if let Some(prefix) = &msg.prefix {
        out.push(':');
        out.push_str(&prefix.to_string());
        out.push(' ');
    }
    out.push_str(&msg.command.name());

    let params = msg.command.params();
    let last_idx = params.len().checked_sub(1);
    for (i, param) in params.iter().enumerate() {
        if has_forbidden_byte(param) {
            return Err(ValidationError::ForbiddenByte);
        }
        let is_last = Some(i) == last_idx;
        let needs_colon = is_last && (param.is_empty() || param.starts_with(':') || param.contains(' '));
        if !is_last && param.contains(' ') {
            return Err(ValidationError::UnexpectedSpace);
        }
        out.push(' ');
        if needs_colon {
            out.push(':');
        }
        out.push_str(param);
    }
    Ok(out)
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serialize_line(self) {
            Ok(line) => f.write_str(&line),
            Err(_) => Err(fmt::Error),
        }
    }
}
