use super::types::{Message, MAX_PARAMS};
use crate::command::Command;
use crate::error::MessageParseError;
use crate::prefix::Prefix;
use std::str::FromStr;

fn split_first_token(s: &str) -> (&str, &str) {
    match s.find(' ') {
        Some(idx) => (&s[..idx], &s[idx + 1..]),
        None => (s, ""),
    }
}

/// Parse one line (terminator already stripped by the transport) into a
/// [`Message`]. See spec §4.A for the full grammar.
pub fn parse_line(line: &str) -> Result<Message, MessageParseError> {
    if line.len() > 510 {
        return Err(MessageParseError::LineTooLong(line.len()));
    }

    let mut rest = line;
    let mut prefix = None;

    if let Some(stripped) = rest.strip_prefix(':') {
        let (tok, remainder) = split_first_token(stripped);
        if tok.is_empty() {
            return Err(MessageParseError::EmptyPrefix);
        }
        prefix = Some(Prefix::parse(tok));
        rest = remainder;
    }

    let (cmd_tok, mut rest) = split_first_token(rest.trim_start_matches(' '));
    if cmd_tok.is_empty() {
        return Err(MessageParseError::EmptyCommand);
    }
    let is_letters = cmd_tok.chars().all(|c| c.is_ascii_alphabetic());
    let is_numeric = cmd_tok.len() == 3 && cmd_tok.chars().all(|c| c.is_ascii_digit());
    if !(is_letters || is_numeric) {
        return Err(MessageParseError::InvalidCommand(cmd_tok.to_string()));
    }

    let mut params = Vec::new();
    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            break;
        }
        if let Some(trailing) = rest.strip_prefix(':') {
            params.push(trailing.to_string());
            break;
        }
        if params.len() >= MAX_PARAMS {
            return Err(MessageParseError::TooManyParams);
        }
        let (tok, remainder) = split_first_token(rest);
        params.push(tok.to_string());
        rest = remainder;
    }

    let command = Command::new(cmd_tok, params)?;
    Ok(Message { prefix, command })
}

impl FromStr for Message {
    type Err = MessageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept a trailing CRLF/CR/LF for convenience; the codec normally
        // strips it before calling `parse_line` directly.
        parse_line(s.trim_end_matches(['\r', '\n']))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;

    #[test]
    fn parses_simple_command() {
        let msg = parse_line("NICK alice").unwrap();
        assert_eq!(msg.command, Command::Nick("alice".to_string()));
    }

    #[test]
    fn parses_prefix_and_trailing() {
        let msg = parse_line(":alice!alice@host PRIVMSG #test :hello there").unwrap();
        assert_eq!(msg.source_nick(), Some("alice"));
        assert_eq!(
            msg.command,
            Command::Privmsg("#test".to_string(), "hello there".to_string())
        );
    }

    #[test]
    fn rejects_empty_command() {
        assert_eq!(parse_line(""), Err(MessageParseError::EmptyCommand));
        assert_eq!(parse_line(":onlyprefix"), Err(MessageParseError::EmptyCommand));
    }

    #[test]
    fn rejects_oversize_line() {
        let long = "A".repeat(511);
        assert!(matches!(
            parse_line(&long),
            Err(MessageParseError::LineTooLong(_))
        ));
    }

    #[test]
    fn rejects_too_many_params() {
        let line = format!("MODE #c {}", "x ".repeat(16).trim());
        assert_eq!(parse_line(&line), Err(MessageParseError::TooManyParams));
    }

    #[test]
    fn trailing_without_colon_marker_is_absent() {
        let msg = parse_line("USER guest 0 * :Guest User").unwrap();
        assert_eq!(
            msg.command,
            Command::User {
                user: "guest".to_string(),
                mode: "0".to_string(),
                realname: "Guest User".to_string(),
            }
        );
    }
}
