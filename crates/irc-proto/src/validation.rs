//! Identifier grammars: nicknames, channel names, server/user IDs, and
//! hostmask glob matching. See spec §4.B.

use crate::error::ValidationError;
use std::fmt;

const NICK_MAX_LEN: usize = 16;
const NICK_SPECIAL: &[char] = &['[', ']', '\\', '`', '_', '^', '{', '|', '}', '-'];

/// Validate a nickname against the grammar: first char a letter or one of
/// `[]\`_^{|}-`; subsequent chars additionally digits; length 1..16.
pub fn validate_nick(nick: &str) -> Result<(), ValidationError> {
    if nick.is_empty() || nick.len() > NICK_MAX_LEN {
        return Err(ValidationError::InvalidNick(nick.to_string()));
    }
    let mut chars = nick.chars();
    let first = chars.next().expect("non-empty checked above");
    if !(first.is_ascii_alphabetic() || NICK_SPECIAL.contains(&first)) {
        return Err(ValidationError::InvalidNick(nick.to_string()));
    }
    for c in chars {
        if !(c.is_ascii_alphanumeric() || NICK_SPECIAL.contains(&c)) {
            return Err(ValidationError::InvalidNick(nick.to_string()));
        }
    }
    Ok(())
}

/// Validate a channel name: begins with `#` or `&`; length 2..50; no space,
/// comma, NUL, CR, or LF.
pub fn validate_channel(name: &str) -> Result<(), ValidationError> {
    if name.len() < 2 || name.len() > 50 {
        return Err(ValidationError::InvalidChannel(name.to_string()));
    }
    if !(name.starts_with('#') || name.starts_with('&')) {
        return Err(ValidationError::InvalidChannel(name.to_string()));
    }
    if name
        .bytes()
        .any(|b| matches!(b, b' ' | b',' | 0 | b'\r' | b'\n'))
    {
        return Err(ValidationError::InvalidChannel(name.to_string()));
    }
    Ok(())
}

/// A validated, immutable server identifier: 3 chars, first a digit,
/// remaining two uppercase alphanumerics.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sid(String);

impl Sid {
    /// Validate and wrap a raw string as a [`Sid`].
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let bytes = raw.as_bytes();
        if bytes.len() != 3 {
            return Err(ValidationError::InvalidSid(raw.to_string()));
        }
        if !bytes[0].is_ascii_digit() {
            return Err(ValidationError::InvalidSid(raw.to_string()));
        }
        if !bytes[1..]
            .iter()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        {
            return Err(ValidationError::InvalidSid(raw.to_string()));
        }
        Ok(Sid(raw.to_string()))
    }

    /// Borrow the underlying 3-character string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated, immutable user identifier: `<SID><6 base-36 digits>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uid(String);

impl Uid {
    /// Validate and wrap a raw string as a [`Uid`].
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if raw.len() != 9 {
            return Err(ValidationError::InvalidUid(raw.to_string()));
        }
        Sid::parse(&raw[0..3]).map_err(|_| ValidationError::InvalidUid(raw.to_string()))?;
        if !raw[3..9]
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        {
            return Err(ValidationError::InvalidUid(raw.to_string()));
        }
        Ok(Uid(raw.to_string()))
    }

    /// The owning server's SID, taken from the first 3 characters.
    pub fn sid(&self) -> Sid {
        Sid::parse(&self.0[0..3]).expect("validated at construction")
    }

    /// Borrow the underlying 9-character string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Glob-style match: `*` = zero-or-more, `?` = exactly-one. Matching is
/// byte-wise and case-sensitive (callers case-fold the nick component
/// themselves via [`crate::casemap`]).
pub fn glob_match(pattern: &str, text: &str) -> bool {
    glob_match_bytes(pattern.as_bytes(), text.as_bytes())
}

fn glob_match_bytes(pattern: &[u8], text: &[u8]) -> bool {
    // Classic backtracking glob matcher: track the most recent `*` and the
    // text position it could consume through, and retry there on mismatch.
    let (mut pi, mut ti) = (0usize, 0usize);
    let (mut star_p, mut star_t): (Option<usize>, usize) = (None, 0);

    while ti < text.len() {
        if pi < pattern.len() && (pattern[pi] == b'?' || pattern[pi] == text[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < pattern.len() && pattern[pi] == b'*' {
            star_p = Some(pi);
            star_t = ti;
            pi += 1;
        } else if let Some(sp) = star_p {
            pi = sp + 1;
            star_t += 1;
            ti = star_t;
        } else {
            return false;
        }
    }
    while pi < pattern.len() && pattern[pi] == b'*' {
        pi += 1;
    }
    pi == pattern.len()
}

/// Match a `nick!user@host` mask against its three components.
pub fn mask_match(mask: &str, nick: &str, user: &str, host: &str) -> bool {
    let Some((nick_pat, rest)) = mask.split_once('!') else {
        return glob_match(mask, nick);
    };
    let Some((user_pat, host_pat)) = rest.split_once('@') else {
        return glob_match(mask, nick);
    };
    glob_match(nick_pat, nick) && glob_match(user_pat, user) && glob_match(host_pat, host)
}
