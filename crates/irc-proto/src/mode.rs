//! Mode vocabulary and the `MODE` argument-zipping parser (spec §4.E, §6
//! "Mode letters").

use std::fmt;

/// Whether a mode letter is being set (`+`) or cleared (`-`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeSign {
    /// `+`
    Plus,
    /// `-`
    Minus,
}

impl fmt::Display for ModeSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModeSign::Plus => "+",
            ModeSign::Minus => "-",
        })
    }
}

/// User modes (spec §6 "User"). `i` invisible, `o` operator, `w` wallops,
/// `a` away (set implicitly by AWAY, not directly settable via MODE).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum UserMode {
    /// `i`
    Invisible,
    /// `o`
    Operator,
    /// `w`
    Wallops,
    /// `a`
    Away,
    /// Any other letter, preserved for forwarding.
    Unknown(char),
}

impl UserMode {
    /// The wire letter for this mode.
    pub fn letter(&self) -> char {
        match self {
            UserMode::Invisible => 'i',
            UserMode::Operator => 'o',
            UserMode::Wallops => 'w',
            UserMode::Away => 'a',
            UserMode::Unknown(c) => *c,
        }
    }

    /// Parse a single letter into its typed representation.
    pub fn from_char(c: char) -> UserMode {
        match c {
            'i' => UserMode::Invisible,
            'o' => UserMode::Operator,
            'w' => UserMode::Wallops,
            'a' => UserMode::Away,
            other => UserMode::Unknown(other),
        }
    }
}

/// One applied channel mode change, already zipped with its argument if the
/// letter takes one (spec §4.E "Mode vocabulary").
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelModeChange {
    /// `i`
    InviteOnly(ModeSign),
    /// `m`
    Moderated(ModeSign),
    /// `n`
    NoExternalMessages(ModeSign),
    /// `t`
    TopicProtect(ModeSign),
    /// `k <key>` (arg required on set, ignored on unset)
    Key(ModeSign, Option<String>),
    /// `l <n>` (arg required on set, absent on unset)
    Limit(ModeSign, Option<u32>),
    /// `o <nick>`
    Operator(ModeSign, String),
    /// `v <nick>`
    Voice(ModeSign, String),
    /// `b <mask>`
    Ban(ModeSign, String),
    /// Any other letter, with its argument if one was supplied.
    Unknown(ModeSign, char, Option<String>),
}

impl ChannelModeChange {
    /// Whether this letter consumes a positional argument for this sign.
    fn letter_takes_arg(letter: char, sign: ModeSign) -> bool {
        matches!(
            (letter, sign),
            ('k', ModeSign::Plus)
                | ('l', ModeSign::Plus)
                | ('o', _)
                | ('v', _)
                | ('b', _)
        )
    }
}

/// Parse a `MODE` wire payload: the leading `+`/`-` token string followed by
/// any positional arguments, e.g. `+ov` `["alice", "bob"]` or `+k` `["sw0rd"]`.
///
/// Unconsumed trailing arguments are ignored; a mode letter that should take
/// an argument but has none left yields `None` in its slot (the caller
/// decides whether that is an error, e.g. a bare `+b` queries the ban list).
pub fn parse_channel_mode_changes(modestring: &str, args: &[String]) -> Vec<ChannelModeChange> {
    let mut out = Vec::new();
    let mut sign = ModeSign::Plus;
    let mut arg_iter = args.iter();

    for c in modestring.chars() {
        match c {
            '+' => sign = ModeSign::Plus,
            '-' => sign = ModeSign::Minus,
            'i' => out.push(ChannelModeChange::InviteOnly(sign)),
            'm' => out.push(ChannelModeChange::Moderated(sign)),
            'n' => out.push(ChannelModeChange::NoExternalMessages(sign)),
            't' => out.push(ChannelModeChange::TopicProtect(sign)),
            'k' => {
                let needs = ChannelModeChange::letter_takes_arg('k', sign);
                let arg = if needs { arg_iter.next().cloned() } else { None };
                out.push(ChannelModeChange::Key(sign, arg));
            }
            'l' => {
                let needs = ChannelModeChange::letter_takes_arg('l', sign);
                let arg = if needs {
                    arg_iter.next().and_then(|a| a.parse::<u32>().ok())
                } else {
                    None
                };
                out.push(ChannelModeChange::Limit(sign, arg));
            }
            'o' => {
                if let Some(nick) = arg_iter.next() {
                    out.push(ChannelModeChange::Operator(sign, nick.clone()));
                }
            }
            'v' => {
                if let Some(nick) = arg_iter.next() {
                    out.push(ChannelModeChange::Voice(sign, nick.clone()));
                }
            }
            'b' => {
                let arg = arg_iter.next().cloned();
                out.push(ChannelModeChange::Ban(sign, arg.unwrap_or_default()));
            }
            other => {
                let needs = ChannelModeChange::letter_takes_arg(other, sign);
                let arg = if needs { arg_iter.next().cloned() } else { None };
                out.push(ChannelModeChange::Unknown(sign, other, arg));
            }
        }
    }
    out
}

/// A simple toggleable channel flag, independent of list/param modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelMode {
    /// `i`
    InviteOnly,
    /// `m`
    Moderated,
    /// `n`
    NoExternalMessages,
    /// `t`
    TopicProtect,
}

impl ChannelMode {
    /// The wire letter for this mode.
    pub fn letter(&self) -> char {
        match self {
            ChannelMode::InviteOnly => 'i',
            ChannelMode::Moderated => 'm',
            ChannelMode::NoExternalMessages => 'n',
            ChannelMode::TopicProtect => 't',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zips_operator_and_voice_with_args() {
        let args = vec!["alice".to_string(), "bob".to_string()];
        let changes = parse_channel_mode_changes("+ov", &args);
        assert_eq!(
            changes,
            vec![
                ChannelModeChange::Operator(ModeSign::Plus, "alice".to_string()),
                ChannelModeChange::Voice(ModeSign::Plus, "bob".to_string()),
            ]
        );
    }

    #[test]
    fn plus_minus_toggle_across_letters() {
        let changes = parse_channel_mode_changes("+i-m+t", &[]);
        assert_eq!(
            changes,
            vec![
                ChannelModeChange::InviteOnly(ModeSign::Plus),
                ChannelModeChange::Moderated(ModeSign::Minus),
                ChannelModeChange::TopicProtect(ModeSign::Plus),
            ]
        );
    }

    #[test]
    fn unset_limit_takes_no_argument() {
        let changes = parse_channel_mode_changes("-l", &[]);
        assert_eq!(changes, vec![ChannelModeChange::Limit(ModeSign::Minus, None)]);
    }

    #[test]
    fn set_key_requires_argument() {
        let changes = parse_channel_mode_changes("+k", &["secret".to_string()]);
        assert_eq!(
            changes,
            vec![ChannelModeChange::Key(ModeSign::Plus, Some("secret".to_string()))]
        );
    }
}
