//! Message prefixes: `:<source>` introducing a client, server, or linking
//! identifier.

use std::fmt;

/// The source a message claims to be from.
///
/// On the client wire this is a nick (optionally `nick!user@host`) or a
/// server name. On the server-to-server wire it is a bare SID or UID, but
/// those are syntactically indistinguishable from a nick/server-name here —
/// the link layer resolves them against the network view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Prefix {
    /// `nick`, `nick!user`, or `nick!user@host`.
    Nickname(String, Option<String>, Option<String>),
    /// A bare server name, SID, or UID.
    Server(String),
}

impl Prefix {
    /// Parse the text following a leading `:` (colon already stripped).
    pub fn parse(raw: &str) -> Prefix {
        if let Some(bang) = raw.find('!') {
            let nick = raw[..bang].to_string();
            let rest = &raw[bang + 1..];
            if let Some(at) = rest.find('@') {
                Prefix::Nickname(
                    nick,
                    Some(rest[..at].to_string()),
                    Some(rest[at + 1..].to_string()),
                )
            } else {
                Prefix::Nickname(nick, Some(rest.to_string()), None)
            }
        } else if let Some(at) = raw.find('@') {
            Prefix::Nickname(raw[..at].to_string(), None, Some(raw[at + 1..].to_string()))
        } else if raw.contains('.') || raw.len() == 3 || raw.len() == 9 {
            // Server names contain a dot; SIDs and UIDs are fixed-length.
            Prefix::Server(raw.to_string())
        } else {
            Prefix::Nickname(raw.to_string(), None, None)
        }
    }

    /// The nickname, if this is a client prefix.
    pub fn nick(&self) -> Option<&str> {
        match self {
            Prefix::Nickname(n, ..) => Some(n),
            Prefix::Server(_) => None,
        }
    }

    /// The raw identifying token regardless of which kind of prefix this
    /// is — a nick for `Nickname`, a server name/SID/UID for `Server`.
    /// The link layer uses this to recover a UID carried bare on the wire,
    /// which parses indistinguishably from a nick or server name.
    pub fn source(&self) -> &str {
        match self {
            Prefix::Nickname(n, ..) => n,
            Prefix::Server(s) => s,
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::Nickname(nick, user, host) => {
                write!(f, "{nick}")?;
                if let Some(user) = user {
                    write!(f, "!{user}")?;
                }
                if let Some(host) = host {
                    write!(f, "@{host}")?;
                }
                Ok(())
            }
            Prefix::Server(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_hostmask() {
        let p = Prefix::parse("alice!alice@host.example.com");
        assert_eq!(
            p,
            Prefix::Nickname(
                "alice".into(),
                Some("alice".into()),
                Some("host.example.com".into())
            )
        );
        assert_eq!(p.to_string(), "alice!alice@host.example.com");
    }

    #[test]
    fn parses_server_name() {
        assert_eq!(Prefix::parse("irc.example.com").nick(), None);
    }

    #[test]
    fn parses_bare_uid() {
        // Fixed 9-char tokens without dots are treated as server-side ids.
        let p = Prefix::parse("001AAAAAA");
        assert!(matches!(p, Prefix::Server(_)));
    }
}
