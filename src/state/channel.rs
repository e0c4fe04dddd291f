//! Channel object: membership, modes, topic, bans (spec §3 "Channel", §4.E).

use crate::error::ChannelError;
use irc_proto::casemap::casefold;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemberFlags {
    pub operator: bool,
    pub voice: bool,
}

impl MemberFlags {
    pub fn prefix(&self) -> &'static str {
        if self.operator {
            "@"
        } else if self.voice {
            "+"
        } else {
            ""
        }
    }
}

#[derive(Debug, Clone)]
pub struct Topic {
    pub text: String,
    pub set_by: String,
    pub set_at: i64,
}

#[derive(Debug, Clone, Default)]
pub struct ChannelModes {
    pub invite_only: bool,
    pub moderated: bool,
    pub no_external_messages: bool,
    pub topic_protect: bool,
    pub key: Option<String>,
    pub limit: Option<u32>,
}

impl ChannelModes {
    /// Wire modestring for the simple (no-argument) flags, e.g. `"+int"`.
    pub fn simple_flags_string(&self) -> String {
        let mut s = String::from("+");
        if self.invite_only {
            s.push('i');
        }
        if self.moderated {
            s.push('m');
        }
        if self.no_external_messages {
            s.push('n');
        }
        if self.topic_protect {
            s.push('t');
        }
        s
    }
}

/// One channel, keyed canonically by its case-folded name (spec §3 "Channel").
pub struct Channel {
    pub name: String,
    pub created_at: i64,
    pub topic: Option<Topic>,
    pub modes: ChannelModes,
    /// Member UID → per-member flags. Covers local and remote members alike
    /// (every registered user, local or remote, has a UID).
    pub members: HashMap<String, MemberFlags>,
    pub bans: Vec<String>,
    pub invites: HashSet<String>,
}

impl Channel {
    pub fn new(name: String, created_at: i64) -> Self {
        Channel {
            name,
            created_at,
            topic: None,
            modes: ChannelModes::default(),
            members: HashMap::new(),
            bans: Vec::new(),
            invites: HashSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn member_flags(&self, uid: &str) -> Option<MemberFlags> {
        self.members.get(uid).copied()
    }

    pub fn is_banned(&self, nick: &str, user: &str, host: &str) -> bool {
        self.bans.iter().any(|mask| irc_proto::mask_match(mask, nick, user, host))
    }

    /// Preflight checks for joining, per spec §4.E. Does not mutate state;
    /// callers add the member on success.
    pub fn check_join(&self, nick: &str, user: &str, host: &str, key: Option<&str>) -> Result<(), ChannelError> {
        if let Some(expected) = &self.modes.key {
            if key != Some(expected.as_str()) {
                return Err(ChannelError::BadChannelKey);
            }
        }
        if self.modes.invite_only && !self.invites.contains(&casefold(nick)) {
            return Err(ChannelError::InviteOnlyChan);
        }
        if self.is_banned(nick, user, host) {
            return Err(ChannelError::BannedFromChan);
        }
        if let Some(limit) = self.modes.limit {
            if self.members.len() as u32 >= limit {
                return Err(ChannelError::ChannelIsFull);
            }
        }
        Ok(())
    }

    /// Add `uid` as a member. The first member of an empty channel is
    /// granted operator (spec §3 invariant (c)). `nick` clears any pending
    /// invite for this user — `invites` is keyed by case-folded nick, not
    /// UID, since INVITE is issued before the invitee has one.
    pub fn add_member(&mut self, uid: String, nick: &str) -> MemberFlags {
        let flags = MemberFlags {
            operator: self.members.is_empty(),
            voice: false,
        };
        self.members.insert(uid, flags);
        self.invites.remove(&casefold(nick));
        flags
    }

    pub fn remove_member(&mut self, uid: &str) -> Option<MemberFlags> {
        self.members.remove(uid)
    }

    pub fn can_speak(&self, uid: &str) -> Result<(), ChannelError> {
        let member = self.members.get(uid);
        if self.modes.no_external_messages && member.is_none() {
            return Err(ChannelError::CannotSendToChan);
        }
        if self.modes.moderated {
            match member {
                Some(flags) if flags.operator || flags.voice => {}
                _ => return Err(ChannelError::CannotSendToChan),
            }
        }
        Ok(())
    }

    pub fn require_operator(&self, uid: &str) -> Result<(), ChannelError> {
        match self.members.get(uid) {
            Some(flags) if flags.operator => Ok(()),
            Some(_) => Err(ChannelError::ChanOpPrivsNeeded),
            None => Err(ChannelError::NotOnChannel),
        }
    }

    pub fn require_member(&self, uid: &str) -> Result<(), ChannelError> {
        if self.members.contains_key(uid) {
            Ok(())
        } else {
            Err(ChannelError::NotOnChannel)
        }
    }

    pub fn set_topic(&mut self, text: String, set_by: String, set_at: i64) {
        self.topic = Some(Topic { text, set_by, set_at });
    }
}
