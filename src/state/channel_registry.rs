//! Process-wide channel registry (spec §4.E, §4.G "AddOrMergeChannel").

use super::channel::{Channel, MemberFlags};
use dashmap::DashMap;
use irc_proto::casemap::casefold;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// How an inbound burst/SJOIN's timestamp compares to what's on record,
/// per the merge rules in spec §4.G.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Incoming TS was older: incoming modes/flags replace stored ones.
    IncomingWins,
    /// Stored TS was older: incoming members are merged as plain members.
    StoredWins,
    /// Equal TS: members and flags are unioned.
    Tied,
    /// No channel existed; one was created from the incoming data.
    Created,
}

#[derive(Default)]
pub struct ChannelRegistry {
    channels: DashMap<String, Arc<RwLock<Channel>>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Arc<RwLock<Channel>>> {
        self.channels.get(&casefold(name)).map(|e| e.value().clone())
    }

    /// Get the channel named `name`, creating it (with `created_at` as its
    /// TS) if it does not already exist.
    pub fn get_or_create(&self, name: &str, created_at: i64) -> Arc<RwLock<Channel>> {
        self.channels
            .entry(casefold(name))
            .or_insert_with(|| Arc::new(RwLock::new(Channel::new(name.to_string(), created_at))))
            .value()
            .clone()
    }

    /// Remove the channel if it has no members left (spec §3 invariant (a)).
    pub fn remove_if_empty(&self, name: &str) {
        let key = casefold(name);
        if let Some(entry) = self.channels.get(&key) {
            if !entry.value().read().is_empty() {
                return;
            }
        } else {
            return;
        }
        self.channels.remove_if(&key, |_, chan| chan.read().is_empty());
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.channels.iter().map(|e| e.value().read().name.clone()).collect()
    }

    /// Fold an inbound SJOIN/burst channel descriptor into the registry,
    /// applying the TS merge rules of spec §4.G.
    pub fn add_or_merge(
        &self,
        name: &str,
        ts: i64,
        modes: crate::state::channel::ChannelModes,
        members: HashMap<String, MemberFlags>,
    ) -> MergeOutcome {
        let key = casefold(name);
        if !self.channels.contains_key(&key) {
            let mut channel = Channel::new(name.to_string(), ts);
            channel.modes = modes;
            channel.members = members;
            self.channels.insert(key, Arc::new(RwLock::new(channel)));
            return MergeOutcome::Created;
        }

        let entry = self.channels.get(&key).expect("checked above").value().clone();
        let mut channel = entry.write();

        match ts.cmp(&channel.created_at) {
            std::cmp::Ordering::Less => {
                channel.created_at = ts;
                channel.modes = modes;
                // Existing local members survive but lose any flags the
                // incoming side didn't also grant them.
                let mut merged = members.clone();
                for uid in channel.members.keys() {
                    merged.entry(uid.clone()).or_insert(MemberFlags::default());
                }
                channel.members = merged;
                MergeOutcome::IncomingWins
            }
            std::cmp::Ordering::Greater => {
                for (uid, _) in members {
                    channel.members.entry(uid).or_insert(MemberFlags::default());
                }
                MergeOutcome::StoredWins
            }
            std::cmp::Ordering::Equal => {
                for (uid, flags) in members {
                    let entry = channel.members.entry(uid).or_default();
                    entry.operator |= flags.operator;
                    entry.voice |= flags.voice;
                }
                channel.modes.invite_only |= modes.invite_only;
                channel.modes.moderated |= modes.moderated;
                channel.modes.no_external_messages |= modes.no_external_messages;
                channel.modes.topic_protect |= modes.topic_protect;
                MergeOutcome::Tied
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::channel::ChannelModes;

    #[test]
    fn creates_channel_on_first_reference() {
        let registry = ChannelRegistry::new();
        let mut members = HashMap::new();
        members.insert("001AAAAAA".to_string(), MemberFlags { operator: true, voice: false });
        let outcome = registry.add_or_merge("#test", 1000, ChannelModes::default(), members);
        assert_eq!(outcome, MergeOutcome::Created);
        assert_eq!(registry.get("#test").unwrap().read().members.len(), 1);
    }

    #[test]
    fn older_incoming_ts_wins_and_replaces_modes() {
        let registry = ChannelRegistry::new();
        registry.get_or_create("#test", 2000);
        registry.get("#test").unwrap().write().modes.moderated = true;

        let mut incoming = HashMap::new();
        incoming.insert("002AAAAAA".to_string(), MemberFlags::default());
        let mut incoming_modes = ChannelModes::default();
        incoming_modes.invite_only = true;

        let outcome = registry.add_or_merge("#test", 1000, incoming_modes, incoming);
        assert_eq!(outcome, MergeOutcome::IncomingWins);
        let chan = registry.get("#test").unwrap();
        let chan = chan.read();
        assert!(chan.modes.invite_only);
        assert!(!chan.modes.moderated);
        assert_eq!(chan.created_at, 1000);
    }

    #[test]
    fn newer_incoming_ts_is_merged_as_plain_members() {
        let registry = ChannelRegistry::new();
        registry.get_or_create("#test", 1000);
        let mut incoming = HashMap::new();
        incoming.insert("002AAAAAA".to_string(), MemberFlags { operator: true, voice: true });
        let outcome = registry.add_or_merge("#test", 2000, ChannelModes::default(), incoming);
        assert_eq!(outcome, MergeOutcome::StoredWins);
        let chan = registry.get("#test").unwrap();
        let chan = chan.read();
        let flags = chan.members.get("002AAAAAA").unwrap();
        assert!(!flags.operator);
    }

    #[test]
    fn empty_channel_is_removed() {
        let registry = ChannelRegistry::new();
        let chan = registry.get_or_create("#test", 0);
        chan.write().add_member("001AAAAAA".to_string(), "alice");
        registry.remove_if_empty("#test");
        assert!(registry.get("#test").is_some());
        chan.write().remove_member("001AAAAAA");
        registry.remove_if_empty("#test");
        assert!(registry.get("#test").is_none());
    }
}
