//! Event routing between local command handlers and peer links (spec §4.J
//! "router") and application of inbound peer events to local state (spec
//! §4.K "remote-event applier").

use crate::state::{MemberFlags, RemoteUser, ServerCore};
use irc_proto::{Command, Message};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Broadcast a locally-originated event to every linked peer. Local events
/// have no originating link to exclude (spec §4.J: PART/QUIT/NICK/KICK/
/// INVITE/TOPIC/MODE/JOIN all broadcast to every peer).
pub fn propagate(core: &ServerCore, message: Message) {
    if core.links.is_empty() {
        return;
    }
    core.links.broadcast(message, None);
}

/// Apply one message received from a peer link to local state, then
/// re-broadcast it to every other peer (never back to the one it came
/// from) and redeliver to local clients where applicable.
pub fn apply_remote(core: &ServerCore, from_sid: &str, message: Message) {
    match &message.command {
        Command::Uid { nick, ts, modes, user, host, ip, uid, realname, .. } => {
            apply_uid(core, from_sid, nick, *ts, modes, user, host, ip, uid, realname);
            forward(core, from_sid, message);
        }
        Command::Sjoin { ts, channel, modes, members } => {
            apply_sjoin(core, channel, *ts, modes, members);
            forward(core, from_sid, message);
        }
        Command::Privmsg(target, text) => {
            deliver_targeted(core, &message.prefix, target, text, false);
            forward(core, from_sid, message);
        }
        Command::Notice(target, text) => {
            deliver_targeted(core, &message.prefix, target, text, true);
            forward(core, from_sid, message);
        }
        Command::Topic(channel, text) => {
            apply_topic(core, &message.prefix, channel, text.clone());
            forward(core, from_sid, message);
        }
        Command::Mode(target, args) => {
            apply_mode(core, target, args);
            forward(core, from_sid, message);
        }
        Command::Kick(channel, target, reason) => {
            apply_kick(core, &message.prefix, channel, target, reason.clone());
            forward(core, from_sid, message);
        }
        Command::Join(channels, _) => {
            apply_join(core, &message.prefix, channels);
            forward(core, from_sid, message);
        }
        Command::Part(channels, reason) => {
            apply_part(core, &message.prefix, channels, reason.clone());
            forward(core, from_sid, message);
        }
        Command::NickTs(new_nick, ts) => {
            apply_nick(core, &message.prefix, new_nick, *ts);
            forward(core, from_sid, message);
        }
        Command::Quit(reason) => {
            apply_quit(core, &message.prefix, reason.clone());
            forward(core, from_sid, message);
        }
        Command::Squit(server, _reason) => {
            apply_squit(core, server);
            forward(core, from_sid, message);
        }
        other => {
            debug!(command = %other.name(), peer = %from_sid, "unhandled peer event, ignoring (spec §7 network-consistency policy)");
        }
    }
}

fn forward(core: &ServerCore, from_sid: &str, message: Message) {
    core.links.broadcast(message, Some(from_sid));
}

#[allow(clippy::too_many_arguments)]
fn apply_uid(core: &ServerCore, from_sid: &str, nick: &str, ts: i64, modes: &str, user: &str, host: &str, ip: &str, uid: &str, realname: &str) {
    if let Some(existing_uid) = core.network.uid_for_nick(nick) {
        if existing_uid != uid {
            let existing_ts = core
                .network
                .local_session(&existing_uid)
                .map(|s| s.connected_at)
                .or_else(|| core.network.remote_user(&existing_uid).map(|u| u.introduced_at))
                .unwrap_or(0);

            use crate::state::CollisionOutcome;
            match core.network.resolve_collision(existing_ts, &existing_uid, ts, uid) {
                CollisionOutcome::NoCollision => {}
                CollisionOutcome::IncomingLoses => {
                    let guest = format!("{nick}_{}", &uid[3..]);
                    introduce_remote_guest(core, &guest, ts, modes, user, host, ip, uid, realname, from_sid);
                    announce_nick(core, uid, nick, &guest);
                    return;
                }
                CollisionOutcome::ExistingLoses => {
                    let guest = format!("{nick}_{}", &existing_uid[3..]);
                    if let Some(session) = core.network.local_session(&existing_uid) {
                        let old_nick = session.nick().unwrap_or_default();
                        if core.clients.rename(&old_nick, &guest, &session).is_ok() {
                            session.identity.write().nick = Some(guest.clone());
                            core.network.rename_user(&existing_uid, &old_nick, &guest);
                            announce_nick(core, &existing_uid, &old_nick, &guest);
                        }
                    } else {
                        core.network.rename_user(&existing_uid, nick, &guest);
                        announce_nick(core, &existing_uid, nick, &guest);
                    }
                }
            }
        }
    }

    core.network.introduce_remote(RemoteUser {
        uid: uid.to_string(),
        nick: nick.to_string(),
        username: user.to_string(),
        host: host.to_string(),
        ip: ip.to_string(),
        realname: realname.to_string(),
        modes: modes.to_string(),
        server_sid: from_sid.to_string(),
        introduced_at: ts,
    });
}

#[allow(clippy::too_many_arguments)]
fn introduce_remote_guest(core: &ServerCore, guest_nick: &str, ts: i64, modes: &str, user: &str, host: &str, ip: &str, uid: &str, realname: &str, from_sid: &str) {
    core.network.introduce_remote(RemoteUser {
        uid: uid.to_string(),
        nick: guest_nick.to_string(),
        username: user.to_string(),
        host: host.to_string(),
        ip: ip.to_string(),
        realname: realname.to_string(),
        modes: modes.to_string(),
        server_sid: from_sid.to_string(),
        introduced_at: ts,
    });
}

/// Announce a forced rename (nick collision resolution, spec §4.G/§8
/// scenario 7) to every local session sharing a channel with `uid`.
fn announce_nick(core: &ServerCore, uid: &str, old_nick: &str, new_nick: &str) {
    let prefix = format!("{old_nick}!*@*");
    let msg = Message::with_prefix(prefix, Command::Nick(new_nick.to_string()));
    notify_members_of(core, uid, msg);
}

fn notify_members_of(core: &ServerCore, uid: &str, message: Message) {
    for name in core.channels.names() {
        let Some(channel) = core.channels.get(&name) else { continue };
        let member_uids: Vec<String> = {
            let chan = channel.read();
            if !chan.members.contains_key(uid) {
                continue;
            }
            chan.members.keys().cloned().collect()
        };
        for member_uid in member_uids {
            if let Some(session) = core.network.local_session(&member_uid) {
                session.enqueue(message.clone());
            }
        }
    }
}

fn apply_sjoin(core: &ServerCore, channel: &str, ts: i64, modes: &[String], members: &[String]) {
    let mut modes_parsed = crate::state::ChannelModes::default();
    if let Some(flags) = modes.first() {
        for c in flags.chars() {
            match c {
                'i' => modes_parsed.invite_only = true,
                'm' => modes_parsed.moderated = true,
                'n' => modes_parsed.no_external_messages = true,
                't' => modes_parsed.topic_protect = true,
                _ => {}
            }
        }
    }

    let mut member_map: HashMap<String, MemberFlags> = HashMap::new();
    for token in members {
        let (flags, uid) = match token.strip_prefix('@') {
            Some(rest) => (MemberFlags { operator: true, voice: false }, rest),
            None => match token.strip_prefix('+') {
                Some(rest) => (MemberFlags { operator: false, voice: true }, rest),
                None => (MemberFlags::default(), token.as_str()),
            },
        };
        member_map.insert(uid.to_string(), flags);
    }

    core.channels.add_or_merge(channel, ts, modes_parsed, member_map);
}

fn deliver_targeted(core: &ServerCore, prefix: &Option<irc_proto::Prefix>, target: &str, text: &str, is_notice: bool) {
    let wrap = |t: String| if is_notice { Command::Notice(target.to_string(), t) } else { Command::Privmsg(target.to_string(), t) };
    let source = prefix.as_ref().map(|p| p.to_string()).unwrap_or_default();

    if target.starts_with('#') || target.starts_with('&') {
        let Some(channel) = core.channels.get(target) else { return };
        let member_uids: Vec<String> = channel.read().members.keys().cloned().collect();
        for uid in member_uids {
            if let Some(session) = core.network.local_session(&uid) {
                session.enqueue(Message::with_prefix(source.clone(), wrap(text.to_string())));
            }
        }
        return;
    }

    if let Some(session) = core.network.local_session(target) {
        session.enqueue(Message::with_prefix(source, wrap(text.to_string())));
    }
}

fn apply_topic(core: &ServerCore, prefix: &Option<irc_proto::Prefix>, channel_name: &str, text: Option<String>) {
    let Some(channel) = core.channels.get(channel_name) else { return };
    let Some(text) = text else { return };
    let setter_uid = prefix.as_ref().map(|p| p.source().to_string()).unwrap_or_default();
    let setter_nick = core.network.nick_of(&setter_uid).unwrap_or_else(|| setter_uid.clone());
    channel.write().set_topic(text.clone(), setter_nick.clone(), now());

    let member_uids: Vec<String> = channel.read().members.keys().cloned().collect();
    let announce = Message::with_prefix(format!("{setter_nick}!*@*"), Command::Topic(channel_name.to_string(), Some(text)));
    for uid in member_uids {
        if let Some(session) = core.network.local_session(&uid) {
            session.enqueue(announce.clone());
        }
    }
}

fn apply_mode(core: &ServerCore, target: &str, args: &[String]) {
    let Some(channel) = core.channels.get(target) else { return };
    let Some((modestring, rest)) = args.split_first() else { return };
    let changes = irc_proto::mode::parse_channel_mode_changes(modestring, rest);
    let mut applied = Vec::new();
    let mut chan = channel.write();
    for change in &changes {
        crate::handlers::apply_mode_change(core, &mut chan, change, &mut applied);
    }
}

fn apply_kick(core: &ServerCore, prefix: &Option<irc_proto::Prefix>, channel_name: &str, target_nick: &str, reason: Option<String>) {
    let Some(channel) = core.channels.get(channel_name) else { return };
    let Some(target_uid) = core.network.uid_for_nick(target_nick) else { return };
    let kicker_uid = prefix.as_ref().map(|p| p.source().to_string()).unwrap_or_default();
    let kicker_nick = core.network.nick_of(&kicker_uid).unwrap_or_else(|| kicker_uid.clone());

    let member_uids: Vec<String> = channel.read().members.keys().cloned().collect();
    channel.write().remove_member(&target_uid);
    core.channels.remove_if_empty(channel_name);

    let announce = Message::with_prefix(
        format!("{kicker_nick}!*@*"),
        Command::Kick(channel_name.to_string(), target_nick.to_string(), reason),
    );
    for uid in member_uids {
        if let Some(session) = core.network.local_session(&uid) {
            session.enqueue(announce.clone());
        }
    }
}

fn apply_join(core: &ServerCore, prefix: &Option<irc_proto::Prefix>, channels: &[String]) {
    let Some(uid) = prefix.as_ref().map(|p| p.source().to_string()) else { return };
    let nick = core.network.nick_of(&uid).unwrap_or_else(|| uid.clone());
    for name in channels {
        let channel = core.channels.get_or_create(name, now());
        let member_uids_before: Vec<String> = channel.read().members.keys().cloned().collect();
        channel.write().add_member(uid.clone(), &nick);
        let announce = Message::with_prefix(format!("{nick}!*@*"), Command::Join(vec![name.clone()], vec![]));
        for member_uid in member_uids_before {
            if let Some(session) = core.network.local_session(&member_uid) {
                session.enqueue(announce.clone());
            }
        }
    }
}

fn apply_part(core: &ServerCore, prefix: &Option<irc_proto::Prefix>, channels: &[String], reason: Option<String>) {
    let Some(uid) = prefix.as_ref().map(|p| p.source().to_string()) else { return };
    let nick = core.network.nick_of(&uid).unwrap_or_else(|| uid.clone());
    for name in channels {
        let Some(channel) = core.channels.get(name) else { continue };
        let member_uids: Vec<String> = channel.read().members.keys().cloned().collect();
        channel.write().remove_member(&uid);
        core.channels.remove_if_empty(name);
        let announce = Message::with_prefix(format!("{nick}!*@*"), Command::Part(vec![name.clone()], reason.clone()));
        for member_uid in member_uids {
            if let Some(session) = core.network.local_session(&member_uid) {
                session.enqueue(announce.clone());
            }
        }
    }
}

fn apply_nick(core: &ServerCore, prefix: &Option<irc_proto::Prefix>, new_nick: &str, ts: i64) {
    let Some(uid) = prefix.as_ref().map(|p| p.source().to_string()) else { return };
    let old_nick = core.network.nick_of(&uid).unwrap_or_default();
    core.network.rename_user(&uid, &old_nick, new_nick);
    announce_nick(core, &uid, &old_nick, new_nick);
    let _ = ts;
}

fn apply_quit(core: &ServerCore, prefix: &Option<irc_proto::Prefix>, reason: Option<String>) {
    let Some(uid) = prefix.as_ref().map(|p| p.source().to_string()) else { return };
    let nick = core.network.nick_of(&uid).unwrap_or_else(|| uid.clone());
    let announce = Message::with_prefix(format!("{nick}!*@*"), Command::Quit(reason));

    for name in core.channels.names() {
        let Some(channel) = core.channels.get(&name) else { continue };
        let member_uids: Vec<String> = {
            let chan = channel.read();
            if !chan.members.contains_key(&uid) {
                continue;
            }
            chan.members.keys().cloned().collect()
        };
        channel.write().remove_member(&uid);
        core.channels.remove_if_empty(&name);
        for member_uid in member_uids {
            if member_uid == uid {
                continue;
            }
            if let Some(session) = core.network.local_session(&member_uid) {
                session.enqueue(announce.clone());
            }
        }
    }
    core.network.remove_user(&uid);
}

/// Server link lost: cascade-remove every user it introduced and fire
/// synthetic QUITs to local sessions that shared a channel with them (spec
/// §4.G `RemoveServer`, §8 scenario 8 "netsplit and rejoin").
pub fn apply_squit(core: &ServerCore, sid: &str) {
    let orphaned = core.network.remove_server(sid);
    if orphaned.is_empty() {
        warn!(sid = %sid, "SQUIT for server with no tracked users");
    }
    for (uid, nick) in orphaned {
        let quit = Message::with_prefix(format!("{nick}!*@*"), Command::Quit(Some("*.net *.split".to_string())));
        notify_members_and_remove(core, &uid, quit);
    }
}

fn notify_members_and_remove(core: &ServerCore, uid: &str, message: Message) {
    for name in core.channels.names() {
        let Some(channel) = core.channels.get(&name) else { continue };
        let member_uids: Vec<String> = {
            let chan = channel.read();
            if !chan.members.contains_key(uid) {
                continue;
            }
            chan.members.keys().cloned().collect()
        };
        channel.write().remove_member(uid);
        core.channels.remove_if_empty(&name);
        for member_uid in member_uids {
            if member_uid == uid {
                continue;
            }
            if let Some(session) = core.network.local_session(&member_uid) {
                session.enqueue(message.clone());
            }
        }
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
