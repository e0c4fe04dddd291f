//! Burst generation: serialize local state for a newly linked peer (spec §4.I).

use crate::state::ServerCore;
use irc_proto::{Command, Message};

/// Build the full burst: one `UID` per local user, one `SJOIN` per non-empty
/// channel (with a `TOPIC` if set), terminated by the end-of-burst marker
/// (a `PING` carrying the local SID, per spec §4.H/§4.I).
pub fn generate(core: &ServerCore) -> Vec<Message> {
    let mut out = Vec::new();
    let local_sid = core.network.local_sid.clone();

    for uid in core.network.local_uids_snapshot() {
        let Some(session) = core.network.local_session(&uid) else { continue };
        if !session.is_registered() {
            continue;
        }
        let identity = session.identity.read();
        out.push(Message::with_prefix(
            local_sid.clone(),
            Command::Uid {
                nick: identity.nick.clone().unwrap_or_default(),
                hop: 1,
                ts: session.connected_at,
                modes: user_mode_string(&identity),
                user: identity.username.clone().unwrap_or_default(),
                host: session.host.clone(),
                ip: session.remote_addr.ip().to_string(),
                uid: uid.clone(),
                realname: identity.realname.clone().unwrap_or_default(),
            },
        ));
    }

    for name in core.channels.names() {
        let Some(channel) = core.channels.get(&name) else { continue };
        let channel = channel.read();
        if channel.is_empty() {
            continue;
        }
        let members = channel
            .members
            .iter()
            .map(|(uid, flags)| format!("{}{}", flags.prefix(), uid))
            .collect();
        out.push(Message::with_prefix(
            local_sid.clone(),
            Command::Sjoin {
                ts: channel.created_at,
                channel: channel.name.clone(),
                modes: vec![channel.modes.simple_flags_string()],
                members,
            },
        ));
        if let Some(topic) = &channel.topic {
            out.push(Message::with_prefix(
                local_sid.clone(),
                Command::Topic(channel.name.clone(), Some(topic.text.clone())),
            ));
        }
    }

    out.push(Message::new(Command::Ping(local_sid)));
    out
}

fn user_mode_string(identity: &crate::state::Identity) -> String {
    let mut s = String::from("+");
    if identity.invisible {
        s.push('i');
    }
    if identity.operator {
        s.push('o');
    }
    if identity.wallops {
        s.push('w');
    }
    if identity.away.is_some() {
        s.push('a');
    }
    s
}
