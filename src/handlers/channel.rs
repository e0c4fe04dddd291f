//! JOIN/PART/TOPIC/MODE/KICK/INVITE/NAMES/LIST (spec §4.E, §4.F).

use super::Context;
use crate::error::{ChannelError, HandlerError, HandlerResult};
use crate::state::{Channel, ServerCore, Session};
use irc_proto::mode::parse_channel_mode_changes;
use irc_proto::{validation, ChannelModeChange, Command, Message, ModeSign, Response};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Deliver `msg` to every local member of `channel` except `exclude_uid`.
pub(crate) fn broadcast_to_channel(core: &ServerCore, channel: &Arc<RwLock<Channel>>, msg: Message, exclude_uid: Option<&str>) {
    let members: Vec<String> = channel.read().members.keys().cloned().collect();
    for uid in members {
        if Some(uid.as_str()) == exclude_uid {
            continue;
        }
        if let Some(session) = core.network.local_session(&uid) {
            session.enqueue(msg.clone());
        }
    }
}

/// Deliver `msg` once to every distinct local session that shares any
/// channel with `session` (used for NICK/QUIT, which touch many channels
/// at once but must not double-deliver to a user in two shared channels).
pub(crate) fn notify_shared_channel_members(core: &ServerCore, session: &Session, msg: Message) {
    let my_uid = session.uid();
    let mut seen = HashSet::new();
    for channel_name in session.joined_channels() {
        let Some(channel) = core.channels.get(&channel_name) else { continue };
        for uid in channel.read().members.keys().cloned().collect::<Vec<_>>() {
            if Some(uid.as_str()) == my_uid.as_deref() || !seen.insert(uid.clone()) {
                continue;
            }
            if let Some(target) = core.network.local_session(&uid) {
                target.enqueue(msg.clone());
            }
        }
    }
}

pub fn handle_join(ctx: &Context<'_>, channels: Vec<String>, keys: Vec<String>) -> HandlerResult {
    let uid = ctx.session.uid().ok_or(HandlerError::NotRegistered)?;
    let nick = ctx.display_nick();
    let username = ctx.session.username().unwrap_or_default();
    let host = ctx.session.host.clone();

    for (i, name) in channels.iter().enumerate() {
        if validation::validate_channel(name).is_err() {
            ctx.send_channel_error(&ChannelError::NoSuchChannel, name);
            continue;
        }
        let key = keys.get(i).map(|s| s.as_str());
        let channel = ctx.core.channels.get_or_create(name, now());

        {
            let guard = channel.read();
            if let Err(e) = guard.check_join(&nick, &username, &host, key) {
                drop(guard);
                ctx.send_channel_error(&e, name);
                continue;
            }
        }

        channel.write().add_member(uid.clone(), &nick);
        ctx.session.channels.write().insert(name.clone());

        let join_msg = Message::with_prefix(ctx.session.hostmask(), Command::Join(vec![name.clone()], vec![]));
        broadcast_to_channel(ctx.core, &channel, join_msg, None);
        crate::sync::router::propagate(ctx.core, Message::with_prefix(uid.clone(), Command::Join(vec![name.clone()], vec![])));

        send_topic(ctx, &channel, name);
        send_names(ctx, &channel, name);
    }
    Ok(())
}

fn send_topic(ctx: &Context<'_>, channel: &Arc<RwLock<Channel>>, name: &str) {
    let topic = channel.read().topic.clone();
    match topic {
        Some(t) => ctx.reply(Response::RPL_TOPIC, vec![ctx.display_nick(), name.to_string(), t.text]),
        None => ctx.reply(Response::RPL_NOTOPIC, vec![ctx.display_nick(), name.to_string(), "No topic is set".to_string()]),
    }
}

fn send_names(ctx: &Context<'_>, channel: &Arc<RwLock<Channel>>, name: &str) {
    let names: Vec<String> = {
        let guard = channel.read();
        guard
            .members
            .iter()
            .map(|(uid, flags)| {
                let nick = ctx.core.network.nick_of(uid).unwrap_or_else(|| uid.clone());
                format!("{}{}", flags.prefix(), nick)
            })
            .collect()
    };
    ctx.reply(Response::RPL_NAMREPLY, vec![ctx.display_nick(), "=".to_string(), name.to_string(), names.join(" ")]);
    ctx.reply(Response::RPL_ENDOFNAMES, vec![ctx.display_nick(), name.to_string(), "End of NAMES list".to_string()]);
}

pub fn handle_names(ctx: &Context<'_>, channels: Vec<String>) -> HandlerResult {
    let names = if channels.is_empty() { ctx.core.channels.names() } else { channels };
    for name in names {
        if let Some(channel) = ctx.core.channels.get(&name) {
            send_names(ctx, &channel, &name);
        }
    }
    Ok(())
}

pub fn handle_part(ctx: &Context<'_>, channels: Vec<String>, reason: Option<String>) -> HandlerResult {
    let uid = ctx.session.uid().ok_or(HandlerError::NotRegistered)?;
    for name in channels {
        let Some(channel) = ctx.core.channels.get(&name) else {
            ctx.send_channel_error(&ChannelError::NoSuchChannel, &name);
            continue;
        };
        if channel.read().member_flags(&uid).is_none() {
            ctx.send_channel_error(&ChannelError::NotOnChannel, &name);
            continue;
        }

        let part_msg = Message::with_prefix(ctx.session.hostmask(), Command::Part(vec![name.clone()], reason.clone()));
        broadcast_to_channel(ctx.core, &channel, part_msg, None);
        crate::sync::router::propagate(ctx.core, Message::with_prefix(uid.clone(), Command::Part(vec![name.clone()], reason.clone())));

        channel.write().remove_member(&uid);
        ctx.session.channels.write().remove(&name);
        ctx.core.channels.remove_if_empty(&name);
    }
    Ok(())
}

pub fn handle_topic(ctx: &Context<'_>, name: String, text: Option<String>) -> HandlerResult {
    let uid = ctx.session.uid().ok_or(HandlerError::NotRegistered)?;
    let Some(channel) = ctx.core.channels.get(&name) else {
        ctx.send_channel_error(&ChannelError::NoSuchChannel, &name);
        return Ok(());
    };

    let Some(text) = text else {
        send_topic(ctx, &channel, &name);
        return Ok(());
    };

    {
        let guard = channel.read();
        if let Err(e) = guard.require_member(&uid) {
            drop(guard);
            ctx.send_channel_error(&e, &name);
            return Ok(());
        }
        if guard.modes.topic_protect {
            if let Err(e) = guard.require_operator(&uid) {
                drop(guard);
                ctx.send_channel_error(&e, &name);
                return Ok(());
            }
        }
    }

    channel.write().set_topic(text.clone(), ctx.display_nick(), now());
    let msg = Message::with_prefix(ctx.session.hostmask(), Command::Topic(name.clone(), Some(text.clone())));
    broadcast_to_channel(ctx.core, &channel, msg, None);
    crate::sync::router::propagate(ctx.core, Message::with_prefix(uid, Command::Topic(name, Some(text))));
    Ok(())
}

pub fn handle_invite(ctx: &Context<'_>, nick: String, channel_name: String) -> HandlerResult {
    let uid = ctx.session.uid().ok_or(HandlerError::NotRegistered)?;
    let Some(target_session) = ctx.core.clients.get(&nick) else {
        return Err(HandlerError::NoSuchNick(nick));
    };
    if let Some(channel) = ctx.core.channels.get(&channel_name) {
        if let Err(e) = channel.read().require_member(&uid) {
            ctx.send_channel_error(&e, &channel_name);
            return Ok(());
        }
        channel.write().invites.insert(irc_proto::casemap::casefold(&nick));
    } else {
        ctx.core.channels.get_or_create(&channel_name, now()).write().invites.insert(irc_proto::casemap::casefold(&nick));
    }

    let invite_msg = Message::with_prefix(ctx.session.hostmask(), Command::Invite(nick.clone(), channel_name.clone()));
    target_session.enqueue(invite_msg);
    crate::sync::router::propagate(ctx.core, Message::with_prefix(uid, Command::Invite(nick.clone(), channel_name.clone())));
    ctx.reply(Response::RPL_INVITING, vec![ctx.display_nick(), channel_name, nick]);
    Ok(())
}

pub fn handle_kick(ctx: &Context<'_>, channel_name: String, target_nick: String, reason: Option<String>) -> HandlerResult {
    let uid = ctx.session.uid().ok_or(HandlerError::NotRegistered)?;
    let Some(channel) = ctx.core.channels.get(&channel_name) else {
        ctx.send_channel_error(&ChannelError::NoSuchChannel, &channel_name);
        return Ok(());
    };
    let Some(target_uid) = ctx.core.network.uid_for_nick(&target_nick) else {
        return Err(HandlerError::NoSuchNick(target_nick));
    };

    {
        let guard = channel.read();
        if let Err(e) = guard.require_operator(&uid) {
            drop(guard);
            ctx.send_channel_error(&e, &channel_name);
            return Ok(());
        }
        if guard.member_flags(&target_uid).is_none() {
            drop(guard);
            ctx.send_channel_error(&ChannelError::UserNotInChannel(target_nick), &channel_name);
            return Ok(());
        }
    }

    let kick_msg = Message::with_prefix(
        ctx.session.hostmask(),
        Command::Kick(channel_name.clone(), target_nick.clone(), reason.clone()),
    );
    broadcast_to_channel(ctx.core, &channel, kick_msg, None);
    crate::sync::router::propagate(ctx.core, Message::with_prefix(uid, Command::Kick(channel_name.clone(), target_nick.clone(), reason)));

    channel.write().remove_member(&target_uid);
    if let Some(target_session) = ctx.core.network.local_session(&target_uid) {
        target_session.channels.write().remove(&channel_name);
    }
    ctx.core.channels.remove_if_empty(&channel_name);
    Ok(())
}

pub fn handle_mode(ctx: &Context<'_>, target: String, args: Vec<String>) -> HandlerResult {
    if !target.starts_with('#') && !target.starts_with('&') {
        // User-mode MODE queries/changes are out of scope beyond the basic
        // flags already surfaced via RPL_MYINFO; nothing to apply here.
        return Ok(());
    }

    let uid = ctx.session.uid().ok_or(HandlerError::NotRegistered)?;
    let Some(channel) = ctx.core.channels.get(&target) else {
        ctx.send_channel_error(&ChannelError::NoSuchChannel, &target);
        return Ok(());
    };

    if args.is_empty() {
        let modestring = channel.read().modes.simple_flags_string();
        ctx.reply(Response::RPL_CHANNELMODEIS, vec![ctx.display_nick(), target, modestring]);
        return Ok(());
    }

    {
        let guard = channel.read();
        if let Err(e) = guard.require_operator(&uid) {
            drop(guard);
            ctx.send_channel_error(&e, &target);
            return Ok(());
        }
    }

    let Some((modestring, rest)) = args.split_first() else {
        return Err(HandlerError::NeedMoreParams("MODE".to_string()));
    };
    let changes = parse_channel_mode_changes(modestring, rest);

    let mut applied = Vec::new();
    {
        let mut chan = channel.write();
        for change in &changes {
            apply_mode_change(ctx.core, &mut chan, change, &mut applied);
        }
    }

    if applied.is_empty() {
        return Ok(());
    }
    let mode_msg = Message::with_prefix(ctx.session.hostmask(), Command::Mode(target.clone(), applied.clone()));
    broadcast_to_channel(ctx.core, &channel, mode_msg, None);
    crate::sync::router::propagate(ctx.core, Message::with_prefix(uid, Command::Mode(target, applied)));
    Ok(())
}

pub(crate) fn apply_mode_change(core: &ServerCore, chan: &mut Channel, change: &ChannelModeChange, applied: &mut Vec<String>) {
    match change {
        ChannelModeChange::InviteOnly(sign) => {
            chan.modes.invite_only = *sign == ModeSign::Plus;
            applied.push(format!("{sign}i"));
        }
        ChannelModeChange::Moderated(sign) => {
            chan.modes.moderated = *sign == ModeSign::Plus;
            applied.push(format!("{sign}m"));
        }
        ChannelModeChange::NoExternalMessages(sign) => {
            chan.modes.no_external_messages = *sign == ModeSign::Plus;
            applied.push(format!("{sign}n"));
        }
        ChannelModeChange::TopicProtect(sign) => {
            chan.modes.topic_protect = *sign == ModeSign::Plus;
            applied.push(format!("{sign}t"));
        }
        ChannelModeChange::Key(sign, value) => {
            if *sign == ModeSign::Plus {
                let Some(value) = value else { return };
                chan.modes.key = Some(value.clone());
                applied.push(format!("{sign}k {value}"));
            } else {
                chan.modes.key = None;
                applied.push(format!("{sign}k"));
            }
        }
        ChannelModeChange::Limit(sign, value) => {
            if *sign == ModeSign::Plus {
                let Some(value) = value else { return };
                chan.modes.limit = Some(*value);
                applied.push(format!("{sign}l {value}"));
            } else {
                chan.modes.limit = None;
                applied.push(format!("{sign}l"));
            }
        }
        ChannelModeChange::Operator(sign, nick) => {
            if let Some(uid) = core.network.uid_for_nick(nick) {
                if let Some(flags) = chan.members.get_mut(&uid) {
                    flags.operator = *sign == ModeSign::Plus;
                    applied.push(format!("{sign}o {nick}"));
                }
            }
        }
        ChannelModeChange::Voice(sign, nick) => {
            if let Some(uid) = core.network.uid_for_nick(nick) {
                if let Some(flags) = chan.members.get_mut(&uid) {
                    flags.voice = *sign == ModeSign::Plus;
                    applied.push(format!("{sign}v {nick}"));
                }
            }
        }
        ChannelModeChange::Ban(sign, mask) => {
            if *sign == ModeSign::Plus {
                if !chan.bans.contains(mask) {
                    chan.bans.push(mask.clone());
                }
            } else {
                chan.bans.retain(|b| b != mask);
            }
            applied.push(format!("{sign}b {mask}"));
        }
        ChannelModeChange::Unknown(..) => {}
    }
}

pub fn handle_list(ctx: &Context<'_>, channels: Vec<String>) -> HandlerResult {
    let names = if channels.is_empty() { ctx.core.channels.names() } else { channels };
    ctx.reply(Response::RPL_LISTSTART, vec![ctx.display_nick(), "Channel".to_string(), "Users Name".to_string()]);
    for name in names {
        if let Some(channel) = ctx.core.channels.get(&name) {
            let guard = channel.read();
            let topic = guard.topic.as_ref().map(|t| t.text.clone()).unwrap_or_default();
            ctx.reply(Response::RPL_LIST, vec![ctx.display_nick(), name.clone(), guard.members.len().to_string(), topic]);
        }
    }
    ctx.reply(Response::RPL_LISTEND, vec![ctx.display_nick(), "End of LIST".to_string()]);
    Ok(())
}
