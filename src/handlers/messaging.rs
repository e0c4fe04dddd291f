//! PRIVMSG/NOTICE (spec §4.J "Policy by event").

use super::Context;
use crate::error::{HandlerError, HandlerResult};
use irc_proto::{Command, Message};

fn deliver(ctx: &Context<'_>, target: &str, text: String, is_notice: bool, errors_allowed: bool) -> HandlerResult {
    let uid = ctx.session.uid().ok_or(HandlerError::NotRegistered)?;
    let wrap = |t: String| if is_notice { Command::Notice(target.to_string(), t) } else { Command::Privmsg(target.to_string(), t) };

    if target.starts_with('#') || target.starts_with('&') {
        let Some(channel) = ctx.core.channels.get(target) else {
            if errors_allowed {
                return Err(HandlerError::NoSuchNick(target.to_string()));
            }
            return Ok(());
        };
        if let Err(e) = channel.read().can_speak(&uid) {
            if errors_allowed {
                ctx.send_channel_error(&e, target);
            }
            return Ok(());
        }
        let msg = Message::with_prefix(ctx.session.hostmask(), wrap(text));
        super::broadcast_to_channel(ctx.core, &channel, msg.clone(), Some(&uid));
        crate::sync::router::propagate(ctx.core, msg);
        return Ok(());
    }

    // Local recipient.
    if let Some(target_session) = ctx.core.clients.get(target) {
        let msg = Message::with_prefix(ctx.session.hostmask(), wrap(text));
        target_session.enqueue(msg);
        return Ok(());
    }

    // Remote recipient: point-to-point to the peer hosting the target's SID
    // (spec §4.J: "emit ... on the link to the server that owns the
    // target's SID").
    if let Some(target_uid) = ctx.core.network.uid_for_nick(target) {
        if let Some(peer) = ctx.core.links.get(&target_uid[..3]) {
            let remote_cmd = if is_notice { Command::Notice(target_uid, text) } else { Command::Privmsg(target_uid, text) };
            peer.send(Message::with_prefix(uid, remote_cmd));
            return Ok(());
        }
    }

    if errors_allowed {
        return Err(HandlerError::NoSuchNick(target.to_string()));
    }
    Ok(())
}

pub fn handle_privmsg(ctx: &Context<'_>, target: String, text: String) -> HandlerResult {
    deliver(ctx, &target, text, false, true)
}

pub fn handle_notice(ctx: &Context<'_>, target: String, text: String) -> HandlerResult {
    // NOTICE must never generate an automatic reply, including an error
    // numeric, per RFC 2812 §3.3.2.
    deliver(ctx, &target, text, true, false)
}
