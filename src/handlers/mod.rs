//! Command dispatch: preflight checks, then routing to a handler group
//! (spec §4.F "Command dispatcher").

mod channel;
mod messaging;
mod query;
mod registration;

use crate::error::{HandlerError, HandlerResult};
use crate::state::{ServerCore, Session};
use irc_proto::{Command, Message, Response};
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything a handler needs: the shared server state, the calling
/// session, and that session's assigned UID (once registered).
pub struct Context<'a> {
    pub core: &'a ServerCore,
    pub session: &'a Arc<Session>,
}

impl<'a> Context<'a> {
    pub fn server_name(&self) -> &str {
        &self.core.config.server.name
    }

    /// The nick to use in numeric replies before/after registration.
    pub fn display_nick(&self) -> String {
        self.session.nick().unwrap_or_else(|| "*".to_string())
    }

    pub fn reply(&self, response: Response, args: Vec<String>) {
        let msg = Message::with_prefix(self.server_name().to_string(), Command::Response(response, args));
        self.session.enqueue(msg);
    }

    pub fn send_error(&self, err: &HandlerError) {
        if let Some(msg) = err.to_irc_reply(self.server_name(), &self.display_nick()) {
            self.session.enqueue(msg);
        }
    }

    pub fn send_channel_error(&self, err: &crate::error::ChannelError, channel: &str) {
        let msg = err.to_irc_reply(self.server_name(), &self.display_nick(), channel);
        self.session.enqueue(msg);
    }
}

/// Commands usable before registration completes.
fn needs_registration(command: &Command) -> bool {
    !matches!(
        command,
        Command::Nick(_) | Command::User { .. } | Command::Pong(_) | Command::Ping(_) | Command::Quit(_)
    )
}

/// Minimum parameter count preflight (spec §4.F), beyond what the typed
/// `Command` already guarantees structurally (missing required params
/// surface as empty strings from the codec, not absent variants).
fn min_params_ok(command: &Command) -> bool {
    match command {
        Command::Nick(nick) => !nick.is_empty(),
        Command::User { user, .. } => !user.is_empty(),
        Command::Join(channels, _) => !channels.is_empty(),
        Command::Privmsg(target, _) | Command::Notice(target, _) => !target.is_empty(),
        Command::Topic(channel, _) => !channel.is_empty(),
        Command::Mode(target, _) => !target.is_empty(),
        Command::Kick(channel, target, _) => !channel.is_empty() && !target.is_empty(),
        Command::Invite(nick, channel) => !nick.is_empty() && !channel.is_empty(),
        Command::Oper(name, pass) => !name.is_empty() && !pass.is_empty(),
        _ => true,
    }
}

/// Entry point: one decoded client message, already rate-limited and
/// within length bounds. Returns `Err(HandlerError::Quit(_))` when the
/// connection loop should tear the session down; every other error has
/// already been turned into a numeric reply (or logged, for transport-kind
/// errors) before returning.
pub async fn dispatch(core: &ServerCore, session: &Arc<Session>, message: Message) -> HandlerResult {
    let ctx = Context { core, session };
    let command = message.command;

    if needs_registration(&command) && !session.is_registered() {
        ctx.send_error(&HandlerError::NotRegistered);
        return Ok(());
    }
    if !min_params_ok(&command) {
        ctx.send_error(&HandlerError::NeedMoreParams(command.name()));
        return Ok(());
    }

    let result = match command {
        Command::Nick(nick) => registration::handle_nick(&ctx, nick),
        Command::User { user, realname, .. } => registration::handle_user(&ctx, user, realname),
        Command::Ping(token) => {
            ctx.session.enqueue(Message::with_prefix(ctx.server_name().to_string(), Command::Pong(token)));
            Ok(())
        }
        Command::Pong(_) => {
            ctx.session.touch();
            Ok(())
        }
        Command::Quit(reason) => registration::handle_quit(&ctx, reason),
        Command::Oper(name, password) => registration::handle_oper(&ctx, name, password).await,

        Command::Join(channels, keys) => channel::handle_join(&ctx, channels, keys),
        Command::Part(channels, reason) => channel::handle_part(&ctx, channels, reason),
        Command::Topic(name, text) => channel::handle_topic(&ctx, name, text),
        Command::Mode(target, changes) => channel::handle_mode(&ctx, target, changes),
        Command::Kick(channel, target, reason) => channel::handle_kick(&ctx, channel, target, reason),
        Command::Invite(nick, channel) => channel::handle_invite(&ctx, nick, channel),
        Command::Names(channels) => channel::handle_names(&ctx, channels),
        Command::List(channels) => channel::handle_list(&ctx, channels),

        Command::Privmsg(target, text) => messaging::handle_privmsg(&ctx, target, text),
        Command::Notice(target, text) => messaging::handle_notice(&ctx, target, text),

        Command::Who(mask) => query::handle_who(&ctx, mask),
        Command::Whois(nicks) => query::handle_whois(&ctx, nicks),
        Command::Userhost(nicks) => query::handle_userhost(&ctx, nicks),
        Command::Ison(nicks) => query::handle_ison(&ctx, nicks),
        Command::Away(msg) => query::handle_away(&ctx, msg),

        other => {
            debug!(command = %other.name(), "unhandled or link-only command on client stream");
            Err(HandlerError::UnknownCommand(other.name()))
        }
    };

    if let Err(err) = &result {
        match err {
            HandlerError::Quit(_) => {}
            HandlerError::Send(_) | HandlerError::Internal(_) => {
                warn!(error = %err, "handler failed");
            }
            _ => ctx.send_error(err),
        }
    }
    result
}

pub(crate) use channel::{apply_mode_change, broadcast_to_channel, notify_shared_channel_members};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_exempt_commands() {
        assert!(!needs_registration(&Command::Nick("a".into())));
        assert!(!needs_registration(&Command::Quit(None)));
        assert!(needs_registration(&Command::Join(vec!["#a".into()], vec![])));
    }
}
