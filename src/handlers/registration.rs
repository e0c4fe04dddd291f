//! NICK/USER registration, PING/PONG keepalive, QUIT, and OPER (spec §4.F, §4.L).

use super::Context;
use crate::error::{HandlerError, HandlerResult};
use crate::security;
use crate::state::RegistrationState;
use irc_proto::{validation, Command, Message, Response};
use tracing::info;

pub fn handle_nick(ctx: &Context<'_>, nick: String) -> HandlerResult {
    if nick.is_empty() {
        return Err(HandlerError::ErroneousNickname(nick));
    }
    if validation::validate_nick(&nick).is_err() {
        return Err(HandlerError::ErroneousNickname(nick));
    }

    let already_registered = ctx.session.is_registered();
    if !already_registered && ctx.core.clients.contains(&nick) {
        return Err(HandlerError::NicknameInUse(nick));
    }

    if already_registered {
        let old_nick = ctx.session.nick().unwrap_or_default();
        match ctx.core.clients.rename(&old_nick, &nick, ctx.session) {
            Ok(()) => {}
            Err(_) => return Err(HandlerError::NicknameInUse(nick)),
        }
        let uid = ctx.session.uid().unwrap_or_default();
        ctx.core.network.rename_user(&uid, &old_nick, &nick);
        ctx.session.identity.write().nick = Some(nick.clone());

        let prefix = format!("{}!{}@{}", old_nick, ctx.session.username().unwrap_or_default(), ctx.session.host);
        let announcement = Message::with_prefix(prefix, Command::Nick(nick.clone()));
        super::notify_shared_channel_members(ctx.core, ctx.session, announcement.clone());
        ctx.session.enqueue(announcement);
        crate::sync::router::propagate(ctx.core, Message::with_prefix(uid, Command::NickTs(nick, now())));
        return Ok(());
    }

    ctx.core.clients.add(&nick, ctx.session.clone()).map_err(|_| HandlerError::NicknameInUse(nick.clone()))?;
    ctx.session.identity.write().nick = Some(nick);
    maybe_complete_registration(ctx);
    Ok(())
}

pub fn handle_user(ctx: &Context<'_>, user: String, realname: String) -> HandlerResult {
    if ctx.session.is_registered() {
        return Err(HandlerError::AlreadyRegistered);
    }
    if user.is_empty() {
        return Err(HandlerError::NeedMoreParams("USER".to_string()));
    }
    {
        let mut identity = ctx.session.identity.write();
        identity.username = Some(user);
        identity.realname = Some(realname);
    }
    *ctx.session.state.write() = RegistrationState::UserSet;
    maybe_complete_registration(ctx);
    Ok(())
}

fn maybe_complete_registration(ctx: &Context<'_>) {
    let (nick, username) = {
        let identity = ctx.session.identity.read();
        (identity.nick.clone(), identity.username.clone())
    };
    let (Some(nick), Some(_username)) = (nick, username) else {
        return;
    };
    if ctx.session.is_registered() {
        return;
    }

    let uid = ctx.core.network.uid_gen.next();
    ctx.session.identity.write().uid = Some(uid.clone());
    *ctx.session.state.write() = RegistrationState::Registered;
    ctx.core.network.introduce_local(&nick, uid.clone(), ctx.session.clone());

    // Propagate the UID introduction to every linked peer (spec §4.D
    // "Registration completion"/§4.J router).
    let introduction = {
        let identity = ctx.session.identity.read();
        Message::with_prefix(
            ctx.core.network.local_sid.clone(),
            Command::Uid {
                nick: nick.clone(),
                hop: 1,
                ts: ctx.session.connected_at,
                modes: "+".to_string(),
                user: identity.username.clone().unwrap_or_default(),
                host: ctx.session.host.clone(),
                ip: ctx.session.remote_addr.ip().to_string(),
                uid: uid.clone(),
                realname: identity.realname.clone().unwrap_or_default(),
            },
        )
    };
    crate::sync::router::propagate(ctx.core, introduction);

    let server = ctx.server_name().to_string();
    let hostmask = ctx.session.hostmask();
    ctx.reply(
        Response::RPL_WELCOME,
        vec![nick.clone(), format!("Welcome to the Internet Relay Network {hostmask}")],
    );
    ctx.reply(
        Response::RPL_YOURHOST,
        vec![nick.clone(), format!("Your host is {server}, running version tidalnetd-0.1")],
    );
    ctx.reply(
        Response::RPL_CREATED,
        vec![nick.clone(), format!("This server was created {}", now())],
    );
    ctx.reply(
        Response::RPL_MYINFO,
        vec![nick.clone(), server, "tidalnetd-0.1".to_string(), "iow".to_string(), "intklov".to_string()],
    );

    info!(nick = %nick, uid = %uid, "client registered");
}

pub fn handle_quit(ctx: &Context<'_>, reason: Option<String>) -> HandlerResult {
    Err(HandlerError::Quit(reason))
}

pub async fn handle_oper(ctx: &Context<'_>, name: String, password: String) -> HandlerResult {
    let creds = ctx.core.config.operators.iter().find(|o| o.name == name).cloned();
    let Some(creds) = creds else {
        info!(name = %name, "OPER attempt for unknown name");
        return Err(HandlerError::PasswdMismatch);
    };

    let ok = security::verify_password(password, creds.hashed_password).await.unwrap_or(false);
    if !ok {
        info!(name = %name, "OPER attempt with bad password");
        return Err(HandlerError::PasswdMismatch);
    }

    ctx.session.identity.write().operator = true;
    ctx.reply(Response::RPL_YOUREOPER, vec![ctx.display_nick(), "You are now an IRC operator".to_string()]);
    info!(name = %name, "OPER succeeded");
    Ok(())
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
