//! WHO/WHOIS/USERHOST/ISON/AWAY (spec §4.F).

use super::Context;
use crate::error::HandlerResult;
use irc_proto::Response;

pub fn handle_who(ctx: &Context<'_>, mask: Option<String>) -> HandlerResult {
    let name = mask.unwrap_or_default();
    if let Some(channel) = ctx.core.channels.get(&name) {
        for uid in channel.read().members.keys().cloned().collect::<Vec<_>>() {
            let Some(session) = ctx.core.network.local_session(&uid) else { continue };
            let nick = session.nick().unwrap_or_default();
            let username = session.username().unwrap_or_default();
            ctx.reply(
                Response::RPL_WHOREPLY,
                vec![
                    name.clone(),
                    username,
                    session.host.clone(),
                    ctx.server_name().to_string(),
                    nick,
                    "H".to_string(),
                    format!("0 {}", session.identity.read().realname.clone().unwrap_or_default()),
                ],
            );
        }
    }
    ctx.reply(Response::RPL_ENDOFWHO, vec![name, "End of WHO list".to_string()]);
    Ok(())
}

pub fn handle_whois(ctx: &Context<'_>, nicks: Vec<String>) -> HandlerResult {
    for nick in nicks {
        let Some(session) = ctx.core.clients.get(&nick) else {
            continue;
        };
        let identity = session.identity.read();
        ctx.reply(
            Response::RPL_WHOISUSER,
            vec![
                nick.clone(),
                identity.username.clone().unwrap_or_default(),
                session.host.clone(),
                "*".to_string(),
                identity.realname.clone().unwrap_or_default(),
            ],
        );
        ctx.reply(
            Response::RPL_WHOISSERVER,
            vec![nick.clone(), ctx.server_name().to_string(), "this server".to_string()],
        );
        if identity.operator {
            ctx.reply(Response::RPL_WHOISOPERATOR, vec![nick.clone(), "is an IRC operator".to_string()]);
        }
        let channels: Vec<String> = session.joined_channels();
        if !channels.is_empty() {
            ctx.reply(Response::RPL_WHOISCHANNELS, vec![nick.clone(), channels.join(" ")]);
        }
        ctx.reply(Response::RPL_ENDOFWHOIS, vec![nick, "End of WHOIS list".to_string()]);
    }
    Ok(())
}

pub fn handle_userhost(ctx: &Context<'_>, nicks: Vec<String>) -> HandlerResult {
    let entries: Vec<String> = nicks
        .into_iter()
        .filter_map(|nick| {
            let session = ctx.core.clients.get(&nick)?;
            let identity = session.identity.read();
            let op_marker = if identity.operator { "*" } else { "" };
            let away_marker = if identity.away.is_some() { "-" } else { "+" };
            Some(format!("{nick}{op_marker}={away_marker}{}@{}", identity.username.clone().unwrap_or_default(), session.host))
        })
        .collect();
    ctx.reply(Response::RPL_USERHOST, vec![entries.join(" ")]);
    Ok(())
}

pub fn handle_ison(ctx: &Context<'_>, nicks: Vec<String>) -> HandlerResult {
    let online: Vec<String> = nicks.into_iter().filter(|n| ctx.core.clients.contains(n) || ctx.core.network.uid_for_nick(n).is_some()).collect();
    ctx.reply(Response::RPL_ISON, vec![online.join(" ")]);
    Ok(())
}

pub fn handle_away(ctx: &Context<'_>, message: Option<String>) -> HandlerResult {
    ctx.session.identity.write().away = message.clone();
    match message {
        Some(_) => ctx.reply(Response::RPL_NOWAWAY, vec![ctx.display_nick(), "You have been marked as being away".to_string()]),
        None => ctx.reply(Response::RPL_UNAWAY, vec![ctx.display_nick(), "You are no longer marked as being away".to_string()]),
    }
    Ok(())
}
