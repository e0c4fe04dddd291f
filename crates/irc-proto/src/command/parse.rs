use super::types::Command;
use crate::error::MessageParseError;
use crate::response::Response;

fn split_csv(s: &str) -> Vec<String> {
    s.split(',').map(|p| p.to_string()).collect()
}

impl Command {
    /// Build a typed [`Command`] from a command token and its parameters.
    ///
    /// This never fails: a recognized name with too few parameters (a
    /// `NeedMoreParams` condition) falls back to [`Command::Raw`] so the
    /// caller's dispatcher can apply its own min-param table and reply with
    /// the appropriate numeric (spec §4.F) rather than losing the message.
    pub fn new(name: &str, params: Vec<String>) -> Result<Command, MessageParseError> {
        let upper = name.to_ascii_uppercase();
        let raw = || Command::Raw(upper.clone(), params.clone());

        let cmd = match upper.as_str() {
            "NICK" => match params.len() {
                1 => Command::Nick(params[0].clone()),
                n if n >= 2 => match params[1].parse::<i64>() {
                    Ok(ts) => Command::NickTs(params[0].clone(), ts),
                    Err(_) => raw(),
                },
                _ => raw(),
            },
            "USER" if params.len() >= 4 => Command::User {
                user: params[0].clone(),
                mode: params[1].clone(),
                realname: params[3].clone(),
            },
            "PING" if !params.is_empty() => Command::Ping(params[0].clone()),
            "PONG" if !params.is_empty() => Command::Pong(params.last().unwrap().clone()),
            "QUIT" => Command::Quit(params.first().cloned()),
            "JOIN" if !params.is_empty() => {
                let channels = split_csv(&params[0]);
                let keys = params.get(1).map(|k| split_csv(k)).unwrap_or_default();
                Command::Join(channels, keys)
            }
            "PART" if !params.is_empty() => {
                Command::Part(split_csv(&params[0]), params.get(1).cloned())
            }
            "PRIVMSG" if params.len() >= 2 => {
                Command::Privmsg(params[0].clone(), params[1].clone())
            }
            "NOTICE" if params.len() >= 2 => {
                Command::Notice(params[0].clone(), params[1].clone())
            }
            "NAMES" => Command::Names(params.first().map(|s| split_csv(s)).unwrap_or_default()),
            "TOPIC" if !params.is_empty() => {
                Command::Topic(params[0].clone(), params.get(1).cloned())
            }
            "MODE" if !params.is_empty() => {
                Command::Mode(params[0].clone(), params[1..].to_vec())
            }
            "KICK" if params.len() >= 2 => {
                Command::Kick(params[0].clone(), params[1].clone(), params.get(2).cloned())
            }
            "INVITE" if params.len() >= 2 => {
                Command::Invite(params[0].clone(), params[1].clone())
            }
            "WHO" => Command::Who(params.first().cloned()),
            "WHOIS" if !params.is_empty() => {
                Command::Whois(split_csv(params.last().unwrap()))
            }
            "LIST" => Command::List(params.first().map(|s| split_csv(s)).unwrap_or_default()),
            "AWAY" => Command::Away(params.first().cloned()),
            "USERHOST" if !params.is_empty() => Command::Userhost(params),
            "ISON" if !params.is_empty() => Command::Ison(params),
            "OPER" if params.len() >= 2 => Command::Oper(params[0].clone(), params[1].clone()),

            "PASS" if params.len() >= 4 && params[1].eq_ignore_ascii_case("TS") => {
                Command::ServerPass {
                    password: params[0].clone(),
                    ts_version: params[2].clone(),
                    sid: params[3].clone(),
                }
            }
            "CAPAB" if !params.is_empty() => {
                Command::Capab(params[0].split_whitespace().map(str::to_string).collect())
            }
            "SERVER" if params.len() >= 3 => match params[1].parse::<u32>() {
                Ok(hopcount) => Command::Server {
                    name: params[0].clone(),
                    hopcount,
                    description: params[2].clone(),
                },
                Err(_) => raw(),
            },
            "SVINFO" if params.len() >= 3 => {
                match (
                    params[0].parse::<u32>(),
                    params[1].parse::<u32>(),
                    params[2].parse::<i64>(),
                ) {
                    (Ok(ts_version), Ok(min_ts_version), Ok(current_time)) => Command::Svinfo {
                        ts_version,
                        min_ts_version,
                        current_time,
                    },
                    _ => raw(),
                }
            }
            "UID" if params.len() >= 9 => match (params[1].parse::<u32>(), params[2].parse::<i64>())
            {
                (Ok(hop), Ok(ts)) => Command::Uid {
                    nick: params[0].clone(),
                    hop,
                    ts,
                    modes: params[3].clone(),
                    user: params[4].clone(),
                    host: params[5].clone(),
                    ip: params[6].clone(),
                    uid: params[7].clone(),
                    realname: params[8].clone(),
                },
                _ => raw(),
            },
            "SJOIN" if params.len() >= 4 => match params[0].parse::<i64>() {
                Ok(ts) => {
                    let members = split_csv(params.last().unwrap())
                        .into_iter()
                        .flat_map(|s| s.split_whitespace().map(str::to_string).collect::<Vec<_>>())
                        .collect();
                    Command::Sjoin {
                        ts,
                        channel: params[1].clone(),
                        modes: params[2..params.len() - 1].to_vec(),
                        members,
                    }
                }
                Err(_) => raw(),
            },
            "SQUIT" if params.len() >= 2 => {
                Command::Squit(params[0].clone(), params[1].clone())
            }
            "ERROR" if !params.is_empty() => Command::Error(params[0].clone()),

            _ if upper.len() == 3 && upper.chars().all(|c| c.is_ascii_digit()) => {
                let code: u16 = upper.parse().expect("checked all-digit above");
                match Response::from_code(code) {
                    Some(resp) => Command::Response(resp, params),
                    None => raw(),
                }
            }
            _ => raw(),
        };
        Ok(cmd)
    }
}
