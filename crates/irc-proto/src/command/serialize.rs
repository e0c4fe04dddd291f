use super::types::Command;

impl Command {
    /// Render this command's parameters in wire order. The caller
    /// ([`crate::message::serialize`]) decides whether the final element
    /// needs a `:` trailing marker.
    pub fn params(&self) -> Vec<String> {
        match self {
            Command::Nick(nick) => vec![nick.clone()],
            Command::User { user, mode, realname } => {
                vec![user.clone(), mode.clone(), "*".to_string(), realname.clone()]
            }
            Command::Ping(token) => vec![token.clone()],
            Command::Pong(token) => vec![token.clone()],
            Command::Quit(reason) => reason.iter().cloned().collect(),
            Command::Join(channels, keys) => {
                let mut v = vec![channels.join(",")];
                if !keys.is_empty() {
                    v.push(keys.join(","));
                }
                v
            }
            Command::Part(channels, reason) => {
                let mut v = vec![channels.join(",")];
                v.extend(reason.iter().cloned());
                v
            }
            Command::Privmsg(target, text) => vec![target.clone(), text.clone()],
            Command::Notice(target, text) => vec![target.clone(), text.clone()],
            Command::Names(channels) => {
                if channels.is_empty() {
                    vec![]
                } else {
                    vec![channels.join(",")]
                }
            }
            Command::Topic(channel, text) => {
                let mut v = vec![channel.clone()];
                v.extend(text.iter().cloned());
                v
            }
            Command::Mode(target, args) => {
                let mut v = vec![target.clone()];
                v.extend(args.iter().cloned());
                v
            }
            Command::Kick(channel, target, reason) => {
                let mut v = vec![channel.clone(), target.clone()];
                v.extend(reason.iter().cloned());
                v
            }
            Command::Invite(nick, channel) => vec![nick.clone(), channel.clone()],
            Command::Who(mask) => mask.iter().cloned().collect(),
            Command::Whois(targets) => vec![targets.join(",")],
            Command::List(channels) => {
                if channels.is_empty() {
                    vec![]
                } else {
                    vec![channels.join(",")]
                }
            }
            Command::Away(text) => text.iter().cloned().collect(),
            Command::Userhost(nicks) => nicks.clone(),
            Command::Ison(nicks) => nicks.clone(),
            Command::Oper(name, pass) => vec![name.clone(), pass.clone()],

            Command::ServerPass { password, ts_version, sid } => {
                vec![password.clone(), "TS".to_string(), ts_version.clone(), sid.clone()]
            }
            Command::Capab(tokens) => vec![tokens.join(" ")],
            Command::Server { name, hopcount, description } => {
                vec![name.clone(), hopcount.to_string(), description.clone()]
            }
            Command::Svinfo { ts_version, min_ts_version, current_time } => vec![
                ts_version.to_string(),
                min_ts_version.to_string(),
                current_time.to_string(),
            ],
            Command::Uid { nick, hop, ts, modes, user, host, ip, uid, realname } => vec![
                nick.clone(),
                hop.to_string(),
                ts.to_string(),
                modes.clone(),
                user.clone(),
                host.clone(),
                ip.clone(),
                uid.clone(),
                realname.clone(),
            ],
            Command::Sjoin { ts, channel, modes, members } => {
                let mut v = vec![ts.to_string(), channel.clone()];
                v.extend(modes.iter().cloned());
                v.push(members.join(" "));
                v
            }
            Command::NickTs(nick, ts) => vec![nick.clone(), ts.to_string()],
            Command::Squit(server, reason) => vec![server.clone(), reason.clone()],
            Command::Error(reason) => vec![reason.clone()],
            Command::Response(_, args) => args.clone(),
            Command::Raw(_, params) => params.clone(),
        }
    }
}
