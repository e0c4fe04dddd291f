use crate::response::Response;

/// A parsed IRC command, covering both the client wire protocol (§6,
/// "Client wire protocol") and the server-to-server wire protocol (§6,
/// "Server-to-server wire protocol"). Several s2s verbs reuse a client
/// variant because their wire shape is identical (`JOIN`, `PART`, `QUIT`);
/// the caller distinguishes client vs. link traffic by which stream the
/// message arrived on, not by the variant.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    // ---- Client registration & keepalive ----
    /// `NICK <nickname>`
    Nick(String),
    /// `USER <user> <mode> <unused> :<realname>`
    User {
        /// Username/ident token.
        user: String,
        /// Numeric mode mask (RFC 2812); not semantically used here.
        mode: String,
        /// Free-text real name.
        realname: String,
    },
    /// `PING <token>`
    Ping(String),
    /// `PONG <token>`
    Pong(String),
    /// `QUIT [:<reason>]`
    Quit(Option<String>),

    // ---- Channel membership & speech ----
    /// `JOIN <channel>{,<channel>} [<key>{,<key>}]`
    Join(Vec<String>, Vec<String>),
    /// `PART <channel>{,<channel>} [:<reason>]`
    Part(Vec<String>, Option<String>),
    /// `PRIVMSG <target> :<text>`
    Privmsg(String, String),
    /// `NOTICE <target> :<text>`
    Notice(String, String),
    /// `NAMES [<channel>{,<channel>}]`
    Names(Vec<String>),
    /// `TOPIC <channel> [:<text>]`
    Topic(String, Option<String>),
    /// `MODE <target> [<modestring> [<arg>...]]`
    Mode(String, Vec<String>),
    /// `KICK <channel> <user> [:<reason>]`
    Kick(String, String, Option<String>),
    /// `INVITE <nick> <channel>`
    Invite(String, String),
    /// `WHO [<mask>]`
    Who(Option<String>),
    /// `WHOIS <nick>{,<nick>}`
    Whois(Vec<String>),
    /// `LIST [<channel>{,<channel>}]`
    List(Vec<String>),
    /// `AWAY [:<message>]`
    Away(Option<String>),
    /// `USERHOST <nick>{ <nick>}`
    Userhost(Vec<String>),
    /// `ISON <nick>{ <nick>}`
    Ison(Vec<String>),
    /// `OPER <name> <password>`
    Oper(String, String),

    // ---- Server linking ----
    /// `PASS <password> TS <ts-version> <sid>`
    ServerPass {
        /// Shared link secret.
        password: String,
        /// TS protocol version (always `"6"` in this spec).
        ts_version: String,
        /// The sending server's SID.
        sid: String,
    },
    /// `CAPAB :<space-separated tokens>`
    Capab(Vec<String>),
    /// `SERVER <name> <hopcount> :<description>`
    Server {
        /// Announced server name.
        name: String,
        /// Hop count (1 for a directly linked peer).
        hopcount: u32,
        /// Human-readable description.
        description: String,
    },
    /// `SVINFO <ts-version> <min-ts-version> <current-unix-seconds>`
    Svinfo {
        /// Highest TS protocol version supported.
        ts_version: u32,
        /// Lowest TS protocol version supported.
        min_ts_version: u32,
        /// Sender's wall clock, for skew detection.
        current_time: i64,
    },
    /// `UID <nick> <hop> <ts> <modes> <user> <host> <ip> <uid> :<real>`
    Uid {
        /// Nickname being introduced.
        nick: String,
        /// Hop count from the introducing server.
        hop: u32,
        /// Nick introduction timestamp.
        ts: i64,
        /// User mode string, e.g. `+i`.
        modes: String,
        /// Username/ident.
        user: String,
        /// Displayed hostname.
        host: String,
        /// Display IP string.
        ip: String,
        /// The new user's UID.
        uid: String,
        /// Free-text real name.
        realname: String,
    },
    /// `SJOIN <ts> <channel> <modes> [<modeparams>...] :<prefixed-uid-list>`
    Sjoin {
        /// Channel creation timestamp.
        ts: i64,
        /// Channel name.
        channel: String,
        /// Mode letters and any mode parameters (key/limit), in wire order.
        modes: Vec<String>,
        /// Member tokens, each optionally prefixed with `@`/`+`.
        members: Vec<String>,
    },
    /// `NICK <newnick> :<ts>` (server-to-server rename with collision TS)
    NickTs(String, i64),
    /// `SQUIT <server> :<reason>`
    Squit(String, String),
    /// `ERROR :<reason>` (fatal; sender closes immediately after)
    Error(String),

    /// A numeric reply (`RPL_`/`ERR_`), server → client only.
    Response(Response, Vec<String>),
    /// Any command not covered above: name plus raw parameters, preserved
    /// verbatim so links can forward or ignore it without data loss.
    Raw(String, Vec<String>),
}

impl Command {
    /// The wire command token (`"PRIVMSG"`, `"001"`, ...).
    pub fn name(&self) -> String {
        match self {
            Command::Nick(_) => "NICK".to_string(),
            Command::User { .. } => "USER".to_string(),
            Command::Ping(_) => "PING".to_string(),
            Command::Pong(_) => "PONG".to_string(),
            Command::Quit(_) => "QUIT".to_string(),
            Command::Join(..) => "JOIN".to_string(),
            Command::Part(..) => "PART".to_string(),
            Command::Privmsg(..) => "PRIVMSG".to_string(),
            Command::Notice(..) => "NOTICE".to_string(),
            Command::Names(_) => "NAMES".to_string(),
            Command::Topic(..) => "TOPIC".to_string(),
            Command::Mode(..) => "MODE".to_string(),
            Command::Kick(..) => "KICK".to_string(),
            Command::Invite(..) => "INVITE".to_string(),
            Command::Who(_) => "WHO".to_string(),
            Command::Whois(_) => "WHOIS".to_string(),
            Command::List(_) => "LIST".to_string(),
            Command::Away(_) => "AWAY".to_string(),
            Command::Userhost(_) => "USERHOST".to_string(),
            Command::Ison(_) => "ISON".to_string(),
            Command::Oper(..) => "OPER".to_string(),
            Command::ServerPass { .. } => "PASS".to_string(),
            Command::Capab(_) => "CAPAB".to_string(),
            Command::Server { .. } => "SERVER".to_string(),
            Command::Svinfo { .. } => "SVINFO".to_string(),
            Command::Uid { .. } => "UID".to_string(),
            Command::Sjoin { .. } => "SJOIN".to_string(),
            Command::NickTs(..) => "NICK".to_string(),
            Command::Squit(..) => "SQUIT".to_string(),
            Command::Error(_) => "ERROR".to_string(),
            Command::Response(r, _) => format!("{:03}", r.code()),
            Command::Raw(name, _) => name.clone(),
        }
    }
}
