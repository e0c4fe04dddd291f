//! Unified error handling for dispatcher and channel operations (spec §7
//! "Error handling design": protocol/semantic errors get a numeric reply and
//! the session continues; only transport/timeout errors tear it down).

use irc_proto::{Command, Message, Response};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur while dispatching one command (spec §4.F, §7).
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("not enough parameters")]
    NeedMoreParams(String),

    #[error("not registered")]
    NotRegistered,

    #[error("already registered")]
    AlreadyRegistered,

    #[error("nickname in use: {0}")]
    NicknameInUse(String),

    #[error("erroneous nickname: {0}")]
    ErroneousNickname(String),

    #[error("no such nick/channel: {0}")]
    NoSuchNick(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("password incorrect")]
    PasswdMismatch,

    #[error("send error: {0}")]
    Send(#[from] mpsc::error::SendError<Message>),

    #[error("client quit: {0:?}")]
    Quit(Option<String>),

    #[error("internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Convert to a client-visible numeric reply, if this error warrants one.
    /// `Quit` and `Send` are handled by the connection loop directly instead.
    pub fn to_irc_reply(&self, server_name: &str, nick: &str) -> Option<Message> {
        let nick = if nick.is_empty() { "*" } else { nick };
        let (response, args): (Response, Vec<String>) = match self {
            HandlerError::NeedMoreParams(cmd) => (
                Response::ERR_NEEDMOREPARAMS,
                vec![nick.to_string(), cmd.clone(), "Not enough parameters".to_string()],
            ),
            HandlerError::NotRegistered => (
                Response::ERR_NOTREGISTERED,
                vec![nick.to_string(), "You have not registered".to_string()],
            ),
            HandlerError::AlreadyRegistered => (
                Response::ERR_ALREADYREGISTERED,
                vec![nick.to_string(), "You may not reregister".to_string()],
            ),
            HandlerError::NicknameInUse(bad) => (
                Response::ERR_NICKNAMEINUSE,
                vec![nick.to_string(), bad.clone(), "Nickname is already in use".to_string()],
            ),
            HandlerError::ErroneousNickname(bad) => (
                Response::ERR_ERRONEOUSNICKNAME,
                vec![nick.to_string(), bad.clone(), "Erroneous nickname".to_string()],
            ),
            HandlerError::NoSuchNick(target) => (
                Response::ERR_NOSUCHNICK,
                vec![nick.to_string(), target.clone(), "No such nick/channel".to_string()],
            ),
            HandlerError::UnknownCommand(cmd) => (
                Response::ERR_UNKNOWNCOMMAND,
                vec![nick.to_string(), cmd.clone(), "Unknown command".to_string()],
            ),
            HandlerError::PasswdMismatch => (
                Response::ERR_PASSWDMISMATCH,
                vec![nick.to_string(), "Password incorrect".to_string()],
            ),
            HandlerError::Send(_) | HandlerError::Quit(_) | HandlerError::Internal(_) => {
                return None
            }
        };
        Some(Message::with_prefix(server_name, Command::Response(response, args)))
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;

/// Channel operation errors (spec §4.E).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("not on channel")]
    NotOnChannel,

    #[error("you're not channel operator")]
    ChanOpPrivsNeeded,

    #[error("user {0} is not on that channel")]
    UserNotInChannel(String),

    #[error("user {0} is already on that channel")]
    UserOnChannel(String),

    #[error("cannot join channel (+b)")]
    BannedFromChan,

    #[error("cannot join channel (+i)")]
    InviteOnlyChan,

    #[error("cannot join channel (+l)")]
    ChannelIsFull,

    #[error("cannot join channel (+k)")]
    BadChannelKey,

    #[error("cannot send to channel")]
    CannotSendToChan,

    #[error("no such channel")]
    NoSuchChannel,
}

impl ChannelError {
    /// Convert to an IRC error reply message.
    pub fn to_irc_reply(&self, server_name: &str, nick: &str, channel: &str) -> Message {
        let (response, args) = match self {
            ChannelError::NotOnChannel => (
                Response::ERR_NOTONCHANNEL,
                vec![nick.to_string(), channel.to_string(), "You're not on that channel".to_string()],
            ),
            ChannelError::ChanOpPrivsNeeded => (
                Response::ERR_CHANOPRIVSNEEDED,
                vec![nick.to_string(), channel.to_string(), "You're not channel operator".to_string()],
            ),
            ChannelError::UserNotInChannel(target) => (
                Response::ERR_USERNOTINCHANNEL,
                vec![nick.to_string(), target.clone(), channel.to_string(), "They aren't on that channel".to_string()],
            ),
            ChannelError::UserOnChannel(target) => (
                Response::ERR_USERONCHANNEL,
                vec![nick.to_string(), target.clone(), channel.to_string(), "is already on channel".to_string()],
            ),
            ChannelError::BannedFromChan => (
                Response::ERR_BANNEDFROMCHAN,
                vec![nick.to_string(), channel.to_string(), "Cannot join channel (+b)".to_string()],
            ),
            ChannelError::InviteOnlyChan => (
                Response::ERR_INVITEONLYCHAN,
                vec![nick.to_string(), channel.to_string(), "Cannot join channel (+i)".to_string()],
            ),
            ChannelError::ChannelIsFull => (
                Response::ERR_CHANNELISFULL,
                vec![nick.to_string(), channel.to_string(), "Cannot join channel (+l)".to_string()],
            ),
            ChannelError::BadChannelKey => (
                Response::ERR_BADCHANNELKEY,
                vec![nick.to_string(), channel.to_string(), "Cannot join channel (+k)".to_string()],
            ),
            ChannelError::CannotSendToChan => (
                Response::ERR_CANNOTSENDTOCHAN,
                vec![nick.to_string(), channel.to_string(), "Cannot send to channel".to_string()],
            ),
            ChannelError::NoSuchChannel => (
                Response::ERR_NOSUCHCHANNEL,
                vec![nick.to_string(), channel.to_string(), "No such channel".to_string()],
            ),
        };
        Message::with_prefix(server_name, Command::Response(response, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn need_more_params_round_trips_to_461() {
        let reply = HandlerError::NeedMoreParams("JOIN".to_string()).to_irc_reply("irc.example.com", "alice");
        assert!(matches!(
            reply.unwrap().command,
            Command::Response(Response::ERR_NEEDMOREPARAMS, _)
        ));
    }

    #[test]
    fn quit_has_no_client_visible_reply() {
        let reply = HandlerError::Quit(None).to_irc_reply("irc.example.com", "alice");
        assert!(reply.is_none());
    }

    #[test]
    fn channel_error_round_trips() {
        let reply = ChannelError::NotOnChannel.to_irc_reply("irc.example.com", "alice", "#test");
        assert!(matches!(reply.command, Command::Response(Response::ERR_NOTONCHANNEL, _)));
    }
}
