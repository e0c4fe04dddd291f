//! Per-connection session state (spec §3 "Session", §4.C).

use irc_proto::Message;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::sync::mpsc;

/// Registration progress for one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationState {
    Connected,
    NickSet,
    UserSet,
    Registered,
}

/// Reason a session's connection was torn down.
#[derive(Debug, Clone)]
pub enum DisconnectReason {
    Quit(String),
    ReadError,
    PingTimeout,
    SendQueueOverflow,
    Killed(String),
    ServerShutdown,
}

impl DisconnectReason {
    /// The text sent to peers/remaining channel members as the QUIT reason.
    pub fn as_quit_text(&self) -> String {
        match self {
            DisconnectReason::Quit(reason) => reason.clone(),
            DisconnectReason::ReadError => "Read error".to_string(),
            DisconnectReason::PingTimeout => "Ping timeout".to_string(),
            DisconnectReason::SendQueueOverflow => "SendQ exceeded".to_string(),
            DisconnectReason::Killed(reason) => format!("Killed: {reason}"),
            DisconnectReason::ServerShutdown => "Server shutting down".to_string(),
        }
    }
}

/// Mutable registration fields, guarded together so partial updates are atomic.
#[derive(Debug, Default)]
pub struct Identity {
    pub nick: Option<String>,
    pub username: Option<String>,
    pub realname: Option<String>,
    pub uid: Option<String>,
    pub away: Option<String>,
    pub operator: bool,
    pub invisible: bool,
    pub wallops: bool,
}

/// One accepted client stream (spec §3 "Session").
pub struct Session {
    pub remote_addr: SocketAddr,
    pub host: String,
    pub connected_at: i64,
    pub identity: RwLock<Identity>,
    pub state: RwLock<RegistrationState>,
    pub channels: RwLock<HashSet<String>>,
    pub last_activity: RwLock<Instant>,
    pub ping_pending: RwLock<bool>,
    tx: mpsc::Sender<Message>,
}

impl Session {
    pub fn new(remote_addr: SocketAddr, host: String, connected_at: i64, tx: mpsc::Sender<Message>) -> Self {
        Session {
            remote_addr,
            host,
            connected_at,
            identity: RwLock::new(Identity::default()),
            state: RwLock::new(RegistrationState::Connected),
            channels: RwLock::new(HashSet::new()),
            last_activity: RwLock::new(Instant::now()),
            ping_pending: RwLock::new(false),
            tx,
        }
    }

    /// Enqueue a line to the write half. Returns `false` if the queue is full
    /// (spec §4.C: caller must flag the session for disconnect on overflow).
    pub fn enqueue(&self, message: Message) -> bool {
        self.tx.try_send(message).is_ok()
    }

    pub fn nick(&self) -> Option<String> {
        self.identity.read().nick.clone()
    }

    pub fn uid(&self) -> Option<String> {
        self.identity.read().uid.clone()
    }

    pub fn username(&self) -> Option<String> {
        self.identity.read().username.clone()
    }

    pub fn is_registered(&self) -> bool {
        *self.state.read() == RegistrationState::Registered
    }

    pub fn is_operator(&self) -> bool {
        self.identity.read().operator
    }

    pub fn hostmask(&self) -> String {
        let identity = self.identity.read();
        format!(
            "{}!{}@{}",
            identity.nick.as_deref().unwrap_or("*"),
            identity.username.as_deref().unwrap_or("*"),
            self.host
        )
    }

    pub fn touch(&self) {
        *self.last_activity.write() = Instant::now();
        *self.ping_pending.write() = false;
    }

    pub fn joined_channels(&self) -> Vec<String> {
        self.channels.read().iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_session() -> (Session, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(4);
        let addr = "127.0.0.1:6667".parse().unwrap();
        (Session::new(addr, "localhost".to_string(), 0, tx), rx)
    }

    #[test]
    fn hostmask_uses_placeholders_before_registration() {
        let (session, _rx) = new_session();
        assert_eq!(session.hostmask(), "*!*@localhost");
    }

    #[test]
    fn enqueue_fails_when_queue_is_full() {
        let (session, _rx) = new_session();
        for _ in 0..4 {
            assert!(session.enqueue(Message::new(irc_proto::Command::Ping("x".to_string()))));
        }
        assert!(!session.enqueue(Message::new(irc_proto::Command::Ping("x".to_string()))));
    }

    #[test]
    fn touch_clears_pending_ping() {
        let (session, _rx) = new_session();
        *session.ping_pending.write() = true;
        session.touch();
        assert!(!*session.ping_pending.read());
    }
}
