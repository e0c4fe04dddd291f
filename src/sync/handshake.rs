//! Link handshake state machine: PASS/CAPAB/SERVER/SVINFO exchange (spec §4.H).

use crate::config::PeerConfig;
use crate::state::RemoteServer;
use irc_proto::{Command, Message};

const REQUIRED_CAPABS: &[&str] = &["QS", "EX", "SERVICES", "ENCAP", "EUID"];
const TS_VERSION: u32 = 6;
const MAX_CLOCK_SKEW_SECS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// Waiting for the peer's PASS/CAPAB/SERVER/SVINFO quartet.
    AwaitingCredentials,
    /// Both sides' credentials verified; ready to burst.
    Registered,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandshakeError {
    #[error("link password mismatch")]
    BadPassword,
    #[error("unknown peer: {0}")]
    UnknownPeer(String),
    #[error("unsupported TS protocol version")]
    ProtocolVersion,
    #[error("server name/SID already linked: {0}")]
    Conflict(String),
    #[error("unexpected command during handshake: {0}")]
    Unexpected(String),
    #[error("peer is missing required capabilities: {0:?}")]
    MissingCapabs(Vec<String>),
}

/// Drives one side of a link handshake. The same machine is used whether we
/// dialed out (outbound) or accepted a connection (inbound); the only
/// difference is who sends the first greeting.
pub struct HandshakeMachine {
    state: HandshakeState,
    local_sid: String,
    local_name: String,
    local_description: String,

    remote_pass: Option<String>,
    remote_sid: Option<String>,
    remote_name: Option<String>,
    remote_capab: Option<Vec<String>>,
    remote_svinfo: Option<(u32, u32, i64)>,
}

impl HandshakeMachine {
    pub fn new(local_sid: impl Into<String>, local_name: impl Into<String>, local_description: impl Into<String>) -> Self {
        HandshakeMachine {
            state: HandshakeState::AwaitingCredentials,
            local_sid: local_sid.into(),
            local_name: local_name.into(),
            local_description: local_description.into(),
            remote_pass: None,
            remote_sid: None,
            remote_name: None,
            remote_capab: None,
            remote_svinfo: None,
        }
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// The PASS/CAPAB/SERVER/SVINFO quartet this side sends, either to
    /// initiate (outbound) or to answer once the peer's quartet has been
    /// verified (inbound).
    pub fn greeting(&self, password: &str) -> Vec<Message> {
        vec![
            Message::new(Command::ServerPass {
                password: password.to_string(),
                ts_version: TS_VERSION.to_string(),
                sid: self.local_sid.clone(),
            }),
            Message::new(Command::Capab(REQUIRED_CAPABS.iter().map(|s| s.to_string()).collect())),
            Message::new(Command::Server {
                name: self.local_name.clone(),
                hopcount: 1,
                description: self.local_description.clone(),
            }),
            Message::new(Command::Svinfo {
                ts_version: TS_VERSION,
                min_ts_version: TS_VERSION,
                current_time: now(),
            }),
        ]
    }

    /// Feed one inbound message. Returns `Ok(true)` once all four
    /// credentials have arrived and been verified against `peers` and the
    /// already-linked servers in `linked` (the caller is then responsible
    /// for sending a reply greeting if it hadn't already, and for
    /// transitioning into burst).
    pub fn step(&mut self, command: &Command, peers: &[PeerConfig], linked: &[RemoteServer]) -> Result<bool, HandshakeError> {
        if self.state == HandshakeState::Registered {
            return Ok(true);
        }
        match command {
            Command::ServerPass { password, ts_version, sid } => {
                if ts_version.parse::<u32>().unwrap_or(0) < TS_VERSION {
                    return Err(HandshakeError::ProtocolVersion);
                }
                self.remote_pass = Some(password.clone());
                self.remote_sid = Some(sid.clone());
            }
            Command::Capab(caps) => self.remote_capab = Some(caps.clone()),
            Command::Server { name, description, .. } => {
                self.remote_name = Some(name.clone());
                self.remote_description_check(description);
            }
            Command::Svinfo { ts_version, min_ts_version, current_time } => {
                if *ts_version < TS_VERSION || *min_ts_version > TS_VERSION {
                    return Err(HandshakeError::ProtocolVersion);
                }
                self.remote_svinfo = Some((*ts_version, *min_ts_version, *current_time));
            }
            other => return Err(HandshakeError::Unexpected(other.name())),
        }

        if self.remote_pass.is_none() || self.remote_name.is_none() || self.remote_sid.is_none() || self.remote_svinfo.is_none() || self.remote_capab.is_none() {
            return Ok(false);
        }

        self.verify(peers, linked)?;
        self.state = HandshakeState::Registered;
        Ok(true)
    }

    fn remote_description_check(&self, _description: &str) {
        // Description is informational only; not validated against config.
    }

    fn verify(&self, peers: &[PeerConfig], linked: &[RemoteServer]) -> Result<(), HandshakeError> {
        let name = self.remote_name.as_ref().expect("checked by caller");
        let pass = self.remote_pass.as_ref().expect("checked by caller");
        let sid = self.remote_sid.as_ref().expect("checked by caller");
        let capabs = self.remote_capab.as_ref().expect("checked by caller");

        let peer = peers
            .iter()
            .find(|p| &p.name == name || &p.sid == sid)
            .ok_or_else(|| HandshakeError::UnknownPeer(name.clone()))?;

        if &peer.password != pass {
            return Err(HandshakeError::BadPassword);
        }

        if let Some(already) = linked.iter().find(|s| &s.name == name || &s.sid == sid) {
            return Err(HandshakeError::Conflict(already.name.clone()));
        }

        let missing: Vec<String> = REQUIRED_CAPABS
            .iter()
            .filter(|required| !capabs.iter().any(|c| c == *required))
            .map(|s| s.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(HandshakeError::MissingCapabs(missing));
        }

        if let Some((_, _, their_time)) = self.remote_svinfo {
            let skew = (their_time - now()).abs();
            if skew > MAX_CLOCK_SKEW_SECS {
                tracing::warn!(peer = %name, skew_secs = skew, "large clock skew with linked peer");
            }
        }

        Ok(())
    }

    pub fn remote_sid(&self) -> Option<&str> {
        self.remote_sid.as_deref()
    }

    pub fn remote_name(&self) -> Option<&str> {
        self.remote_name.as_deref()
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer() -> PeerConfig {
        PeerConfig {
            name: "leaf.example.com".to_string(),
            sid: "002".to_string(),
            host: "127.0.0.1".to_string(),
            port: 6668,
            password: "shared-secret".to_string(),
            auto_connect: false,
            is_hub: false,
        }
    }

    fn full_capabs() -> Vec<String> {
        REQUIRED_CAPABS.iter().map(|s| s.to_string()).collect()
    }

    fn feed(machine: &mut HandshakeMachine, peers: &[PeerConfig]) -> Result<bool, HandshakeError> {
        feed_linked(machine, peers, &[])
    }

    fn feed_linked(machine: &mut HandshakeMachine, peers: &[PeerConfig], linked: &[RemoteServer]) -> Result<bool, HandshakeError> {
        let mut last = Ok(false);
        for cmd in [
            Command::ServerPass { password: "shared-secret".to_string(), ts_version: "6".to_string(), sid: "002".to_string() },
            Command::Capab(full_capabs()),
            Command::Server { name: "leaf.example.com".to_string(), hopcount: 1, description: "leaf".to_string() },
            Command::Svinfo { ts_version: 6, min_ts_version: 6, current_time: now() },
        ] {
            last = machine.step(&cmd, peers, linked);
        }
        last
    }

    #[test]
    fn completes_on_valid_quartet() {
        let mut machine = HandshakeMachine::new("001", "hub.example.com", "hub");
        let peers = vec![peer()];
        assert_eq!(feed(&mut machine, &peers), Ok(true));
        assert_eq!(machine.state(), HandshakeState::Registered);
        assert_eq!(machine.remote_sid(), Some("002"));
    }

    #[test]
    fn rejects_wrong_password() {
        let mut machine = HandshakeMachine::new("001", "hub.example.com", "hub");
        let peers = vec![peer()];
        machine.step(&Command::ServerPass { password: "wrong".to_string(), ts_version: "6".to_string(), sid: "002".to_string() }, &peers, &[]).unwrap();
        machine.step(&Command::Capab(full_capabs()), &peers, &[]).unwrap();
        machine.step(&Command::Server { name: "leaf.example.com".to_string(), hopcount: 1, description: String::new() }, &peers, &[]).unwrap();
        let result = machine.step(&Command::Svinfo { ts_version: 6, min_ts_version: 6, current_time: now() }, &peers, &[]);
        assert_eq!(result, Err(HandshakeError::BadPassword));
    }

    #[test]
    fn rejects_unsupported_ts_version() {
        let mut machine = HandshakeMachine::new("001", "hub.example.com", "hub");
        let result = machine.step(&Command::ServerPass { password: "x".to_string(), ts_version: "5".to_string(), sid: "002".to_string() }, &[], &[]);
        assert_eq!(result, Err(HandshakeError::ProtocolVersion));
    }

    #[test]
    fn rejects_incomplete_capabs() {
        let mut machine = HandshakeMachine::new("001", "hub.example.com", "hub");
        let peers = vec![peer()];
        machine.step(&Command::ServerPass { password: "shared-secret".to_string(), ts_version: "6".to_string(), sid: "002".to_string() }, &peers, &[]).unwrap();
        machine.step(&Command::Capab(vec!["QS".to_string(), "EX".to_string()]), &peers, &[]).unwrap();
        machine.step(&Command::Server { name: "leaf.example.com".to_string(), hopcount: 1, description: String::new() }, &peers, &[]).unwrap();
        let result = machine.step(&Command::Svinfo { ts_version: 6, min_ts_version: 6, current_time: now() }, &peers, &[]);
        assert!(matches!(result, Err(HandshakeError::MissingCapabs(_))));
    }

    #[test]
    fn rejects_already_linked_server() {
        let mut machine = HandshakeMachine::new("001", "hub.example.com", "hub");
        let peers = vec![peer()];
        let linked = vec![RemoteServer {
            sid: "002".to_string(),
            name: "leaf.example.com".to_string(),
            description: String::new(),
            hop_count: 1,
            uplink_sid: "001".to_string(),
        }];
        let result = feed_linked(&mut machine, &peers, &linked);
        assert_eq!(result, Err(HandshakeError::Conflict("leaf.example.com".to_string())));
    }
}
