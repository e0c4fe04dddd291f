//! Process-wide view of the linked network (spec §3 "Network view", §4.G).

use super::session::Session;
use super::uid::UidGenerator;
use dashmap::DashMap;
use irc_proto::casemap::casefold;
use std::sync::Arc;

/// A server directly or transitively linked to this one.
#[derive(Debug, Clone)]
pub struct RemoteServer {
    pub sid: String,
    pub name: String,
    pub description: String,
    pub hop_count: u32,
    /// SID of the peer this server is reachable through.
    pub uplink_sid: String,
}

/// A user owned by a remote server.
#[derive(Debug, Clone)]
pub struct RemoteUser {
    pub uid: String,
    pub nick: String,
    pub username: String,
    pub host: String,
    pub ip: String,
    pub realname: String,
    pub modes: String,
    pub server_sid: String,
    pub introduced_at: i64,
}

/// Outcome of resolving a nick collision during introduction (spec §4.G).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionOutcome {
    /// No prior holder of the nick; introduction proceeds normally.
    NoCollision,
    /// The existing holder keeps the nick; the new arrival must be renamed.
    IncomingLoses,
    /// The existing holder loses the nick and must be renamed.
    ExistingLoses,
}

/// Process-wide network state: servers, remote users, and the global nick
/// index spanning local and remote users alike.
pub struct NetworkState {
    pub local_sid: String,
    pub uid_gen: UidGenerator,
    servers: DashMap<String, RemoteServer>,
    remote_users: DashMap<String, RemoteUser>,
    local_uids: DashMap<String, Arc<Session>>,
    /// case-folded nick → UID, for every registered user on the network.
    nick_index: DashMap<String, String>,
}

impl NetworkState {
    pub fn new(local_sid: impl Into<String>) -> Self {
        let local_sid = local_sid.into();
        NetworkState {
            uid_gen: UidGenerator::new(local_sid.clone()),
            local_sid,
            servers: DashMap::new(),
            remote_users: DashMap::new(),
            local_uids: DashMap::new(),
            nick_index: DashMap::new(),
        }
    }

    /// Decide how a nick collision at introduction time should resolve, per
    /// the rule "lower introduction timestamp wins; ties go to the lower
    /// (lexicographically) UID" (spec §4.G).
    pub fn resolve_collision(&self, existing_ts: i64, existing_uid: &str, incoming_ts: i64, incoming_uid: &str) -> CollisionOutcome {
        match incoming_ts.cmp(&existing_ts) {
            std::cmp::Ordering::Less => CollisionOutcome::ExistingLoses,
            std::cmp::Ordering::Greater => CollisionOutcome::IncomingLoses,
            std::cmp::Ordering::Equal => {
                if incoming_uid < existing_uid {
                    CollisionOutcome::ExistingLoses
                } else {
                    CollisionOutcome::IncomingLoses
                }
            }
        }
    }

    pub fn uid_for_nick(&self, nick: &str) -> Option<String> {
        self.nick_index.get(&casefold(nick)).map(|e| e.value().clone())
    }

    pub fn nick_of(&self, uid: &str) -> Option<String> {
        if let Some(session) = self.local_uids.get(uid) {
            return session.value().nick();
        }
        self.remote_users.get(uid).map(|e| e.value().nick.clone())
    }

    pub fn is_local(&self, uid: &str) -> bool {
        self.local_uids.contains_key(uid)
    }

    pub fn local_session(&self, uid: &str) -> Option<Arc<Session>> {
        self.local_uids.get(uid).map(|e| e.value().clone())
    }

    /// Every locally-registered UID, for burst generation (spec §4.I).
    pub fn local_uids_snapshot(&self) -> Vec<String> {
        self.local_uids.iter().map(|e| e.key().clone()).collect()
    }

    pub fn remote_user(&self, uid: &str) -> Option<RemoteUser> {
        self.remote_users.get(uid).map(|e| e.value().clone())
    }

    /// Register a newly-introduced local user. Caller must already have
    /// resolved any nick collision.
    pub fn introduce_local(&self, nick: &str, uid: String, session: Arc<Session>) {
        self.nick_index.insert(casefold(nick), uid.clone());
        self.local_uids.insert(uid, session);
    }

    pub fn introduce_remote(&self, user: RemoteUser) {
        self.nick_index.insert(casefold(&user.nick), user.uid.clone());
        self.remote_users.insert(user.uid.clone(), user);
    }

    /// Remove a user (local or remote) from every index.
    pub fn remove_user(&self, uid: &str) {
        if let Some((_, session)) = self.local_uids.remove(uid) {
            if let Some(nick) = session.nick() {
                self.nick_index.remove_if(&casefold(&nick), |_, held| held == uid);
            }
        } else if let Some((_, user)) = self.remote_users.remove(uid) {
            self.nick_index.remove_if(&casefold(&user.nick), |_, held| held == uid);
        }
    }

    /// Rename a user already present in the indices.
    pub fn rename_user(&self, uid: &str, old_nick: &str, new_nick: &str) {
        self.nick_index.remove_if(&casefold(old_nick), |_, held| held == uid);
        self.nick_index.insert(casefold(new_nick), uid.to_string());
        if let Some(mut user) = self.remote_users.get_mut(uid) {
            user.nick = new_nick.to_string();
        }
    }

    pub fn add_server(&self, server: RemoteServer) {
        self.servers.insert(server.sid.clone(), server);
    }

    pub fn server(&self, sid: &str) -> Option<RemoteServer> {
        self.servers.get(sid).map(|e| e.value().clone())
    }

    pub fn servers(&self) -> Vec<RemoteServer> {
        self.servers.iter().map(|e| e.value().clone()).collect()
    }

    /// Remove a server and every user it introduced (spec §4.G
    /// `RemoveServer`: "cascade-removes all users on that server"). Returns
    /// the (uid, nick) of every removed user so the caller can fire
    /// synthetic QUITs naming the user that left.
    pub fn remove_server(&self, sid: &str) -> Vec<(String, String)> {
        self.servers.remove(sid);
        let orphaned: Vec<(String, String)> = self
            .remote_users
            .iter()
            .filter(|e| e.value().server_sid == sid)
            .map(|e| (e.key().clone(), e.value().nick.clone()))
            .collect();
        for (uid, _) in &orphaned {
            self.remove_user(uid);
        }
        orphaned
    }
}
