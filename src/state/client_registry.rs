//! Local nick registry: case-folded nick → session (spec §4.D).

use super::session::Session;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use irc_proto::casemap::casefold;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameError {
    NickInUse,
    NotHeld,
}

/// Process-wide map of case-folded nick → session, for local clients only.
#[derive(Default)]
pub struct ClientRegistry {
    by_nick: DashMap<String, Arc<Session>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `nick` for `session`. Refused if the nick is already held.
    pub fn add(&self, nick: &str, session: Arc<Session>) -> Result<(), ()> {
        match self.by_nick.entry(casefold(nick)) {
            Entry::Occupied(_) => Err(()),
            Entry::Vacant(v) => {
                v.insert(session);
                Ok(())
            }
        }
    }

    /// Idempotent removal.
    pub fn remove(&self, nick: &str) {
        self.by_nick.remove(&casefold(nick));
    }

    /// Atomic compare-and-set rename: fails if `new` is taken or if `old`'s
    /// current holder isn't `session`.
    pub fn rename(&self, old: &str, new: &str, session: &Arc<Session>) -> Result<(), RenameError> {
        let new_cf = casefold(new);
        let old_cf = casefold(old);
        if old_cf == new_cf {
            return Ok(());
        }
        if self.by_nick.contains_key(&new_cf) {
            return Err(RenameError::NickInUse);
        }
        match self.by_nick.remove_if(&old_cf, |_, held| Arc::ptr_eq(held, session)) {
            Some(_) => {
                self.by_nick.insert(new_cf, session.clone());
                Ok(())
            }
            None => Err(RenameError::NotHeld),
        }
    }

    pub fn get(&self, nick: &str) -> Option<Arc<Session>> {
        self.by_nick.get(&casefold(nick)).map(|e| e.value().clone())
    }

    pub fn contains(&self, nick: &str) -> bool {
        self.by_nick.contains_key(&casefold(nick))
    }

    pub fn len(&self) -> usize {
        self.by_nick.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_nick.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn session() -> Arc<Session> {
        let (tx, _rx) = mpsc::channel(4);
        Arc::new(Session::new("127.0.0.1:6667".parse().unwrap(), "localhost".to_string(), 0, tx))
    }

    #[test]
    fn add_refuses_duplicate_case_folded_nick() {
        let registry = ClientRegistry::new();
        registry.add("Alice", session()).unwrap();
        assert!(registry.add("alice", session()).is_err());
        assert!(registry.add("ALICE", session()).is_err());
    }

    #[test]
    fn remove_is_idempotent() {
        let registry = ClientRegistry::new();
        registry.remove("ghost");
        registry.add("bob", session()).unwrap();
        registry.remove("bob");
        registry.remove("bob");
        assert!(registry.is_empty());
    }

    #[test]
    fn rename_fails_if_target_taken() {
        let registry = ClientRegistry::new();
        let alice = session();
        let bob = session();
        registry.add("alice", alice.clone()).unwrap();
        registry.add("bob", bob).unwrap();
        assert_eq!(registry.rename("alice", "bob", &alice), Err(RenameError::NickInUse));
    }

    #[test]
    fn rename_moves_the_held_nick() {
        let registry = ClientRegistry::new();
        let alice = session();
        registry.add("alice", alice.clone()).unwrap();
        registry.rename("alice", "alice2", &alice).unwrap();
        assert!(!registry.contains("alice"));
        assert!(registry.contains("alice2"));
    }
}
