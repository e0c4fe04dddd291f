//! Active server-to-server links, indexed by SID (spec §4.J "router").

use dashmap::DashMap;
use irc_proto::Message;
use std::sync::Arc;
use tokio::sync::mpsc;

/// One linked peer's write side. Read side lives in the per-link task.
pub struct PeerLink {
    pub sid: String,
    pub name: String,
    tx: mpsc::Sender<Message>,
}

impl PeerLink {
    pub fn new(sid: String, name: String, tx: mpsc::Sender<Message>) -> Self {
        PeerLink { sid, name, tx }
    }

    /// Enqueue a message for this peer. Returns `false` if the link's queue
    /// is full, mirroring `Session::enqueue`.
    pub fn send(&self, message: Message) -> bool {
        self.tx.try_send(message).is_ok()
    }
}

/// The set of currently-linked peers (spec §4.G "network view").
pub struct LinkRegistry {
    links: DashMap<String, Arc<PeerLink>>,
}

impl LinkRegistry {
    pub fn new() -> Self {
        LinkRegistry { links: DashMap::new() }
    }

    pub fn add(&self, link: Arc<PeerLink>) {
        self.links.insert(link.sid.clone(), link);
    }

    pub fn remove(&self, sid: &str) -> Option<Arc<PeerLink>> {
        self.links.remove(sid).map(|(_, link)| link)
    }

    pub fn get(&self, sid: &str) -> Option<Arc<PeerLink>> {
        self.links.get(sid).map(|e| e.value().clone())
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn sids(&self) -> Vec<String> {
        self.links.iter().map(|e| e.key().clone()).collect()
    }

    /// Send to every linked peer except `exclude_sid` (spec §4.J: "messages
    /// arriving from a peer must not be echoed back to the same peer").
    pub fn broadcast(&self, message: Message, exclude_sid: Option<&str>) {
        for entry in self.links.iter() {
            if Some(entry.key().as_str()) == exclude_sid {
                continue;
            }
            entry.value().send(message.clone());
        }
    }
}

impl Default for LinkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_excludes_origin_peer() {
        let registry = LinkRegistry::new();
        let (tx_a, mut rx_a) = mpsc::channel(4);
        let (tx_b, mut rx_b) = mpsc::channel(4);
        registry.add(Arc::new(PeerLink::new("002".to_string(), "leaf-a".to_string(), tx_a)));
        registry.add(Arc::new(PeerLink::new("003".to_string(), "leaf-b".to_string(), tx_b)));

        registry.broadcast(Message::new(irc_proto::Command::Ping("x".to_string())), Some("002"));

        assert!(rx_a.try_recv().is_err());
        assert!(rx_b.try_recv().is_ok());
    }
}
