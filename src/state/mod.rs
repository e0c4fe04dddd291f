//! Process-wide state: sessions, channels, and the linked network (spec §3, §9).

pub mod channel;
pub mod channel_registry;
pub mod client_registry;
pub mod link_registry;
pub mod network;
pub mod session;
pub mod uid;

pub use channel::{Channel, ChannelModes, MemberFlags, Topic};
pub use channel_registry::{ChannelRegistry, MergeOutcome};
pub use client_registry::{ClientRegistry, RenameError};
pub use link_registry::{LinkRegistry, PeerLink};
pub use network::{CollisionOutcome, NetworkState, RemoteServer, RemoteUser};
pub use session::{DisconnectReason, Identity, RegistrationState, Session};
pub use uid::UidGenerator;

use crate::config::Config;

/// The single process-wide handle owning every registry, constructed once at
/// startup and passed into every handler and connection task (spec §9:
/// "a single process-wide value owns all registries").
pub struct ServerCore {
    pub config: Config,
    pub clients: ClientRegistry,
    pub channels: ChannelRegistry,
    pub network: NetworkState,
    pub links: LinkRegistry,
}

impl ServerCore {
    pub fn new(config: Config) -> Self {
        let sid = config.sid().to_string();
        ServerCore {
            config,
            clients: ClientRegistry::new(),
            channels: ChannelRegistry::new(),
            network: NetworkState::new(sid),
            links: LinkRegistry::new(),
        }
    }
}
