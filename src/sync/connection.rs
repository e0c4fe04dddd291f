//! Per-link I/O: handshake, burst exchange, then steady-state event routing
//! (spec §4.H, §4.I, §4.J/§4.K).

use super::burst;
use super::handshake::{HandshakeMachine, HandshakeState};
use super::router;
use crate::config::PeerConfig;
use crate::state::{PeerLink, ServerCore};
use futures_util::{SinkExt, StreamExt};
use irc_proto::{Command, LineCodec, Message};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tracing::{error, info, warn};

/// Dial a configured peer and run the link until it drops.
pub async fn connect_outbound(core: Arc<ServerCore>, peer: PeerConfig) {
    let addr = format!("{}:{}", peer.host, peer.port);
    loop {
        match TcpStream::connect(&addr).await {
            Ok(stream) => {
                let framed = Framed::new(stream, LineCodec::new());
                run_link(core.clone(), framed, peer.clone()).await;
            }
            Err(err) => {
                warn!(peer = %peer.name, error = %err, "outbound link connect failed");
            }
        }
        if !peer.auto_connect {
            return;
        }
        tokio::time::sleep(Duration::from_secs(30)).await;
    }
}

/// Run one inbound link whose first line has already been decoded by the
/// gateway (used to distinguish a server link from a client connection).
pub async fn handle_inbound(core: Arc<ServerCore>, mut framed: Framed<TcpStream, LineCodec>, first: Message) {
    let peers = core.config.linking.peers.clone();
    let greeting_password = core.config.linking.password.clone().unwrap_or_default();
    let mut machine = HandshakeMachine::new(core.network.local_sid.clone(), core.config.server.name.clone(), core.config.linking.description.clone());

    for msg in machine.greeting(&greeting_password) {
        if framed.send(&msg).await.is_err() {
            return;
        }
    }

    let linked = core.network.servers();
    if machine.step(&first.command, &peers, &linked).is_err() {
        let _ = framed.send(&Message::new(Command::Error("handshake failed".to_string()))).await;
        return;
    }

    if !drive_handshake(&mut framed, &mut machine, &peers, &core.network).await {
        return;
    }

    complete_link(core, framed, machine).await;
}

async fn run_link(core: Arc<ServerCore>, mut framed: Framed<TcpStream, LineCodec>, peer: PeerConfig) {
    let mut machine = HandshakeMachine::new(core.network.local_sid.clone(), core.config.server.name.clone(), core.config.linking.description.clone());
    for msg in machine.greeting(&peer.password) {
        if framed.send(&msg).await.is_err() {
            return;
        }
    }

    let peers = core.config.linking.peers.clone();
    if !drive_handshake(&mut framed, &mut machine, &peers, &core.network).await {
        return;
    }

    complete_link(core, framed, machine).await;
}

/// Read lines until the handshake state machine reports completion.
async fn drive_handshake(
    framed: &mut Framed<TcpStream, LineCodec>,
    machine: &mut HandshakeMachine,
    peers: &[PeerConfig],
    network: &crate::state::NetworkState,
) -> bool {
    while machine.state() != HandshakeState::Registered {
        match framed.next().await {
            Some(Ok(msg)) => match machine.step(&msg.command, peers, &network.servers()) {
                Ok(_) => {}
                Err(err) => {
                    warn!(error = %err, "link handshake rejected");
                    let _ = framed.send(&Message::new(Command::Error(err.to_string()))).await;
                    return false;
                }
            },
            Some(Err(err)) => {
                warn!(error = %err, "link read error during handshake");
                return false;
            }
            None => return false,
        }
    }
    true
}

/// Handshake complete: exchange bursts, register the link, and run the
/// steady-state event loop until it drops.
async fn complete_link(core: Arc<ServerCore>, mut framed: Framed<TcpStream, LineCodec>, machine: HandshakeMachine) {
    let Some(remote_sid) = machine.remote_sid().map(|s| s.to_string()) else { return };
    let remote_name = machine.remote_name().unwrap_or(&remote_sid).to_string();

    for msg in burst::generate(&core) {
        if framed.send(&msg).await.is_err() {
            return;
        }
    }

    core.network.add_server(crate::state::RemoteServer {
        sid: remote_sid.clone(),
        name: remote_name.clone(),
        description: String::new(),
        hop_count: 1,
        uplink_sid: core.network.local_sid.clone(),
    });

    let mut our_eob_acked = false;
    let mut peer_eob_seen = false;
    while !(our_eob_acked && peer_eob_seen) {
        match framed.next().await {
            Some(Ok(msg)) => match &msg.command {
                Command::Ping(token) if *token == remote_sid => {
                    peer_eob_seen = true;
                    if framed.send(&Message::new(Command::Pong(token.clone()))).await.is_err() {
                        return;
                    }
                }
                Command::Pong(_) => our_eob_acked = true,
                _ => router::apply_remote(&core, &remote_sid, msg),
            },
            Some(Err(err)) => {
                warn!(peer = %remote_name, error = %err, "read error during burst");
                break;
            }
            None => break,
        }
    }

    info!(peer = %remote_name, sid = %remote_sid, "link synced");

    let (tx, mut rx) = mpsc::channel::<Message>(4096);
    core.links.add(Arc::new(PeerLink::new(remote_sid.clone(), remote_name.clone(), tx)));

    let mut ping_ticker = tokio::time::interval(Duration::from_secs(core.config.server.ping_interval_seconds));

    loop {
        tokio::select! {
            line = framed.next() => {
                match line {
                    Some(Ok(msg)) => router::apply_remote(&core, &remote_sid, msg),
                    Some(Err(err)) => {
                        warn!(peer = %remote_name, error = %err, "link read error");
                        break;
                    }
                    None => break,
                }
            }
            outgoing = rx.recv() => {
                match outgoing {
                    Some(msg) => {
                        if framed.send(&msg).await.is_err() {
                            if framed.send(&msg).await.is_err() {
                                break;
                            }
                        }
                    }
                    None => break,
                }
            }
            _ = ping_ticker.tick() => {
                if framed.send(&Message::new(Command::Ping(core.network.local_sid.clone()))).await.is_err() {
                    break;
                }
            }
        }
    }

    core.links.remove(&remote_sid);
    router::apply_squit(&core, &remote_sid);
    error!(peer = %remote_name, sid = %remote_sid, "link lost");
}
