//! Per-connection read/write loop: parse → rate-limit → dispatch, plus
//! keepalive and teardown (spec §4.C).

use crate::handlers;
use crate::security::rate_limit::{RateDecision, RateLimiter};
use crate::state::{DisconnectReason, ServerCore, Session};
use futures_util::{SinkExt, StreamExt};
use irc_proto::{Command, LineCodec, Message};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tracing::{info, warn};

/// Accept one client stream and run it to completion. Never panics; every
/// exit path (read error, write error, quit, kill, shutdown) converges on
/// [`teardown`].
///
/// `first` is a message already decoded by the gateway while it was
/// deciding this connection isn't a server link (spec §4.A).
pub async fn handle_client(core: Arc<ServerCore>, mut framed: Framed<TcpStream, LineCodec>, remote_addr: SocketAddr, first: Option<Message>, mut shutdown: tokio::sync::broadcast::Receiver<()>) {
    let host = remote_addr.ip().to_string();
    let (tx, mut rx) = mpsc::channel::<Message>(core.config.server.send_queue_len);
    let session = Arc::new(Session::new(remote_addr, host, chrono::Utc::now().timestamp(), tx));

    let mut rate_limiter = RateLimiter::new(&core.config.rate_limit);
    let ping_interval = Duration::from_secs(core.config.server.ping_interval_seconds);
    let timeout = Duration::from_secs(core.config.server.timeout_seconds);
    let mut ping_ticker = tokio::time::interval(ping_interval);
    ping_ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    if let Some(message) = first {
        session.touch();
        match handlers::dispatch(&core, &session, message).await {
            Ok(()) | Err(_) => {}
        }
    }

    let reason = loop {
        tokio::select! {
            _ = shutdown.recv() => {
                let _ = framed.send(&Message::new(Command::Error("Server shutting down".to_string()))).await;
                break DisconnectReason::ServerShutdown;
            }

            line = framed.next() => {
                match line {
                    Some(Ok(message)) => {
                        session.touch();
                        match rate_limiter.check() {
                            RateDecision::Allow => {}
                            RateDecision::Drop => continue,
                            RateDecision::Disconnect => break DisconnectReason::SendQueueOverflow,
                        }
                        match handlers::dispatch(&core, &session, message).await {
                            Ok(()) => {}
                            Err(crate::error::HandlerError::Quit(reason)) => {
                                break DisconnectReason::Quit(reason.unwrap_or_else(|| "Client Quit".to_string()));
                            }
                            Err(_) => {}
                        }
                    }
                    Some(Err(err)) => {
                        warn!(error = %err, addr = %remote_addr, "read error");
                        break DisconnectReason::ReadError;
                    }
                    None => break DisconnectReason::ReadError,
                }
            }

            outgoing = rx.recv() => {
                match outgoing {
                    Some(message) => {
                        if framed.send(&message).await.is_err() {
                            // One retry, per spec §4.C teardown policy.
                            if framed.send(&message).await.is_err() {
                                break DisconnectReason::ReadError;
                            }
                        }
                    }
                    None => break DisconnectReason::ServerShutdown,
                }
            }

            _ = ping_ticker.tick() => {
                let idle = session.last_activity.read().elapsed();
                if idle > timeout {
                    break DisconnectReason::PingTimeout;
                }
                if idle > ping_interval && !*session.ping_pending.read() {
                    *session.ping_pending.write() = true;
                    let ping = Message::new(Command::Ping(core.config.server.name.clone()));
                    if framed.send(&ping).await.is_err() {
                        break DisconnectReason::ReadError;
                    }
                }
            }
        }
    };

    teardown(&core, &session, reason).await;
}

/// Remove a session from every registry it might be in, notifying peers and
/// channel members. Idempotent by construction: each step is independently
/// a no-op if the session was never fully registered (spec §4.C, §8).
pub async fn teardown(core: &ServerCore, session: &Arc<Session>, reason: DisconnectReason) {
    let Some(nick) = session.nick() else {
        return;
    };

    let quit_msg = Message::with_prefix(session.hostmask(), Command::Quit(Some(reason.as_quit_text())));
    handlers::notify_shared_channel_members(core, session, quit_msg);

    if let Some(uid) = session.uid() {
        crate::sync::router::propagate(core, Message::with_prefix(uid, Command::Quit(Some(reason.as_quit_text()))));
    }

    for channel_name in session.joined_channels() {
        if let Some(channel) = core.channels.get(&channel_name) {
            if let Some(uid) = session.uid() {
                channel.write().remove_member(&uid);
            }
            core.channels.remove_if_empty(&channel_name);
        }
    }

    core.clients.remove(&nick);
    if let Some(uid) = session.uid() {
        core.network.remove_user(&uid);
    }

    info!(nick = %nick, reason = ?reason, "session torn down");
}
