//! TCP accept loop: client connections and inbound server links share one
//! listener, distinguished by the first decoded line (spec §4.A "Listener",
//! §4.H "Link codec + handshake").

use super::connection;
use crate::state::ServerCore;
use futures_util::StreamExt;
use irc_proto::{Command, LineCodec};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::codec::Framed;
use tracing::{error, info, warn};

pub struct Gateway {
    listener: TcpListener,
    core: Arc<ServerCore>,
    shutdown: tokio::sync::broadcast::Sender<()>,
}

impl Gateway {
    pub async fn bind(addr: &str, core: Arc<ServerCore>, shutdown: tokio::sync::broadcast::Sender<()>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %addr, "listening for connections");
        Ok(Gateway { listener, core, shutdown })
    }

    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    if let Err(err) = stream.set_nodelay(true) {
                        warn!(error = %err, "failed to set TCP_NODELAY");
                    }
                    let core = self.core.clone();
                    let shutdown_rx = self.shutdown.subscribe();
                    tokio::spawn(async move {
                        let mut framed = Framed::new(stream, LineCodec::new());
                        match framed.next().await {
                            Some(Ok(message)) => {
                                if matches!(message.command, Command::ServerPass { .. }) {
                                    if !core.config.linking.enabled {
                                        warn!(addr = %addr, "rejected inbound link: linking disabled");
                                        return;
                                    }
                                    crate::sync::connection::handle_inbound(core, framed, message).await;
                                } else {
                                    connection::handle_client(core, framed, addr, Some(message), shutdown_rx).await;
                                }
                            }
                            Some(Err(err)) => {
                                warn!(error = %err, addr = %addr, "read error before registration");
                            }
                            None => {}
                        }
                    });
                }
                Err(err) => {
                    error!(error = %err, "accept failed");
                }
            }
        }
    }
}
