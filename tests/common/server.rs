//! Test server management.
//!
//! Spawns and manages `tidalnetd` instances for integration testing.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Child, Command};
use std::time::Duration;
use tokio::time::sleep;

/// A test server instance.
pub struct TestServer {
    child: Child,
    port: u16,
    data_dir: PathBuf,
}

impl TestServer {
    /// Spawn a new test server listening on `port`, with no peers linked.
    pub async fn spawn(port: u16) -> anyhow::Result<Self> {
        Self::spawn_with_peers(port, "00A", &[]).await
    }

    /// Spawn a new test server with a given SID and a list of configured
    /// peers (for link-handshake scenarios).
    pub async fn spawn_with_peers(port: u16, sid: &str, peers: &[PeerSpec]) -> anyhow::Result<Self> {
        let data_dir = std::env::temp_dir().join(format!("tidalnetd-test-{port}"));
        std::fs::create_dir_all(&data_dir)?;

        let config_path = data_dir.join("config.toml");
        let mut config = format!(
            r#"
[server]
name = "irc.example.com"
sid = "{sid}"
listen = "127.0.0.1:{port}"
timeout_seconds = 5
ping_interval_seconds = 2

[rate_limit]
messages_per_second = 1000
burst = 1000
"#
        );

        if !peers.is_empty() {
            config.push_str("\n[linking]\nenabled = true\npassword = \"link-secret\"\n\n");
            for peer in peers {
                config.push_str(&format!(
                    "[[linking.peers]]\nname = \"{}\"\nsid = \"{}\"\nhost = \"127.0.0.1\"\nport = {}\npassword = \"link-secret\"\nauto_connect = {}\n\n",
                    peer.name, peer.sid, peer.port, peer.auto_connect
                ));
            }
        }

        std::fs::write(&config_path, config)?;

        let cargo_manifest_dir = env!("CARGO_MANIFEST_DIR");
        let binary_path = PathBuf::from(cargo_manifest_dir).join("target/debug/tidalnetd");

        let child = Command::new(&binary_path).arg(&config_path).spawn()?;

        let server = Self { child, port, data_dir };
        server.wait_until_ready().await?;
        Ok(server)
    }

    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..50 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port)).await.is_ok() {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("server on port {} failed to start within 5 seconds", self.port)
    }

    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    pub async fn connect(&self, nick: &str) -> anyhow::Result<super::client::TestClient> {
        super::client::TestClient::connect(&self.address(), nick).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_dir_all(&self.data_dir);
    }
}

/// A configured link peer, for spawning servers with linking enabled.
pub struct PeerSpec {
    pub name: String,
    pub sid: String,
    pub port: u16,
    pub auto_connect: bool,
}
