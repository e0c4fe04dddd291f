//! Scenario: KICK from a non-operator is rejected with 482.

mod common;

use common::client::is_numeric;
use irc_proto::{Command, Response};

async fn drain_join_burst(client: &mut common::TestClient, channel: &str) {
    client
        .recv_until(|msg| matches!(&msg.command, Command::Join(chans, _) if chans.contains(&channel.to_string())))
        .await
        .expect("join echo");
    client.recv().await.expect("notopic");
    client.recv().await.expect("names");
    client.recv().await.expect("endofnames");
}

#[tokio::test]
async fn non_operator_kick_is_rejected() {
    let server = common::TestServer::spawn(16704).await.expect("server starts");

    let mut alice = server.connect("alice").await.expect("connect alice");
    alice.register().await.expect("alice registers");
    alice.join("#test").await.expect("alice joins");
    drain_join_burst(&mut alice, "#test").await;

    let mut bob = server.connect("bob").await.expect("connect bob");
    bob.register().await.expect("bob registers");
    bob.join("#test").await.expect("bob joins");
    drain_join_burst(&mut bob, "#test").await;
    alice.recv().await.expect("alice sees bob join");

    bob.kick("#test", "alice", Some("bye")).await.expect("kick sent");
    let rejection = bob.recv().await.expect("482 expected");
    assert!(is_numeric(&rejection, Response::ERR_CHANOPRIVSNEEDED));
}
