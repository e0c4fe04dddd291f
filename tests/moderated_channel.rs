//! Scenario: a moderated channel rejects PRIVMSG from an unvoiced member,
//! then accepts it once voiced.

mod common;

use common::client::is_numeric;
use irc_proto::{Command, Response};
use std::time::Duration;

async fn drain_until_join(client: &mut common::TestClient, channel: &str) {
    client
        .recv_until(|msg| matches!(&msg.command, Command::Join(chans, _) if chans.contains(&channel.to_string())))
        .await
        .expect("join echo");
}

#[tokio::test]
async fn moderated_channel_gates_speech_on_voice() {
    let server = common::TestServer::spawn(16702).await.expect("server starts");

    let mut alice = server.connect("alice").await.expect("connect alice");
    alice.register().await.expect("alice registers");
    alice.join("#m").await.expect("alice joins");
    drain_until_join(&mut alice, "#m").await;
    alice.recv().await.expect("notopic"); // RPL_NOTOPIC
    alice.recv().await.expect("names");
    alice.recv().await.expect("endofnames");

    alice.mode("#m", &["+m"]).await.expect("mode sent");
    let mode_echo = alice.recv().await.expect("mode echo");
    assert!(matches!(&mode_echo.command, Command::Mode(chan, _) if chan == "#m"));

    let mut bob = server.connect("bob").await.expect("connect bob");
    bob.register().await.expect("bob registers");
    bob.join("#m").await.expect("bob joins");
    drain_until_join(&mut bob, "#m").await;
    bob.recv().await.expect("bob's own notopic");
    bob.recv().await.expect("bob's own names");
    bob.recv().await.expect("bob's own endofnames");

    // Alice sees Bob's JOIN.
    alice.recv().await.expect("alice sees bob join");

    bob.privmsg("#m", "hi").await.expect("privmsg sent");
    let reply = bob.recv().await.expect("404 expected");
    assert!(is_numeric(&reply, Response::ERR_CANNOTSENDTOCHAN));

    alice.mode("#m", &["+v", "bob"]).await.expect("voice sent");
    let voice_echo = alice.recv().await.expect("voice echo");
    assert!(matches!(&voice_echo.command, Command::Mode(chan, args) if chan == "#m" && args.iter().any(|a| a.contains('v'))));
    bob.recv_timeout(Duration::from_secs(5)).await.expect("bob sees mode");

    bob.privmsg("#m", "hi").await.expect("privmsg sent again");
    let delivered = alice.recv().await.expect("alice receives privmsg");
    match &delivered.command {
        Command::Privmsg(target, text) => {
            assert_eq!(target, "#m");
            assert_eq!(text, "hi");
        }
        other => panic!("expected PRIVMSG, got {other:?}"),
    }
    assert_eq!(delivered.source_nick(), Some("bob"));
}
