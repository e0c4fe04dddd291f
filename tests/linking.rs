//! Scenarios 6-8: cross-server JOIN visibility, nick collision at link
//! time, and netsplit/rejoin, over a two-server hub/leaf link.

mod common;

use common::server::PeerSpec;
use common::TestServer;
use irc_proto::{Command, Response};
use std::time::Duration;
use tokio::time::sleep;

async fn link_hub_and_leaf(hub_port: u16, leaf_port: u16) -> (TestServer, TestServer) {
    let hub = TestServer::spawn_with_peers(
        hub_port,
        "001",
        &[PeerSpec { name: "leaf.example.com".to_string(), sid: "002".to_string(), port: leaf_port, auto_connect: false }],
    )
    .await
    .expect("hub starts");

    let leaf = TestServer::spawn_with_peers(
        leaf_port,
        "002",
        &[PeerSpec { name: "irc.example.com".to_string(), sid: "001".to_string(), port: hub_port, auto_connect: true }],
    )
    .await
    .expect("leaf starts");

    // Give the leaf's outbound dialer time to connect, handshake, and burst.
    sleep(Duration::from_millis(500)).await;
    (hub, leaf)
}

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
async fn cross_server_join_is_visible_both_ways() {
    let (hub, leaf) = link_hub_and_leaf(16720, 16721).await;

    let mut alice = hub.connect("alice").await.expect("connect alice");
    alice.register().await.expect("alice registers");
    alice.join("#x").await.expect("alice joins");
    drain_join_burst(&mut alice, "#x").await;

    let mut bob = leaf.connect("bob").await.expect("connect bob");
    bob.register().await.expect("bob registers");
    bob.join("#x").await.expect("bob joins");

    let bob_join = bob.recv().await.expect("bob's own join echo");
    assert!(matches!(&bob_join.command, Command::Join(chans, _) if chans == &vec!["#x".to_string()]));
    bob.recv().await.expect("notopic");
    let names = bob.recv().await.expect("names reply");
    if let Command::Response(r, args) = &names.command {
        assert_eq!(*r, Response::RPL_NAMREPLY);
        let list = args.last().unwrap();
        assert!(list.contains("alice"), "names should include alice: {list}");
        assert!(list.contains("bob"), "names should include bob: {list}");
    } else {
        panic!("expected RPL_NAMREPLY");
    }
    bob.recv().await.expect("endofnames");

    // Alice sees bob's JOIN arrive over the link.
    let alice_sees_join = alice.recv().await.expect("alice sees bob's join");
    assert_eq!(alice_sees_join.source_nick(), Some("bob"));

    bob.privmsg("#x", "hello").await.expect("privmsg sent");
    let delivered = alice.recv().await.expect("alice receives cross-server privmsg");
    match &delivered.command {
        Command::Privmsg(target, text) => {
            assert_eq!(target, "#x");
            assert_eq!(text, "hello");
        }
        other => panic!("expected PRIVMSG, got {other:?}"),
    }
    assert_eq!(delivered.source_nick(), Some("bob"));
}

#[tokio::test]
async fn nick_collision_renames_the_later_ts() {
    // Hub's `alice` registers, and is bursted to the leaf, before the leaf
    // ever dials out. The leaf is then started with an auto-connect dialer
    // and its own independently-registered `alice` is guaranteed a later
    // connection TS (it can't even start registering before the hub
    // process above has already completed its own). Nick uniqueness at
    // registration time is checked only against the local client registry,
    // so the leaf's own `alice` registers locally without a hitch; the
    // collision is resolved once her UID reaches the hub over the link.
    let hub = TestServer::spawn_with_peers(
        16722,
        "001",
        &[PeerSpec { name: "leaf.example.com".to_string(), sid: "002".to_string(), port: 16723, auto_connect: false }],
    )
    .await
    .expect("hub starts");

    let mut hub_alice = hub.connect("alice").await.expect("connect alice on hub");
    hub_alice.register().await.expect("alice registers on hub");
    hub_alice.join("#dup").await.expect("hub alice joins");
    drain_join_burst(&mut hub_alice, "#dup").await;

    let leaf = TestServer::spawn_with_peers(
        16723,
        "002",
        &[PeerSpec { name: "irc.example.com".to_string(), sid: "001".to_string(), port: 16722, auto_connect: true }],
    )
    .await
    .expect("leaf starts");
    sleep(Duration::from_millis(500)).await;

    let mut leaf_alice = leaf.connect("alice").await.expect("connect alice on leaf");
    leaf_alice.register().await.expect("leaf alice registers locally, same nick");

    // Give the leaf's UID propagation time to reach the hub and resolve.
    sleep(Duration::from_millis(300)).await;

    leaf_alice.join("#dup").await.expect("leaf alice joins the shared channel");

    // The hub applies the remote JOIN and rebroadcasts it to hub_alice
    // under whatever nick its own network view now has for that UID — the
    // later-TS `alice` loses the collision and was renamed to a guest nick
    // (spec §4.G `ResolveCollision`, §8 scenario 7) before this JOIN ever
    // arrived, so hub_alice must never see a second "alice" join.
    let cross_join = hub_alice.recv_timeout(Duration::from_secs(5)).await.expect("hub sees the leaf join arrive");
    let joined_nick = cross_join.source_nick().expect("join carries a source nick");
    assert_ne!(joined_nick, "alice", "the later-TS alice must not keep the contested nick");
    assert!(joined_nick.starts_with("alice_"), "loser renamed to a guest nick, got {joined_nick}");

    drop(leaf);
}

#[tokio::test]
async fn netsplit_removes_remote_users_and_rejoin_restores_them() {
    let (hub, leaf) = link_hub_and_leaf(16724, 16725).await;

    let mut alice = hub.connect("alice").await.expect("connect alice");
    alice.register().await.expect("alice registers");
    alice.join("#split").await.expect("alice joins");
    drain_join_burst(&mut alice, "#split").await;

    let mut bob = leaf.connect("bob").await.expect("connect bob");
    bob.register().await.expect("bob registers");
    bob.join("#split").await.expect("bob joins");
    // Drain bob's own join burst and alice's view of it.
    bob.recv().await.expect("bob join echo");
    bob.recv().await.expect("bob notopic");
    bob.recv().await.expect("bob names");
    bob.recv().await.expect("bob endofnames");
    alice.recv().await.expect("alice sees bob join");

    // Drop the leaf: its outbound link dies, the hub detects it and
    // synthesizes a QUIT for every user the leaf had introduced.
    drop(leaf);

    let quit = alice.recv_timeout(Duration::from_secs(10)).await.expect("synthetic quit on netsplit");
    match &quit.command {
        Command::Quit(reason) => {
            assert_eq!(reason.as_deref(), Some("*.net *.split"));
        }
        other => panic!("expected QUIT after netsplit, got {other:?}"),
    }
    assert_eq!(quit.source_nick(), Some("bob"));
}
