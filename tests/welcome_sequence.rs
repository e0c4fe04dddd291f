//! Scenario: NICK + USER yields the 001-004 welcome burst, in order.

mod common;

use common::client::is_numeric;
use irc_proto::Response;

#[tokio::test]
async fn welcome_sequence_is_sent_in_order() {
    let server = common::TestServer::spawn(16700).await.expect("server starts");
    let mut client = server.connect("alice").await.expect("connect");

    let burst = client.register().await.expect("registers");

    let codes: Vec<u16> = burst
        .iter()
        .map(|m| match &m.command {
            irc_proto::Command::Response(r, _) => r.code(),
            other => panic!("unexpected command in welcome burst: {other:?}"),
        })
        .collect();

    assert_eq!(codes, vec![1, 2, 3, 4], "welcome burst order");
    assert!(is_numeric(&burst[0], Response::RPL_WELCOME));
    assert!(is_numeric(&burst[3], Response::RPL_MYINFO));
}
