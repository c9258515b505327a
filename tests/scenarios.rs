//! End-to-end protocol scenarios driven directly against `Server`, without a
//! real socket — each simulated client is just an `mpsc` channel pair.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use codec::message::{Bind, Connect, Knock};
use serde_json::Value;
use signaling_server::channel::{ChannelSignal, Tx};
use signaling_server::server::Server;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

struct Client {
    rx: UnboundedReceiver<ChannelSignal>,
    tx: Tx,
}

impl Client {
    fn new() -> Self {
        let (sender, rx) = unbounded_channel();
        Self { rx, tx: Tx(sender) }
    }

    fn alive() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(true))
    }

    fn drain(&mut self) -> Vec<Value> {
        let mut out = Vec::new();
        while let Ok(signal) = self.rx.try_recv() {
            if let ChannelSignal::Outbound(text) = signal {
                out.push(serde_json::from_str(&text).unwrap());
            }
        }
        out
    }
}

fn opcode(msg: &Value) -> u64 {
    msg["opcode"].as_u64().unwrap()
}

#[tokio::test]
async fn single_knock_acknowledges_only() {
    let server = Server::default();
    let mut k = Client::new();

    let id = server.knock(k.tx.clone(), Client::alive(), Knock { subnet: "127.0.0".into() });
    assert_eq!(id.as_deref(), Some("127.0.0.0"));

    let messages = k.drain();
    assert_eq!(messages.len(), 1);
    assert_eq!(opcode(&messages[0]), 1); // Acknowledgement
    assert_eq!(messages[0]["data"]["id"], "127.0.0.0");
    assert_eq!(messages[0]["data"]["rejected"], false);
}

#[tokio::test]
async fn second_client_greets_the_first_only() {
    let server = Server::default();
    let mut k1 = Client::new();
    let mut k2 = Client::new();

    server.knock(k1.tx.clone(), Client::alive(), Knock { subnet: "127.0.0".into() });
    k1.drain();

    let id2 = server.knock(k2.tx.clone(), Client::alive(), Knock { subnet: "127.0.0".into() });
    assert_eq!(id2.as_deref(), Some("127.0.0.1"));

    let k2_messages = k2.drain();
    assert_eq!(k2_messages.len(), 1);
    assert_eq!(opcode(&k2_messages[0]), 1);

    let k1_messages = k1.drain();
    assert_eq!(k1_messages.len(), 1);
    assert_eq!(opcode(&k1_messages[0]), 2); // Greeting
    assert_eq!(k1_messages[0]["data"]["offererId"], "127.0.0.0");
    assert_eq!(k1_messages[0]["data"]["answererId"], "127.0.0.1");
}

#[tokio::test]
async fn bind_then_shutdown_broadcasts_to_both() {
    let server = Server::default();
    let mut k1 = Client::new();
    let mut k2 = Client::new();

    server.knock(k1.tx.clone(), Client::alive(), Knock { subnet: "127.0.0".into() });
    server.knock(k2.tx.clone(), Client::alive(), Knock { subnet: "127.0.0".into() });
    k1.drain();
    k2.drain();

    server.bind(Bind { id: "127.0.0.0".into(), alias: "127.0.0.0:0".into() });

    for client in [&mut k1, &mut k2] {
        let messages = client.drain();
        assert_eq!(messages.len(), 1);
        assert_eq!(opcode(&messages[0]), 7); // Alias
        assert_eq!(messages[0]["data"]["set"], true);
    }

    server.shutdown(codec::message::Shutdown { id: "127.0.0.0".into(), alias: "127.0.0.0:0".into() });

    for client in [&mut k1, &mut k2] {
        let messages = client.drain();
        assert_eq!(messages.len(), 1);
        assert_eq!(opcode(&messages[0]), 7);
        assert_eq!(messages[0]["data"]["set"], false);
    }
}

#[tokio::test]
async fn connect_to_non_accepting_alias_rejects_silently_to_initiator() {
    let server = Server::default();
    let mut k1 = Client::new();
    let mut k2 = Client::new();

    server.knock(k1.tx.clone(), Client::alive(), Knock { subnet: "127.0.0".into() });
    server.knock(k2.tx.clone(), Client::alive(), Knock { subnet: "127.0.0".into() });
    k1.drain();
    k2.drain();

    server.bind(Bind { id: "127.0.0.0".into(), alias: "127.0.0.0:0".into() });
    k1.drain();
    k2.drain();

    server.connect(Connect {
        id: "127.0.0.1".into(),
        remote_alias: "127.0.0.0:0".into(),
        client_connection_id: "c1".into(),
    });

    let k2_messages = k2.drain();
    assert_eq!(k2_messages.len(), 1);
    assert_eq!(opcode(&k2_messages[0]), 7);
    assert_eq!(k2_messages[0]["data"]["set"], false);
    assert_eq!(k2_messages[0]["data"]["clientConnectionId"], "c1");

    assert!(k1.drain().is_empty());
}

#[tokio::test]
async fn full_connect_handshake_after_accepting() {
    let server = Server::default();
    let mut k1 = Client::new();
    let mut k2 = Client::new();

    server.knock(k1.tx.clone(), Client::alive(), Knock { subnet: "127.0.0".into() });
    server.knock(k2.tx.clone(), Client::alive(), Knock { subnet: "127.0.0".into() });
    k1.drain();
    k2.drain();

    server.bind(Bind { id: "127.0.0.0".into(), alias: "127.0.0.0:0".into() });
    k1.drain();
    k2.drain();

    server.accepting(codec::message::Accepting { id: "127.0.0.0".into(), alias: "127.0.0.0:0".into() });
    assert!(k1.drain().is_empty());
    assert!(k2.drain().is_empty());

    server.connect(Connect {
        id: "127.0.0.1".into(),
        remote_alias: "127.0.0.0:0".into(),
        client_connection_id: "c1".into(),
    });

    let k2_messages = k2.drain();
    assert_eq!(k2_messages.len(), 2);
    assert_eq!(opcode(&k2_messages[0]), 7);
    assert_eq!(k2_messages[0]["data"]["set"], true);
    assert_eq!(k2_messages[0]["data"]["isConnectionAlias"], true);
    assert_eq!(k2_messages[0]["data"]["alias"], "127.0.0.1:0");
    assert_eq!(opcode(&k2_messages[1]), 7);
    assert_eq!(k2_messages[1]["data"]["id"], "127.0.0.0");
    assert_eq!(k2_messages[1]["data"]["alias"], "127.0.0.0:0");

    let k1_messages = k1.drain();
    assert_eq!(k1_messages.len(), 2);
    assert_eq!(opcode(&k1_messages[0]), 7);
    assert_eq!(k1_messages[0]["data"]["alias"], "127.0.0.1:0");
    assert_eq!(opcode(&k1_messages[1]), 11); // Accept
    assert_eq!(k1_messages[1]["data"]["boundAlias"], "127.0.0.0:0");
    assert_eq!(k1_messages[1]["data"]["clientAlias"], "127.0.0.1:0");
}

#[tokio::test]
async fn goodbye_cascades_alias_teardown_then_goodbye() {
    let server = Server::default();
    let mut k1 = Client::new();
    let mut k2 = Client::new();

    server.knock(k1.tx.clone(), Client::alive(), Knock { subnet: "127.0.0".into() });
    server.knock(k2.tx.clone(), Client::alive(), Knock { subnet: "127.0.0".into() });
    k1.drain();
    k2.drain();

    server.bind(Bind { id: "127.0.0.0".into(), alias: "127.0.0.0:0".into() });
    k1.drain();
    k2.drain();

    server.goodbye("127.0.0.0");

    let messages = k2.drain();
    assert_eq!(messages.len(), 2);
    assert_eq!(opcode(&messages[0]), 7);
    assert_eq!(messages[0]["data"]["set"], false);
    assert_eq!(opcode(&messages[1]), 12); // Goodbye
    assert_eq!(messages[1]["data"]["id"], "127.0.0.0");
}
