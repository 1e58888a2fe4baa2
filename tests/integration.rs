use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::{sleep, timeout};

use chatroom::protocol::responses;
use chatroom::{Server, ServerConfig};

// Helper to start a server on an ephemeral loopback port
async fn start_server(max_clients: usize) -> SocketAddr {
    let config = ServerConfig {
        bind_address: "127.0.0.1".to_string(),
        port: 0,
        max_clients,
        ..ServerConfig::default()
    };
    let server = Server::bind(config).await.expect("failed to bind server");
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.start());
    addr
}

struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    // Helper to connect to the server
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("failed to connect");
        let (reader, writer) = stream.into_split();
        Self {
            reader: BufReader::new(reader),
            writer,
        }
    }

    // Helper to connect and complete the join handshake
    async fn join(addr: SocketAddr, name: &str) -> Self {
        let mut client = Self::connect(addr).await;
        assert_eq!(client.read_line().await, responses::NOT_FULL);
        client.send_line(name).await;
        assert_eq!(client.read_line().await, responses::NAME_UNIQUE);
        assert_eq!(client.read_line().await, responses::WELCOME);
        client
    }

    async fn send_line(&mut self, line: &str) {
        self.writer
            .write_all(format!("{line}\n").as_bytes())
            .await
            .unwrap();
    }

    async fn read_line(&mut self) -> String {
        let mut line = String::new();
        timeout(Duration::from_secs(5), self.reader.read_line(&mut line))
            .await
            .expect("timed out waiting for server")
            .unwrap();
        line
    }

    async fn assert_silent(&mut self) {
        let mut line = String::new();
        let waited = timeout(Duration::from_millis(200), self.reader.read_line(&mut line)).await;
        assert!(waited.is_err(), "unexpected line: {line:?}");
    }
}

#[tokio::test]
async fn test_list_in_join_order() {
    let addr = start_server(10).await;
    let mut alice = TestClient::join(addr, "alice").await;
    let _bob = TestClient::join(addr, "bob").await;
    assert_eq!(alice.read_line().await, "bob has joined.\n");

    alice.send_line("/list").await;
    assert_eq!(
        alice.read_line().await,
        "There are 2 members currently in the server:\n"
    );
    assert_eq!(alice.read_line().await, "alice, bob\n");
}

#[tokio::test]
async fn test_duplicate_name_is_rejected_during_join() {
    let addr = start_server(10).await;
    let mut alice = TestClient::join(addr, "alice").await;

    let mut bob = TestClient::connect(addr).await;
    assert_eq!(bob.read_line().await, responses::NOT_FULL);
    bob.send_line("alice").await;
    assert_eq!(bob.read_line().await, responses::NAME_NOT_UNIQUE);

    // Still negotiating: nobody has been announced and alice is alone.
    alice.assert_silent().await;
    alice.send_line("/list").await;
    assert_eq!(
        alice.read_line().await,
        "There is 1 member currently in the server:\n"
    );
    assert_eq!(alice.read_line().await, "alice\n");

    bob.send_line("bob").await;
    assert_eq!(bob.read_line().await, responses::NAME_UNIQUE);
    assert_eq!(bob.read_line().await, responses::WELCOME);
    assert_eq!(alice.read_line().await, "bob has joined.\n");
}

#[tokio::test]
async fn test_rename_to_taken_name() {
    let addr = start_server(10).await;
    let mut alice = TestClient::join(addr, "alice").await;
    let mut bob = TestClient::join(addr, "bob").await;
    assert_eq!(alice.read_line().await, "bob has joined.\n");

    alice.send_line("/name bob").await;
    assert_eq!(alice.read_line().await, "Username already taken.\n");
    bob.assert_silent().await;

    bob.send_line("/list").await;
    bob.read_line().await;
    assert_eq!(bob.read_line().await, "alice, bob\n");
}

#[tokio::test]
async fn test_private_message_reaches_only_target() {
    let addr = start_server(10).await;
    let mut alice = TestClient::join(addr, "alice").await;
    let mut bob = TestClient::join(addr, "bob").await;
    assert_eq!(alice.read_line().await, "bob has joined.\n");
    let mut carol = TestClient::join(addr, "carol").await;
    assert_eq!(alice.read_line().await, "carol has joined.\n");
    assert_eq!(bob.read_line().await, "carol has joined.\n");

    alice.send_line("/pm bob Hello").await;
    assert_eq!(bob.read_line().await, "PM from alice: Hello\n");
    assert_eq!(alice.read_line().await, "The PM was sent.\n");
    carol.assert_silent().await;
}

#[tokio::test]
async fn test_quit_is_announced_and_excluded_from_list() {
    let addr = start_server(10).await;
    let mut alice = TestClient::join(addr, "alice").await;
    let mut bob = TestClient::join(addr, "bob").await;
    assert_eq!(alice.read_line().await, "bob has joined.\n");
    let mut carol = TestClient::join(addr, "carol").await;
    assert_eq!(alice.read_line().await, "carol has joined.\n");
    assert_eq!(bob.read_line().await, "carol has joined.\n");

    alice.send_line("/quit").await;
    assert_eq!(alice.read_line().await, responses::GOODBYE);
    assert_eq!(alice.read_line().await, "", "connection should be closed");
    assert_eq!(bob.read_line().await, "alice has left.\n");
    assert_eq!(carol.read_line().await, "alice has left.\n");

    carol.send_line("/list").await;
    assert_eq!(
        carol.read_line().await,
        "There are 2 members currently in the server:\n"
    );
    assert_eq!(carol.read_line().await, "bob, carol\n");
    bob.assert_silent().await;
}

#[tokio::test]
async fn test_chat_broadcast_and_abrupt_disconnect() {
    let addr = start_server(10).await;
    let mut alice = TestClient::join(addr, "alice").await;
    let mut bob = TestClient::join(addr, "bob").await;
    assert_eq!(alice.read_line().await, "bob has joined.\n");

    bob.send_line("hi alice").await;
    assert_eq!(alice.read_line().await, "bob: hi alice\n");
    bob.assert_silent().await;

    drop(bob);
    assert_eq!(alice.read_line().await, "bob has left.\n");
}

#[tokio::test]
async fn test_full_server_rejects_connection() {
    let addr = start_server(1).await;
    let mut alice = TestClient::join(addr, "alice").await;

    let mut bob = TestClient::connect(addr).await;
    assert_eq!(bob.read_line().await, responses::FULL);
    assert_eq!(bob.read_line().await, "", "rejected connection should be closed");

    alice.send_line("/quit").await;
    assert_eq!(alice.read_line().await, responses::GOODBYE);

    // The slot frees up once alice's worker has finished.
    for _ in 0..40 {
        let mut carol = TestClient::connect(addr).await;
        if carol.read_line().await == responses::NOT_FULL {
            return;
        }
        sleep(Duration::from_millis(50)).await;
    }
    panic!("slot was never released");
}
