//! Integration tests driving the `chitchat` client binary.

mod common;

use common::TestServer;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tokio::time::timeout;

fn spawn_client(server: &TestServer, name: &str) -> Child {
    Command::new(env!("CARGO_BIN_EXE_chitchat"))
        .arg(server.address())
        .env("CHITCHAT_USERNAME", name)
        .env("RUST_LOG", "warn")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn chitchat")
}

#[tokio::test]
async fn test_client_sends_lines_and_exits_locally() {
    let server = TestServer::spawn(17670).await.expect("Failed to spawn test server");
    let mut watcher = server.join("watcher").await.unwrap();

    let mut client = spawn_client(&server, "bob");
    watcher
        .recv_until(|m| m.message.starts_with("Participant bob joined"))
        .await
        .expect("Client never joined");

    let mut stdin = client.stdin.take().unwrap();
    stdin.write_all(b"\n   \n").await.unwrap();
    stdin.write_all(&[b'x'; 129]).await.unwrap();
    stdin.write_all(b"\nhello from bob\n").await.unwrap();

    let got = watcher.recv().await.unwrap();
    assert_eq!(got.from, "bob");
    assert_eq!(got.message, "hello from bob");

    stdin.write_all(b"EXIT\n").await.unwrap();
    let status = timeout(Duration::from_secs(5), client.wait())
        .await
        .expect("Client did not exit")
        .unwrap();
    assert!(status.success());

    // Leaving is noticed when the socket closes.
    let leave = watcher.recv().await.unwrap();
    assert!(leave.message.starts_with("Participant bob left"));
}

#[tokio::test]
async fn test_client_exits_with_error_when_server_goes_away() {
    let server = TestServer::spawn(17671).await.expect("Failed to spawn test server");
    let mut watcher = server.join("watcher").await.unwrap();

    let mut client = spawn_client(&server, "carol");
    watcher
        .recv_until(|m| m.message.starts_with("Participant carol joined"))
        .await
        .unwrap();

    drop(watcher);
    drop(server);

    let status = timeout(Duration::from_secs(5), client.wait())
        .await
        .expect("Client did not exit")
        .unwrap();
    assert_eq!(status.code(), Some(1));
}
