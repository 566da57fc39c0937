//! End-to-end tests of the IPC facade over a real Unix socket.
//!
//! These drive store-backed commands (list, stats, status, kill) and the
//! framing/shutdown behavior. Commands that need a live tmux server or git
//! repository are covered by the substrate crates' own tests.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use gforge_core::{Coordinator, CoreConfig};
use gforge_daemon::server::run_server_with_shutdown;
use gforge_daemon::types::DaemonConfig;
use gforge_paths::GforgePaths;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio_util::sync::CancellationToken;

struct TestDaemon {
    _dir: tempfile::TempDir,
    socket_path: PathBuf,
    shutdown: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
}

async fn start_daemon() -> TestDaemon {
    let dir = tempfile::tempdir().unwrap();
    let paths = GforgePaths::from_dir(dir.path().join(".gforge"));
    let core_config = CoreConfig::from_paths(&paths);
    let daemon_config = DaemonConfig {
        read_deadline: Duration::from_millis(100),
        ..DaemonConfig::from_paths(&paths)
    };
    let socket_path = daemon_config.socket_path.clone();

    let coordinator = Arc::new(Coordinator::with_defaults(core_config).unwrap());
    let shutdown = CancellationToken::new();
    let server_shutdown = shutdown.clone();
    let handle = tokio::spawn(async move {
        run_server_with_shutdown(coordinator, daemon_config, server_shutdown)
            .await
            .unwrap();
    });

    // Wait for the socket to appear
    for _ in 0..100 {
        if socket_path.exists() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(socket_path.exists(), "daemon socket never appeared");

    TestDaemon {
        _dir: dir,
        socket_path,
        shutdown,
        handle,
    }
}

async fn roundtrip(socket_path: &PathBuf, frame: &str) -> serde_json::Value {
    let stream = UnixStream::connect(socket_path).await.unwrap();
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    write_half
        .write_all(format!("{}\n", frame).as_bytes())
        .await
        .unwrap();

    let mut reply = String::new();
    tokio::time::timeout(Duration::from_secs(5), reader.read_line(&mut reply))
        .await
        .expect("reply deadline")
        .unwrap();
    serde_json::from_str(reply.trim()).unwrap()
}

#[tokio::test]
async fn test_stats_on_empty_store() {
    let daemon = start_daemon().await;

    let reply = roundtrip(&daemon.socket_path, r#"{"action":"stats"}"#).await;
    assert_eq!(reply["status"], "ok");
    assert_eq!(reply["stats"]["total"], 0);
    assert_eq!(reply["stats"]["running"], 0);

    daemon.shutdown.cancel();
    daemon.handle.await.unwrap();
}

#[tokio::test]
async fn test_list_on_empty_store() {
    let daemon = start_daemon().await;

    let reply = roundtrip(&daemon.socket_path, r#"{"action":"list"}"#).await;
    assert_eq!(reply["status"], "ok");
    assert_eq!(reply["goblins"], serde_json::json!([]));

    daemon.shutdown.cancel();
    daemon.handle.await.unwrap();
}

#[tokio::test]
async fn test_status_of_unknown_goblin_is_not_found() {
    let daemon = start_daemon().await;

    let reply = roundtrip(
        &daemon.socket_path,
        r#"{"action":"status","name":"ghost"}"#,
    )
    .await;
    assert_eq!(reply["error"], "not_found");
    assert!(reply["message"].as_str().unwrap().contains("ghost"));

    daemon.shutdown.cancel();
    daemon.handle.await.unwrap();
}

#[tokio::test]
async fn test_kill_of_unknown_goblin_is_not_found() {
    let daemon = start_daemon().await;

    let reply = roundtrip(&daemon.socket_path, r#"{"action":"kill","name":"ghost"}"#).await;
    assert_eq!(reply["error"], "not_found");

    daemon.shutdown.cancel();
    daemon.handle.await.unwrap();
}

#[tokio::test]
async fn test_malformed_frame_is_bad_input() {
    let daemon = start_daemon().await;

    let reply = roundtrip(&daemon.socket_path, r#"{"garbage": true"#).await;
    assert_eq!(reply["error"], "bad_input");

    daemon.shutdown.cancel();
    daemon.handle.await.unwrap();
}

#[tokio::test]
async fn test_status_event_is_acknowledged() {
    let daemon = start_daemon().await;

    let reply = roundtrip(
        &daemon.socket_path,
        r#"{"status":"listening","utterance":"spawn one"}"#,
    )
    .await;
    assert_eq!(reply["status"], "ok");

    daemon.shutdown.cancel();
    daemon.handle.await.unwrap();
}

#[tokio::test]
async fn test_multiple_commands_on_one_connection() {
    let daemon = start_daemon().await;

    let stream = UnixStream::connect(&daemon.socket_path).await.unwrap();
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    for _ in 0..3 {
        write_half.write_all(b"{\"action\":\"stats\"}\n").await.unwrap();
        let mut reply = String::new();
        tokio::time::timeout(Duration::from_secs(5), reader.read_line(&mut reply))
            .await
            .expect("reply deadline")
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(reply.trim()).unwrap();
        assert_eq!(parsed["status"], "ok");
    }

    daemon.shutdown.cancel();
    daemon.handle.await.unwrap();
}

#[tokio::test]
async fn test_shutdown_removes_socket_and_pid() {
    let daemon = start_daemon().await;
    let pid_path = daemon.socket_path.parent().unwrap().join("daemon.pid");
    assert!(pid_path.exists());

    daemon.shutdown.cancel();
    daemon.handle.await.unwrap();

    assert!(!daemon.socket_path.exists());
    assert!(!pid_path.exists());
}

#[tokio::test]
async fn test_second_daemon_instance_is_refused() {
    let daemon = start_daemon().await;

    // A second server over the same pid file sees this (live) process
    let paths = GforgePaths::from_dir(daemon.socket_path.parent().unwrap().to_path_buf());
    let core_config = CoreConfig::from_paths(&paths);
    let daemon_config = DaemonConfig {
        socket_path: daemon.socket_path.clone(),
        pid_path: daemon.socket_path.parent().unwrap().join("daemon.pid"),
        read_deadline: Duration::from_millis(100),
    };
    let coordinator = Arc::new(Coordinator::with_defaults(core_config).unwrap());

    let result =
        run_server_with_shutdown(coordinator, daemon_config, CancellationToken::new()).await;
    assert!(matches!(
        result,
        Err(gforge_daemon::DaemonError::AlreadyRunning(_))
    ));

    daemon.shutdown.cancel();
    daemon.handle.await.unwrap();
}
