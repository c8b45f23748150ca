#![cfg(unix)]

use ice_node_runner::{NodeError, NodeOptions, NodeProcess};
use pretty_assertions::assert_eq;
use std::{
	os::unix::fs::PermissionsExt,
	path::{Path, PathBuf},
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
	time::Duration,
};
use tempfile::TempDir;

const READY_LINE: &str = "Idle (0 peers), best: #0 (0x9d0c…), finalized #0 (0x9d0c…)";

fn fake_node(dir: &Path, body: &str) -> PathBuf {
	let path = dir.join("ice-node");
	std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
	std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
	path
}

fn options(binary: PathBuf) -> NodeOptions {
	NodeOptions { startup_timeout: Duration::from_secs(5), ..NodeOptions::new(binary) }
}

#[tokio::test]
async fn resolves_when_marker_is_printed_and_stops_twice() {
	let dir = TempDir::new().unwrap();
	let binary = fake_node(
		dir.path(),
		&format!("echo \"args: $*\"\necho 'Ice Node starting'\necho '{READY_LINE}'\nexec sleep 30"),
	);

	let mut node = NodeProcess::start(&options(binary), None).await.unwrap();

	assert!(node.is_running());
	let logs = node.logs();
	assert_eq!(logs.last().map(String::as_str), Some(READY_LINE));
	assert!(logs[0].contains("--dev --validator --execution=Native"));
	assert!(logs[0].ends_with("--ws-port=9944 --tmp"));

	node.stop().await;
	assert!(!node.is_running());
	node.stop().await;
}

#[tokio::test]
async fn marker_on_stderr_counts_too() {
	let dir = TempDir::new().unwrap();
	let binary = fake_node(dir.path(), &format!("echo '{READY_LINE}' >&2\nexec sleep 30"));

	let mut node = NodeProcess::start(&options(binary), None).await.unwrap();

	assert!(node.logs().iter().any(|line| line == READY_LINE));
	node.stop().await;
}

#[tokio::test]
async fn silent_node_times_out_with_its_logs() {
	let dir = TempDir::new().unwrap();
	let binary = fake_node(dir.path(), "echo 'Loading chain spec'\nexec sleep 30");
	let options =
		NodeOptions { startup_timeout: Duration::from_millis(500), ..NodeOptions::new(binary) };

	let err = NodeProcess::start(&options, None).await.err().unwrap();

	match err {
		NodeError::StartupTimeout { command, timeout_ms, logs } => {
			assert!(command.ends_with("--tmp"));
			assert_eq!(timeout_ms, 500);
			assert_eq!(logs, vec!["Loading chain spec".to_string()]);
		},
		other => panic!("unexpected error: {other}"),
	}
}

#[tokio::test]
async fn node_exiting_before_ready_is_reported() {
	let dir = TempDir::new().unwrap();
	let binary = fake_node(dir.path(), "echo 'Error: Invalid argument' >&2\nexit 3");

	let err = NodeProcess::start(&options(binary), None).await.err().unwrap();

	assert!(matches!(err, NodeError::ExitedEarly { .. }));
	assert_eq!(err.logs(), &["Error: Invalid argument".to_string()]);
}

#[tokio::test]
async fn missing_binary_has_a_build_hint() {
	let dir = TempDir::new().unwrap();
	let binary = dir.path().join("does-not-exist");

	let err = NodeProcess::start(&options(binary.clone()), None).await.err().unwrap();

	assert!(matches!(err, NodeError::MissingBinary { ref path } if *path == binary));
	assert!(err.to_string().contains("Please compile the Ice project"));
}

#[tokio::test]
async fn warm_up_runs_after_readiness() {
	let dir = TempDir::new().unwrap();
	let binary = fake_node(dir.path(), &format!("echo '{READY_LINE}'\nexec sleep 30"));
	let warmed_up = Arc::new(AtomicBool::new(false));
	let flag = warmed_up.clone();

	let mut node = NodeProcess::start(
		&options(binary),
		Some(Box::pin(async move {
			flag.store(true, Ordering::SeqCst);
			Ok::<(), String>(())
		})),
	)
	.await
	.unwrap();

	assert!(warmed_up.load(Ordering::SeqCst));
	node.stop().await;
}

#[tokio::test]
async fn failing_warm_up_stops_the_node() {
	let dir = TempDir::new().unwrap();
	let binary = fake_node(dir.path(), &format!("echo '{READY_LINE}'\nexec sleep 30"));

	let err = NodeProcess::start(
		&options(binary),
		Some(Box::pin(async { Err::<(), _>("eth_chainId: connection refused".to_string()) })),
	)
	.await
	.err()
	.unwrap();

	assert_eq!(err.to_string(), "Ice node warm-up request failed: eth_chainId: connection refused");
}
