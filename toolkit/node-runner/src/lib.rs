//! Lifecycle of a development Ice node used by the end-to-end suites.
//!
//! [NodeProcess::start] spawns the node binary with the flags rendered by [NodeOptions],
//! collects everything it prints on stdout and stderr, and returns once a line contains the
//! readiness marker and the optional warm-up request succeeded. The node keeps running until
//! [NodeProcess::stop] is called or the handle is dropped.

mod options;

pub use options::*;

use futures::future::BoxFuture;
use std::{
	collections::VecDeque,
	io::ErrorKind,
	path::PathBuf,
	process::Stdio,
	sync::{Arc, Mutex},
};
use tokio::{
	io::{AsyncBufReadExt, AsyncRead, BufReader},
	process::{Child, Command},
	sync::mpsc,
	task::JoinHandle,
};

const MAX_LOG_LINES: usize = 10_000;

/// Request sent once the node is ready, before [NodeProcess::start] returns.
pub type WarmUp = BoxFuture<'static, Result<(), String>>;

#[derive(Debug, thiserror::Error)]
pub enum NodeError {
	#[error("Missing Ice binary ({}). Please compile the Ice project: cargo build", path.display())]
	MissingBinary { path: PathBuf },
	#[error("Failed to spawn '{command}': {message}")]
	Spawn { command: String, message: String },
	#[error("Failed to start Ice node in {timeout_ms} ms. Command: {command}")]
	StartupTimeout { command: String, timeout_ms: u128, logs: Vec<String> },
	#[error("Ice node exited before becoming ready ({status}). Command: {command}")]
	ExitedEarly { command: String, status: String, logs: Vec<String> },
	#[error("Ice node warm-up request failed: {0}")]
	WarmUp(String),
}

impl NodeError {
	/// Node output captured before the failure.
	pub fn logs(&self) -> &[String] {
		match self {
			NodeError::StartupTimeout { logs, .. } | NodeError::ExitedEarly { logs, .. } => logs,
			_ => &[],
		}
	}
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<VecDeque<String>>>);

impl LogBuffer {
	fn push(&self, line: String) {
		if let Ok(mut lines) = self.0.lock() {
			if lines.len() == MAX_LOG_LINES {
				lines.pop_front();
			}
			lines.push_back(line);
		}
	}

	fn snapshot(&self) -> Vec<String> {
		self.0.lock().map(|lines| lines.iter().cloned().collect()).unwrap_or_default()
	}
}

pub struct NodeProcess {
	child: Option<Child>,
	logs: LogBuffer,
	drains: Vec<JoinHandle<()>>,
	command: String,
}

impl NodeProcess {
	pub async fn start(options: &NodeOptions, warm_up: Option<WarmUp>) -> Result<Self, NodeError> {
		let command = options.command_line();
		log::info!("Starting Ice node: {command}");
		let mut child = Command::new(&options.binary)
			.args(options.args())
			.stdin(Stdio::null())
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			.kill_on_drop(true)
			.spawn()
			.map_err(|e| match e.kind() {
				ErrorKind::NotFound => NodeError::MissingBinary { path: options.binary.clone() },
				_ => NodeError::Spawn { command: command.clone(), message: e.to_string() },
			})?;

		let logs = LogBuffer::default();
		let (ready_tx, mut ready_rx) = mpsc::unbounded_channel();
		let mut drains = Vec::new();
		if let Some(stdout) = child.stdout.take() {
			drains.push(drain(stdout, logs.clone(), options, ready_tx.clone()));
		}
		if let Some(stderr) = child.stderr.take() {
			drains.push(drain(stderr, logs.clone(), options, ready_tx.clone()));
		}
		// The channel closes once both streams ended, i.e. the process is gone.
		drop(ready_tx);

		let mut node = Self { child: Some(child), logs, drains, command };
		let startup = async {
			if ready_rx.recv().await.is_none() {
				return Err(node.exited_early().await);
			}
			if let Some(warm_up) = warm_up {
				warm_up.await.map_err(NodeError::WarmUp)?;
			}
			Ok(())
		};
		let result = tokio::time::timeout(options.startup_timeout, startup).await;
		match result {
			Ok(Ok(())) => {
				log::info!("Ice node is ready");
				Ok(node)
			},
			Ok(Err(e)) => {
				node.stop().await;
				Err(e)
			},
			Err(_) => {
				node.stop().await;
				Err(NodeError::StartupTimeout {
					command: node.command.clone(),
					timeout_ms: options.startup_timeout.as_millis(),
					logs: node.logs(),
				})
			},
		}
	}

	/// Like [NodeProcess::start], but a node that does not come up terminates the whole
	/// process with exit code 1 after logging the command and the node output.
	pub async fn start_or_exit(options: &NodeOptions, warm_up: Option<WarmUp>) -> Self {
		match Self::start(options, warm_up).await {
			Ok(node) => node,
			Err(e) => {
				log::error!("{e}");
				let logs = e.logs();
				if !logs.is_empty() {
					log::error!("Logs:\n{}", logs.join("\n"));
				}
				std::process::exit(1)
			},
		}
	}

	/// Snapshot of the node output captured so far.
	pub fn logs(&self) -> Vec<String> {
		self.logs.snapshot()
	}

	pub fn is_running(&mut self) -> bool {
		match self.child.as_mut() {
			Some(child) => matches!(child.try_wait(), Ok(None)),
			None => false,
		}
	}

	/// Kills the node and reaps it. Calling it again is a no-op.
	pub async fn stop(&mut self) {
		if let Some(mut child) = self.child.take() {
			if let Err(e) = child.kill().await {
				log::warn!("Failed to kill Ice node: {e}");
			}
			log::debug!("Ice node stopped");
		}
		for drain in self.drains.drain(..) {
			drain.abort();
		}
	}

	async fn exited_early(&mut self) -> NodeError {
		let status = match self.child.as_mut() {
			Some(child) => {
				child.wait().await.map(|s| s.to_string()).unwrap_or_else(|e| e.to_string())
			},
			None => "stopped".to_string(),
		};
		NodeError::ExitedEarly { command: self.command.clone(), status, logs: self.logs() }
	}
}

fn drain<R>(
	stream: R,
	logs: LogBuffer,
	options: &NodeOptions,
	ready: mpsc::UnboundedSender<()>,
) -> JoinHandle<()>
where
	R: AsyncRead + Unpin + Send + 'static,
{
	let marker = options.ready_marker.clone();
	let display = options.display_logs;
	tokio::spawn(async move {
		let mut lines = BufReader::new(stream).lines();
		while let Ok(Some(line)) = lines.next_line().await {
			if display {
				log::debug!(target: "ice_node", "{line}");
			}
			let is_ready = line.contains(&marker);
			logs.push(line);
			if is_ready {
				let _ = ready.send(());
			}
		}
	})
}
