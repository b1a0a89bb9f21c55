//! Fire-and-forget execution of compiled scripts.
//!
//! Each run is a spawned task; its outcome travels over a channel to a
//! single sink task that logs it. Nothing in the build path waits on a
//! child process. [`Executor::finish`] drains the sink at session end.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::source::display_name;

/// What happened to one execution.
#[derive(Debug, Clone)]
pub struct ExecOutcome {
    pub artifact: PathBuf,
    /// Exit code; `None` if the process could not start or was killed.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Spawn failure, if any.
    pub error: Option<String>,
}

impl ExecOutcome {
    pub fn success(&self) -> bool {
        self.error.is_none() && self.code == Some(0)
    }
}

/// Runs artifacts with a configured command line.
pub struct Executor {
    argv: Vec<String>,
    tx: mpsc::UnboundedSender<ExecOutcome>,
    sink: JoinHandle<Vec<ExecOutcome>>,
}

impl Executor {
    /// Start the logging sink. Must be called inside a tokio runtime.
    ///
    /// `argv` is the command prefix; the artifact path is appended.
    pub fn start(argv: Vec<String>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<ExecOutcome>();
        let sink = tokio::spawn(async move {
            let mut outcomes = Vec::new();
            while let Some(outcome) = rx.recv().await {
                report(&outcome);
                outcomes.push(outcome);
            }
            outcomes
        });
        Self { argv, tx, sink }
    }

    /// Run `artifact` in the background.
    pub fn spawn(&self, artifact: &Path) {
        let argv = self.argv.clone();
        let artifact = artifact.to_path_buf();
        let tx = self.tx.clone();
        crate::log_event!("exec", "start", "{}", display_name(&artifact));

        tokio::spawn(async move {
            let outcome = run(&argv, artifact).await;
            // Sink gone means the session already ended
            let _ = tx.send(outcome);
        });
    }

    /// Wait for every started run and return their outcomes.
    pub async fn finish(self) -> Vec<ExecOutcome> {
        let Executor { tx, sink, .. } = self;
        drop(tx);
        match sink.await {
            Ok(outcomes) => outcomes,
            Err(e) => {
                tracing::error!("[exec] sink task failed: {e}");
                Vec::new()
            }
        }
    }
}

async fn run(argv: &[String], artifact: PathBuf) -> ExecOutcome {
    let mut outcome = ExecOutcome {
        artifact,
        code: None,
        stdout: String::new(),
        stderr: String::new(),
        error: None,
    };
    let Some((program, args)) = argv.split_first() else {
        outcome.error = Some("no execute command configured".to_string());
        return outcome;
    };

    let result = Command::new(program)
        .args(args)
        .arg(&outcome.artifact)
        .stdin(Stdio::null())
        .output()
        .await;

    match result {
        Ok(output) => {
            outcome.code = output.status.code();
            outcome.stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            outcome.stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        }
        Err(e) => outcome.error = Some(format!("cannot run {program}: {e}")),
    }
    outcome
}

fn report(outcome: &ExecOutcome) {
    let name = display_name(&outcome.artifact);
    if let Some(error) = &outcome.error {
        tracing::error!("[exec] {name}: {error}");
        return;
    }
    if !outcome.stdout.is_empty() {
        print!("{}", outcome.stdout);
    }
    if outcome.success() {
        crate::log_event!("exec", "finished", "{name}");
    } else {
        let code = outcome
            .code
            .map_or_else(|| "signal".to_string(), |c| c.to_string());
        tracing::error!("[exec] {name} exited with {code}: {}", outcome.stderr.trim());
    }
}
