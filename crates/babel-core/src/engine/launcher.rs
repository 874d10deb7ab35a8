use crate::core::classifier::Termination;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStderr, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const STDERR_CHUNK_SIZE: usize = 4096;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error while collecting process output: {0}")]
    Io(#[from] io::Error),

    #[error("Process monitor task failed: {0}")]
    Monitor(String),
}

/// Everything a finished child left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub termination: Termination,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Events delivered through a [`ProcessHandle`].
///
/// Any number of `Stderr` chunks arrive first, in the order the child wrote
/// them; exactly one `Finished` or `Failed` event always comes last.
#[derive(Debug)]
pub enum ProcessEvent {
    Stderr(Vec<u8>),
    Finished(ProcessOutput),
    Failed(LaunchError),
}

impl ProcessEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProcessEvent::Stderr(_))
    }
}

/// Receiving end for one spawned child. Every spawn creates a new handle, so
/// events of an earlier child can never reach a later job.
#[derive(Debug)]
pub struct ProcessHandle {
    events: mpsc::UnboundedReceiver<ProcessEvent>,
    kill: CancellationToken,
    pid: Option<u32>,
}

impl ProcessHandle {
    /// Next event, or `None` once the terminal event has been consumed.
    pub async fn next_event(&mut self) -> Option<ProcessEvent> {
        self.events.recv().await
    }

    /// Asks the monitor to kill the child. Best-effort: the terminal event
    /// still arrives once the process is gone.
    pub fn kill(&self) {
        self.kill.cancel();
    }

    pub fn id(&self) -> Option<u32> {
        self.pid
    }
}

#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    executable: PathBuf,
}

impl ProcessLauncher {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Starts the executable with `args`, writing `stdin` to the child and then
    /// closing the pipe when a payload is given.
    ///
    /// Never fails synchronously: a process that cannot be started is reported
    /// as a `Failed` event on the returned handle.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn spawn(&self, args: &[String], stdin: Option<Vec<u8>>) -> ProcessHandle {
        let (sender, events) = mpsc::unbounded_channel();
        let kill = CancellationToken::new();

        debug!("Running {} {}", self.executable.display(), args.join(" "));
        let mut command = Command::new(&self.executable);
        command
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let pid = match command.spawn() {
            Ok(child) => {
                let pid = child.id();
                tokio::spawn(monitor(child, stdin, sender, kill.clone()));
                pid
            }
            Err(source) => {
                let _ = sender.send(ProcessEvent::Failed(LaunchError::Spawn {
                    program: self.executable.display().to_string(),
                    source,
                }));
                None
            }
        };

        ProcessHandle { events, kill, pid }
    }
}

async fn monitor(
    mut child: Child,
    stdin: Option<Vec<u8>>,
    events: mpsc::UnboundedSender<ProcessEvent>,
    kill: CancellationToken,
) {
    let event = match collect(&mut child, stdin, &events, &kill).await {
        Ok(output) => ProcessEvent::Finished(output),
        Err(error) => ProcessEvent::Failed(error),
    };
    let _ = events.send(event);
}

async fn collect(
    child: &mut Child,
    stdin: Option<Vec<u8>>,
    events: &mpsc::UnboundedSender<ProcessEvent>,
    kill: &CancellationToken,
) -> Result<ProcessOutput, LaunchError> {
    let writer = child.stdin.take().zip(stdin).map(|(mut pipe, payload)| {
        tokio::spawn(async move {
            pipe.write_all(&payload).await?;
            pipe.flush().await?;
            // Dropping the pipe closes it, which is the child's end-of-input.
            drop(pipe);
            Ok::<_, io::Error>(())
        })
    });
    let stdout_reader = child.stdout.take().map(|mut pipe| {
        tokio::spawn(async move {
            let mut buffer = Vec::new();
            pipe.read_to_end(&mut buffer).await.map(|_| buffer)
        })
    });
    let stderr_reader = child
        .stderr
        .take()
        .map(|pipe| tokio::spawn(forward_stderr(pipe, events.clone())));

    let status = tokio::select! {
        status = child.wait() => Some(status),
        _ = kill.cancelled() => None,
    };
    let status = match status {
        Some(status) => status?,
        None => {
            debug!("Kill requested, terminating child process.");
            if let Err(e) = child.start_kill() {
                debug!("Child process could not be killed: {}", e);
            }
            child.wait().await?
        }
    };

    let stdout = join_pipe(stdout_reader).await?;
    let stderr = join_pipe(stderr_reader).await?;
    if let Some(writer) = writer {
        match writer.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!("Child stopped reading its input early: {}", e),
            Err(e) => return Err(LaunchError::Monitor(e.to_string())),
        }
    }

    Ok(ProcessOutput {
        termination: termination_of(status),
        stdout,
        stderr,
    })
}

async fn forward_stderr(
    mut pipe: ChildStderr,
    events: mpsc::UnboundedSender<ProcessEvent>,
) -> io::Result<Vec<u8>> {
    let mut captured = Vec::new();
    let mut chunk = vec![0u8; STDERR_CHUNK_SIZE];
    loop {
        let read = pipe.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        captured.extend_from_slice(&chunk[..read]);
        let _ = events.send(ProcessEvent::Stderr(chunk[..read].to_vec()));
    }
    Ok(captured)
}

async fn join_pipe(
    reader: Option<JoinHandle<io::Result<Vec<u8>>>>,
) -> Result<Vec<u8>, LaunchError> {
    match reader {
        Some(reader) => reader
            .await
            .map_err(|e| LaunchError::Monitor(e.to_string()))?
            .map_err(LaunchError::from),
        None => Ok(Vec::new()),
    }
}

fn termination_of(status: ExitStatus) -> Termination {
    match status.code() {
        Some(code) => Termination::Normal { code },
        None => Termination::Abnormal,
    }
}
