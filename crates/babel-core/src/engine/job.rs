use super::progress::StepStatus;
use super::slot::SlotGuard;
use crate::core::scanner;
use std::fmt;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    QueryReadFormats,
    ReadFile,
    Convert,
    QueryForceFields,
    OptimizeGeometry,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::QueryReadFormats => "query-formats",
            OperationKind::ReadFile => "read-file",
            OperationKind::Convert => "convert",
            OperationKind::QueryForceFields => "query-forcefields",
            OperationKind::OptimizeGeometry => "optimize",
        };
        f.write_str(name)
    }
}

/// What a job will run: its kind, the argument vector and the stdin payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOperation {
    pub kind: OperationKind,
    pub args: Vec<String>,
    pub stdin: Option<Vec<u8>>,
}

impl PendingOperation {
    pub fn new(kind: OperationKind, args: Vec<String>) -> Self {
        Self {
            kind,
            args,
            stdin: None,
        }
    }

    pub fn with_stdin(mut self, payload: Vec<u8>) -> Self {
        self.stdin = Some(payload);
        self
    }
}

/// Accumulated minimiser log of one optimisation job.
#[derive(Debug, Default)]
pub struct OptimizationLog {
    buffer: String,
    max_steps: Option<u32>,
}

impl OptimizationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn max_steps(&self) -> Option<u32> {
        self.max_steps
    }

    /// Appends a stderr chunk and returns the statuses it produces, in order.
    ///
    /// The step budget is looked up until found and then frozen; finding it
    /// yields a step-0 status. Once the budget is known, every chunk re-reports
    /// the latest step record in the whole log.
    pub fn absorb(&mut self, chunk: &[u8]) -> Vec<StepStatus> {
        // Byte-per-char decoding cannot fail and never splits a character
        // across two chunks.
        self.buffer.extend(chunk.iter().map(|&b| char::from(b)));

        let mut updates = Vec::new();
        if self.max_steps.is_none()
            && let Some(max_steps) = scanner::extract_max_steps(&self.buffer)
        {
            self.max_steps = Some(max_steps);
            updates.push(StepStatus::started(max_steps));
        }
        if let Some(max_steps) = self.max_steps
            && let Some(record) = scanner::extract_latest_step(&self.buffer)
        {
            updates.push(StepStatus::from_record(record, max_steps));
        }
        updates
    }
}

/// State owned by the job that currently holds the slot.
///
/// The context is created right after acquisition and consumed by
/// [`JobContext::finish`], which releases the slot; the abort flag and the
/// optimisation log therefore cannot outlive the job they belong to.
#[derive(Debug)]
pub struct JobContext {
    kind: OperationKind,
    args: Vec<String>,
    slot: SlotGuard,
    log: Option<OptimizationLog>,
}

impl JobContext {
    pub fn new(slot: SlotGuard, kind: OperationKind, args: Vec<String>) -> Self {
        let log = (kind == OperationKind::OptimizeGeometry).then(OptimizationLog::new);
        Self {
            kind,
            args,
            slot,
            log,
        }
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn is_aborted(&self) -> bool {
        self.slot.is_aborted()
    }

    pub fn abort_token(&self) -> &CancellationToken {
        self.slot.abort_token()
    }

    pub fn log(&self) -> Option<&OptimizationLog> {
        self.log.as_ref()
    }

    /// Feeds a stderr chunk to the optimisation log; other jobs ignore it.
    pub fn absorb_stderr(&mut self, chunk: &[u8]) -> Vec<StepStatus> {
        match self.log.as_mut() {
            Some(log) => log.absorb(chunk),
            None => Vec::new(),
        }
    }

    pub fn finish(self) {
        self.slot.release();
    }
}
