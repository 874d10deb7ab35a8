use super::job::OperationKind;
use crate::core::scanner::StepRecord;
use tokio::sync::mpsc;

/// Optimisation status derived from the minimiser log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepStatus {
    pub step: u32,
    pub max_steps: u32,
    pub energy: f64,
    pub last_energy: f64,
}

impl StepStatus {
    /// Status reported the moment the step budget becomes known.
    pub fn started(max_steps: u32) -> Self {
        Self {
            step: 0,
            max_steps,
            energy: 0.0,
            last_energy: 0.0,
        }
    }

    pub fn from_record(record: StepRecord, max_steps: u32) -> Self {
        Self {
            step: record.step,
            max_steps,
            energy: record.energy,
            last_energy: record.last_energy,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent<T> {
    Progress(StepStatus),
    Finished(T),
}

pub(crate) type EventSender<T> = mpsc::UnboundedSender<JobEvent<T>>;

/// The caller's end of a started job.
///
/// Progress events (optimisations only) arrive in log order and always before
/// the single `Finished` event. An aborted job never sends `Finished`; its
/// stream simply ends.
#[derive(Debug)]
pub struct JobHandle<T> {
    kind: OperationKind,
    events: mpsc::UnboundedReceiver<JobEvent<T>>,
}

impl<T> JobHandle<T> {
    pub(crate) fn new(kind: OperationKind, events: mpsc::UnboundedReceiver<JobEvent<T>>) -> Self {
        Self { kind, events }
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub async fn next_event(&mut self) -> Option<JobEvent<T>> {
        self.events.recv().await
    }

    /// Waits for the result, skipping progress. `None` means the job was aborted.
    pub async fn finished(mut self) -> Option<T> {
        while let Some(event) = self.events.recv().await {
            if let JobEvent::Finished(value) = event {
                return Some(value);
            }
        }
        None
    }
}
