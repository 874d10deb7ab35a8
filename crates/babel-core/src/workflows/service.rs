use crate::core::arguments;
use crate::core::classifier::{self, Outcome, Verdict};
use crate::core::listing::{self, Listing};
use crate::engine::config::{ServiceConfig, ServiceConfigBuilder};
use crate::engine::error::EngineError;
use crate::engine::job::{JobContext, OperationKind, PendingOperation};
use crate::engine::launcher::{ProcessEvent, ProcessHandle, ProcessLauncher};
use crate::engine::progress::{EventSender, JobEvent, JobHandle};
use crate::engine::slot::JobSlot;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Runs `obabel` jobs one at a time.
///
/// Clones share the same slot, so a clone handed to another task still sees
/// (and can abort) the job started through the original.
#[derive(Debug, Clone)]
pub struct BabelService {
    launcher: ProcessLauncher,
    slot: Arc<JobSlot>,
}

impl BabelService {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            launcher: ProcessLauncher::new(config.executable),
            slot: Arc::new(JobSlot::new()),
        }
    }

    /// Service for the executable named by `OBABEL_EXECUTABLE`, or `obabel`.
    pub fn from_env() -> Self {
        Self::new(ServiceConfig::from_env())
    }

    pub fn with_executable(path: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let config = ServiceConfigBuilder::new().executable(path).build()?;
        Ok(Self::new(config))
    }

    pub fn executable(&self) -> &Path {
        self.launcher.executable()
    }

    pub fn is_busy(&self) -> bool {
        self.slot.is_locked()
    }

    pub fn slot(&self) -> &JobSlot {
        &self.slot
    }

    /// Aborts the running job, if any. Its output is discarded and its handle
    /// closes without a result. Returns `false` when no job is running.
    pub fn abort(&self) -> bool {
        let aborted = self.slot.abort();
        if aborted {
            info!("Abort requested for the running obabel job.");
        }
        aborted
    }

    /// Lists the readable formats as description → extensions.
    pub fn query_read_formats(&self) -> Result<JobHandle<Listing>, EngineError> {
        let pending = PendingOperation::new(
            OperationKind::QueryReadFormats,
            arguments::read_formats_args(),
        );
        self.start(pending, |verdict| {
            listing::parse_format_listing(&accepted_text(verdict.outcome))
        })
    }

    /// Lists the available force fields as name → description.
    pub fn query_forcefields(&self) -> Result<JobHandle<Listing>, EngineError> {
        let pending = PendingOperation::new(
            OperationKind::QueryForceFields,
            arguments::forcefields_args(),
        );
        self.start(pending, |verdict| {
            listing::parse_forcefield_listing(&accepted_text(verdict.outcome))
        })
    }

    /// Reads `path` and returns it in `output_format`. The input format is
    /// `input_format` when given, otherwise the file extension.
    ///
    /// A path that is not valid UTF-8 is refused before the slot is taken.
    pub fn read_file(
        &self,
        path: &Path,
        output_format: &str,
        input_format: Option<&str>,
    ) -> Result<JobHandle<Vec<u8>>, EngineError> {
        let file = path
            .to_str()
            .ok_or_else(|| EngineError::NonUtf8Path(path.to_path_buf()))?;
        let pending = PendingOperation::new(
            OperationKind::ReadFile,
            arguments::read_file_args(file, output_format, input_format),
        );
        self.start(pending, |verdict| verdict.outcome.into_output())
    }

    pub fn convert(
        &self,
        input: Vec<u8>,
        input_format: &str,
        output_format: &str,
        options: &[String],
    ) -> Result<JobHandle<Vec<u8>>, EngineError> {
        let pending = PendingOperation::new(
            OperationKind::Convert,
            arguments::convert_args(input_format, output_format, options),
        )
        .with_stdin(input);
        self.start(pending, |verdict| verdict.outcome.into_output())
    }

    /// Minimises a CML structure. Step progress is reported on the handle
    /// before the optimised CML arrives.
    pub fn optimize_geometry(
        &self,
        cml: Vec<u8>,
        options: &[String],
    ) -> Result<JobHandle<Vec<u8>>, EngineError> {
        let pending = PendingOperation::new(
            OperationKind::OptimizeGeometry,
            arguments::optimize_args(options),
        )
        .with_stdin(cml);
        self.start(pending, |verdict| verdict.outcome.into_output())
    }

    fn start<T, F>(&self, pending: PendingOperation, finish: F) -> Result<JobHandle<T>, EngineError>
    where
        T: Send + 'static,
        F: FnOnce(Verdict) -> T + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| EngineError::NoRuntime)?;
        let kind = pending.kind;
        let Some(guard) = self.slot.try_acquire() else {
            warn!("Process already in use; refusing '{}'.", kind);
            return Err(EngineError::Busy { requested: kind });
        };

        let PendingOperation { kind, args, stdin } = pending;
        let process = self.launcher.spawn(&args, stdin);
        let context = JobContext::new(guard, kind, args);
        let (sender, events) = mpsc::unbounded_channel();
        runtime.spawn(drive_job(context, process, sender, finish));

        Ok(JobHandle::new(kind, events))
    }
}

fn accepted_text(outcome: Outcome) -> String {
    String::from_utf8_lossy(&outcome.into_output()).into_owned()
}

#[instrument(skip_all, fields(operation = %context.kind()))]
async fn drive_job<T, F>(
    mut context: JobContext,
    mut process: ProcessHandle,
    events: EventSender<T>,
    finish: F,
) where
    F: FnOnce(Verdict) -> T,
{
    let abort = context.abort_token().clone();
    let mut kill_sent = false;

    let verdict = loop {
        tokio::select! {
            event = process.next_event() => match event {
                Some(ProcessEvent::Stderr(chunk)) => {
                    if context.is_aborted() {
                        continue;
                    }
                    for status in context.absorb_stderr(&chunk) {
                        let _ = events.send(JobEvent::Progress(status));
                    }
                }
                Some(ProcessEvent::Finished(output)) => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    break classifier::classify(output.termination, &stderr, output.stdout);
                }
                Some(ProcessEvent::Failed(error)) => {
                    break Verdict::launch_failure(error.to_string());
                }
                None => {
                    break Verdict::launch_failure("process monitor ended without a completion event");
                }
            },
            _ = abort.cancelled(), if !kill_sent => {
                debug!("Abort flag set, killing obabel.");
                process.kill();
                kill_sent = true;
            }
        }
    };

    if context.is_aborted() {
        info!("Job aborted; output discarded.");
        context.finish();
        return;
    }

    if let Some(message) = &verdict.diagnostic {
        // The minimiser log is the optimisation's normal stderr.
        if context.kind() == OperationKind::OptimizeGeometry {
            debug!("obabel log:\n{}", message.trim_end());
        } else {
            warn!("obabel: {}", message.trim_end());
        }
    }
    if let Outcome::Rejected(reason) = &verdict.outcome {
        debug!(?reason, args = ?context.args(), "Output rejected.");
    }

    let value = finish(verdict);
    context.finish();
    let _ = events.send(JobEvent::Finished(value));
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::engine::progress::StepStatus;
    use serial_test::serial;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::time::Duration;
    use tempfile::TempDir;

    const WAIT: Duration = Duration::from_secs(10);

    fn fake_obabel(body: &str) -> (TempDir, BabelService) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("obabel");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        let service = BabelService::with_executable(&path).unwrap();
        (dir, service)
    }

    async fn collect<T>(mut handle: JobHandle<T>) -> (Vec<StepStatus>, Option<T>) {
        let mut progress = Vec::new();
        let drained = tokio::time::timeout(WAIT, async {
            while let Some(event) = handle.next_event().await {
                match event {
                    JobEvent::Progress(status) => progress.push(status),
                    JobEvent::Finished(value) => return Some(value),
                }
            }
            None
        })
        .await
        .expect("job must complete");
        assert!(handle.next_event().await.is_none());
        (progress, drained)
    }

    const FORMATS_SCRIPT: &str = r#"cat <<'EOF'
cml -- Chemical Markup Language
smi -- SMILES format
smiles -- SMILES format
EOF
echo "3 formats" >&2"#;

    #[tokio::test]
    #[serial]
    async fn format_listing_is_parsed() {
        let (_dir, service) = fake_obabel(FORMATS_SCRIPT);
        let handle = service.query_read_formats().unwrap();
        assert_eq!(handle.kind(), OperationKind::QueryReadFormats);

        let (progress, listing) = collect(handle).await;
        let listing = listing.unwrap();
        assert!(progress.is_empty());
        assert_eq!(listing.get("SMILES format"), ["smi", "smiles"]);
        assert_eq!(listing.get("Chemical Markup Language"), ["cml"]);
        assert!(!service.is_busy());
    }

    #[tokio::test]
    #[serial]
    async fn sequential_queries_give_independent_results() {
        let (_dir, service) = fake_obabel(FORMATS_SCRIPT);
        let first = collect(service.query_read_formats().unwrap()).await.1.unwrap();
        let second = collect(service.query_read_formats().unwrap()).await.1.unwrap();
        assert_eq!(first, second);
        assert_eq!(service.slot().acquisitions(), 2);
        assert_eq!(service.slot().releases(), 2);
    }

    #[tokio::test]
    #[serial]
    async fn forcefield_listing_is_parsed() {
        let (_dir, service) = fake_obabel(
            "echo 'GAFF    General Amber Force Field (GAFF).'\necho 'MMFF94  MMFF94 force field.'",
        );
        let listing = collect(service.query_forcefields().unwrap()).await.1.unwrap();
        assert_eq!(listing.get("GAFF"), ["General Amber Force Field (GAFF)"]);
        assert_eq!(listing.get("MMFF94"), ["MMFF94 force field"]);
    }

    #[tokio::test]
    #[serial]
    async fn read_file_passes_gen3d_for_smiles() {
        let (_dir, service) = fake_obabel("printf '%s\\n' \"$@\"");
        let handle = service.read_file(Path::new("mol.smi"), "cml", None).unwrap();
        let output = collect(handle).await.1.unwrap();
        assert_eq!(output, b"-ismi\nmol.smi\n-ocml\n--gen3d\n");
    }

    #[tokio::test]
    #[serial]
    async fn read_file_without_gen3d_for_xyz() {
        let (_dir, service) = fake_obabel("printf '%s\\n' \"$@\"");
        let handle = service.read_file(Path::new("mol.xyz"), "cml", None).unwrap();
        let output = collect(handle).await.1.unwrap();
        assert_eq!(output, b"-ixyz\nmol.xyz\n-ocml\n");
    }

    #[tokio::test]
    #[serial]
    async fn convert_streams_payload_through_stdin() {
        let (_dir, service) = fake_obabel("cat\necho '1 molecule converted' >&2");
        let options = vec!["-h".to_string()];
        let handle = service
            .convert(b"CCO\n".to_vec(), "smi", "mol", &options)
            .unwrap();
        let output = collect(handle).await.1.unwrap();
        assert_eq!(output, b"CCO\n");
    }

    #[tokio::test]
    #[serial]
    async fn zero_conversions_yields_empty_result() {
        let (_dir, service) = fake_obabel("echo 'partial'\necho '0 molecules converted' >&2");
        let handle = service.convert(b"??".to_vec(), "smi", "mol", &[]).unwrap();
        let output = collect(handle).await.1.unwrap();
        assert!(output.is_empty());
        assert!(!service.is_busy());
    }

    #[tokio::test]
    #[serial]
    async fn optimisation_reports_progress_before_result() {
        let (_dir, service) = fake_obabel(
            r#"cat >/dev/null
printf '\nA T O M   T Y P E S\n\nSTEPS = 3\n\n' >&2
printf 'STEP n     E    E0\n' >&2
printf '    1   -10.5   -10.0\n' >&2
printf '    2   -11.0   -10.5\n' >&2
printf '    3   -11.2   -11.0\n' >&2
echo '<molecule/>'"#,
        );
        let handle = service
            .optimize_geometry(b"<molecule/>".to_vec(), &["--ff".into(), "MMFF94".into()])
            .unwrap();
        let (progress, output) = collect(handle).await;

        assert_eq!(output.unwrap(), b"<molecule/>\n");
        assert_eq!(progress.first(), Some(&StepStatus::started(3)));
        let last = progress.last().unwrap();
        assert_eq!(last.step, 3);
        assert_eq!(last.max_steps, 3);
        assert_eq!(last.energy, -11.2);
        assert_eq!(last.last_energy, -11.0);
        assert!(progress.iter().skip(1).all(|status| status.step >= 1));
    }

    #[tokio::test]
    #[serial]
    async fn abort_discards_result_and_frees_slot() {
        let (_dir, service) = fake_obabel("exec sleep 5");
        let handle = service.optimize_geometry(b"<cml/>".to_vec(), &[]).unwrap();
        assert!(service.is_busy());
        assert!(service.abort());

        let result = tokio::time::timeout(WAIT, handle.finished())
            .await
            .expect("aborted job must end promptly");
        assert!(result.is_none());
        assert!(!service.is_busy());
        assert_eq!(service.slot().releases(), 1);
    }

    #[tokio::test]
    #[serial]
    async fn abort_silences_steps_logged_after_the_kill() {
        // The background writer outlives the killed shell and keeps stderr open.
        let (_dir, service) = fake_obabel(
            r#"cat >/dev/null
printf '\nSTEPS = 9\n\n1 -1.0 -1.0\n' >&2
( sleep 1; printf '2 -2.0 -1.0\n3 -3.0 -2.0\n' >&2 ) &
exec sleep 5"#,
        );
        let mut handle = service.optimize_geometry(b"<cml/>".to_vec(), &[]).unwrap();

        let mut before_abort = Vec::new();
        while before_abort.len() < 2 {
            match tokio::time::timeout(WAIT, handle.next_event()).await.unwrap() {
                Some(JobEvent::Progress(status)) => before_abort.push(status),
                other => panic!("expected progress, got {:?}", other.is_some()),
            }
        }
        assert_eq!(before_abort[0], StepStatus::started(9));
        assert_eq!(before_abort[1].step, 1);

        assert!(service.abort());
        let (after_abort, result) = collect(handle).await;
        assert!(after_abort.is_empty());
        assert!(result.is_none());
        assert!(!service.is_busy());
        assert_eq!(service.slot().releases(), 1);
    }

    #[tokio::test]
    #[serial]
    async fn second_request_is_refused_while_busy() {
        let (_dir, service) = fake_obabel("exec sleep 5");
        let running = service.query_forcefields().unwrap();

        let refused = service.read_file(Path::new("mol.smi"), "cml", None);
        assert!(matches!(
            refused,
            Err(EngineError::Busy {
                requested: OperationKind::ReadFile
            })
        ));
        assert_eq!(service.slot().acquisitions(), 1);

        service.abort();
        assert!(running.finished().await.is_none());
    }

    #[tokio::test]
    #[serial]
    async fn missing_executable_yields_empty_result() {
        let service = BabelService::with_executable("/nonexistent/bin/obabel").unwrap();
        let handle = service.convert(b"C".to_vec(), "smi", "mol", &[]).unwrap();
        let output = collect(handle).await.1.unwrap();
        assert!(output.is_empty());
        assert_eq!(service.slot().acquisitions(), service.slot().releases());
    }

    #[tokio::test]
    #[serial]
    async fn killed_tool_yields_empty_result() {
        let (_dir, service) = fake_obabel("echo 'CCO'\nkill -9 $$");
        let handle = service.convert(b"CCO".to_vec(), "smi", "smi", &[]).unwrap();
        let output = collect(handle).await.1.unwrap();
        assert!(output.is_empty());
    }

    #[tokio::test]
    #[serial]
    async fn clones_share_the_slot() {
        let (_dir, service) = fake_obabel("exec sleep 5");
        let other = service.clone();
        let handle = service.query_read_formats().unwrap();
        assert!(other.is_busy());
        assert!(other.abort());
        assert!(handle.finished().await.is_none());
    }

    #[test]
    fn operations_need_a_runtime() {
        let service = BabelService::with_executable("obabel").unwrap();
        assert!(matches!(service.query_forcefields(), Err(EngineError::NoRuntime)));
        assert!(!service.is_busy());
    }

    #[test]
    fn non_utf8_path_is_refused_without_taking_the_slot() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let service = BabelService::with_executable("obabel").unwrap();
        let path = Path::new(OsStr::from_bytes(b"mol\xff.smi"));
        match service.read_file(path, "cml", None) {
            Err(EngineError::NonUtf8Path(rejected)) => assert_eq!(rejected, path),
            other => panic!("expected NonUtf8Path, got {:?}", other.map(|h| h.kind())),
        }
        assert_eq!(service.slot().acquisitions(), 0);
    }

    #[test]
    fn empty_executable_is_rejected() {
        assert!(matches!(
            BabelService::with_executable(""),
            Err(EngineError::Config(_))
        ));
    }
}
