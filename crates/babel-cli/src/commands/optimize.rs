use crate::cli::OptimizeArgs;
use crate::config::OptimizeSettings;
use crate::error::{CliError, Result};
use crate::utils::io;
use crate::utils::progress::OptimizationProgress;
use babelrun::engine::progress::{JobEvent, JobHandle};
use babelrun::workflows::service::BabelService;
use std::future::Future;
use tracing::{info, warn};

pub async fn run(args: OptimizeArgs, settings: &OptimizeSettings, service: &BabelService) -> Result<()> {
    let cml = io::read_input(Some(&args.input)).await?;
    let options = settings.obabel_options(&args.options);

    info!(
        "Minimising {:?} with {} (at most {} steps).",
        &args.input, &settings.forcefield, settings.steps
    );
    let handle = service.optimize_geometry(cml, &options)?;

    let progress = OptimizationProgress::new();
    let result = drive(handle, service, &progress, tokio::signal::ctrl_c()).await;
    match &result {
        Ok(_) => progress.finish(),
        Err(CliError::Aborted(_)) => progress.abandon("Aborted"),
        Err(_) => progress.abandon("Failed"),
    }

    io::write_output(args.output.as_deref(), &result?).await
}

/// Renders progress until the result arrives. When `interrupt` resolves first
/// the job is aborted and the remaining events are drained.
async fn drive<I>(
    mut handle: JobHandle<Vec<u8>>,
    service: &BabelService,
    progress: &OptimizationProgress,
    interrupt: I,
) -> Result<Vec<u8>>
where
    I: Future<Output = std::io::Result<()>>,
{
    let kind = handle.kind();
    tokio::pin!(interrupt);
    let mut interrupted = false;

    loop {
        tokio::select! {
            event = handle.next_event() => match event {
                Some(JobEvent::Progress(status)) => progress.update(&status),
                Some(JobEvent::Finished(output)) if output.is_empty() => {
                    return Err(CliError::EmptyResult(kind));
                }
                Some(JobEvent::Finished(output)) => return Ok(output),
                None => return Err(CliError::Aborted(kind)),
            },
            signal = &mut interrupt, if !interrupted => {
                interrupted = true;
                if let Err(e) = signal {
                    warn!("Could not listen for Ctrl-C: {}", e);
                    continue;
                }
                warn!("Interrupted; aborting the optimisation.");
                service.abort();
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn fake_obabel(body: &str) -> (TempDir, BabelService) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("obabel");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        let service = BabelService::with_executable(&path).unwrap();
        (dir, service)
    }

    #[tokio::test]
    #[serial]
    async fn result_is_returned_after_progress() {
        let (_dir, service) = fake_obabel(
            "cat >/dev/null\nprintf '\\nSTEPS = 4\\n\\n1 -1.0 -0.5\\n' >&2\necho '<cml/>'",
        );
        let handle = service.optimize_geometry(b"<cml/>".to_vec(), &[]).unwrap();
        let progress = OptimizationProgress::hidden();

        let output = drive(handle, &service, &progress, std::future::pending())
            .await
            .unwrap();
        assert_eq!(output, b"<cml/>\n");
        assert_eq!(progress.step_budget(), Some(4));
    }

    #[tokio::test]
    #[serial]
    async fn interrupt_aborts_the_job() {
        let (_dir, service) = fake_obabel("exec sleep 5");
        let handle = service.optimize_geometry(b"<cml/>".to_vec(), &[]).unwrap();
        let progress = OptimizationProgress::hidden();

        let result = drive(handle, &service, &progress, async { Ok(()) }).await;
        assert!(matches!(result, Err(CliError::Aborted(_))));
        assert!(!service.is_busy());
    }

    #[tokio::test]
    #[serial]
    async fn rejected_optimisation_is_an_empty_result() {
        let (_dir, service) = fake_obabel("cat >/dev/null\necho '0 molecules converted' >&2");
        let handle = service.optimize_geometry(b"<cml/>".to_vec(), &[]).unwrap();
        let progress = OptimizationProgress::hidden();

        let result = drive(handle, &service, &progress, std::future::pending()).await;
        assert!(matches!(result, Err(CliError::EmptyResult(_))));
    }
}
