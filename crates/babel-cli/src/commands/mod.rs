pub mod convert;
pub mod optimize;
pub mod query;
pub mod read;

use crate::error::{CliError, Result};
use babelrun::engine::progress::JobHandle;

/// Waits for a job that reports no progress and turns "no result" into an error.
pub(crate) async fn await_output(handle: JobHandle<Vec<u8>>) -> Result<Vec<u8>> {
    let kind = handle.kind();
    let output = handle.finished().await.ok_or(CliError::Aborted(kind))?;
    if output.is_empty() {
        return Err(CliError::EmptyResult(kind));
    }
    Ok(output)
}
