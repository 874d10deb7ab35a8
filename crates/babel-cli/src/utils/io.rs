use crate::error::{CliError, Result};
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info};

/// Reads the whole input file, or standard input when no path is given.
pub async fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => {
            debug!("Reading input from {:?}", path);
            tokio::fs::read(path).await.map_err(|e| {
                CliError::Argument(format!("Cannot read input '{}': {}", path.display(), e))
            })
        }
        None => {
            debug!("Reading input from standard input.");
            let mut buffer = Vec::new();
            tokio::io::stdin().read_to_end(&mut buffer).await?;
            Ok(buffer)
        }
    }
}

/// Writes the result to `path`, or to standard output when no path is given.
pub async fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            tokio::fs::write(path, bytes).await?;
            info!("Wrote {} bytes to {:?}", bytes.len(), path);
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(bytes).await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}
