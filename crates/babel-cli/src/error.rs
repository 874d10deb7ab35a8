use babelrun::engine::error::EngineError;
use babelrun::engine::job::OperationKind;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("obabel produced no usable output for '{0}' (run with -v to see its diagnostics)")]
    EmptyResult(OperationKind),

    #[error("'{0}' was aborted before it completed")]
    Aborted(OperationKind),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
