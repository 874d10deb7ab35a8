use std::path::PathBuf;
use thiserror::Error;

use super::config::ConfigError;
use super::job::OperationKind;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Process already in use: cannot start '{requested}' while another job is running")]
    Busy { requested: OperationKind },

    #[error("Operations must be started from within a Tokio runtime")]
    NoRuntime,

    #[error("Input path {} is not valid UTF-8", .0.display())]
    NonUtf8Path(PathBuf),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
