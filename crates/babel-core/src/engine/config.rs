use std::ffi::OsString;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable that overrides the `obabel` executable.
pub const EXECUTABLE_ENV_VAR: &str = "OBABEL_EXECUTABLE";
pub const DEFAULT_EXECUTABLE: &str = "obabel";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub executable: PathBuf,
}

impl ServiceConfig {
    /// Configuration using the `OBABEL_EXECUTABLE` override, or `obabel` from `PATH`.
    pub fn from_env() -> Self {
        Self {
            executable: resolve_executable(std::env::var_os(EXECUTABLE_ENV_VAR)),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from(DEFAULT_EXECUTABLE),
        }
    }
}

/// An empty override counts as unset.
pub fn resolve_executable(override_value: Option<OsString>) -> PathBuf {
    match override_value {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => PathBuf::from(DEFAULT_EXECUTABLE),
    }
}

#[derive(Default)]
pub struct ServiceConfigBuilder {
    executable: Option<PathBuf>,
}

impl ServiceConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from the environment-resolved executable.
    pub fn from_env() -> Self {
        Self {
            executable: Some(ServiceConfig::from_env().executable),
        }
    }

    pub fn executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    pub fn build(self) -> Result<ServiceConfig, ConfigError> {
        let executable = self
            .executable
            .ok_or(ConfigError::MissingParameter("executable"))?;
        if executable.as_os_str().is_empty() {
            return Err(ConfigError::InvalidParameter {
                parameter: "executable",
                reason: "path is empty".to_string(),
            });
        }
        Ok(ServiceConfig { executable })
    }
}
