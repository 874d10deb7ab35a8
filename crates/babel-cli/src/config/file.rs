use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileObabelConfig {
    pub executable: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileOptimizeConfig {
    pub forcefield: Option<String>,
    pub steps: Option<u32>,
    pub options: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConvertConfig {
    pub options: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub obabel: Option<FileObabelConfig>,
    pub optimize: Option<FileOptimizeConfig>,
    pub convert: Option<FileConvertConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Applies `KEY=VALUE` overrides. List values are split on whitespace.
    pub fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value) = kv_pair.split_once('=').ok_or_else(|| {
                CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                ))
            })?;

            match key {
                "obabel.executable" => {
                    self.obabel.get_or_insert_with(Default::default).executable =
                        Some(PathBuf::from(value));
                }
                "optimize.forcefield" => {
                    self.optimize.get_or_insert_with(Default::default).forcefield =
                        Some(value.to_string());
                }
                "optimize.steps" => {
                    self.optimize.get_or_insert_with(Default::default).steps =
                        Some(value.parse().map_err(|_| {
                            CliError::Config(format!(
                                "Invalid integer value for {}: {}",
                                key, value
                            ))
                        })?);
                }
                "optimize.options" => {
                    self.optimize.get_or_insert_with(Default::default).options =
                        Some(split_options(value));
                }
                "convert.options" => {
                    self.convert.get_or_insert_with(Default::default).options =
                        Some(split_options(value));
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn split_options(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn full_file_is_parsed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [obabel]
            executable = "/opt/openbabel/bin/obabel"

            [optimize]
            forcefield = "UFF"
            steps = 300
            options = ["--crit", "1e-7"]

            [convert]
            options = ["-h"]
            "#,
        )
        .unwrap();

        let config = FileConfig::from_file(&path).unwrap();
        assert_eq!(
            config.obabel.unwrap().executable,
            Some(PathBuf::from("/opt/openbabel/bin/obabel"))
        );
        let optimize = config.optimize.unwrap();
        assert_eq!(optimize.forcefield.as_deref(), Some("UFF"));
        assert_eq!(optimize.steps, Some(300));
        assert_eq!(optimize.options, Some(vec!["--crit".into(), "1e-7".into()]));
        assert_eq!(config.convert.unwrap().options, Some(vec!["-h".into()]));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[optimize]\nsteeps = 10\n").unwrap();

        let result = FileConfig::from_file(&path);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let result = FileConfig::from_file(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(CliError::Io(_))));
    }

    #[test]
    fn set_values_fill_every_supported_key() {
        let mut config = FileConfig::default();
        config
            .apply_set_values(&[
                "obabel.executable=/usr/bin/obabel".into(),
                "optimize.forcefield=GAFF".into(),
                "optimize.steps=42".into(),
                "optimize.options=--crit 1e-6  --sd".into(),
                "convert.options=-h".into(),
            ])
            .unwrap();

        assert_eq!(
            config.obabel.unwrap().executable,
            Some(PathBuf::from("/usr/bin/obabel"))
        );
        let optimize = config.optimize.unwrap();
        assert_eq!(optimize.forcefield.as_deref(), Some("GAFF"));
        assert_eq!(optimize.steps, Some(42));
        assert_eq!(
            optimize.options,
            Some(vec!["--crit".into(), "1e-6".into(), "--sd".into()])
        );
        assert_eq!(config.convert.unwrap().options, Some(vec!["-h".into()]));
    }

    #[test]
    fn set_values_reject_bad_input() {
        let mut config = FileConfig::default();
        assert!(matches!(
            config.apply_set_values(&["optimize.steps".into()]),
            Err(CliError::Config(_))
        ));
        assert!(matches!(
            config.apply_set_values(&["optimize.steps=many".into()]),
            Err(CliError::Config(_))
        ));
        assert!(matches!(
            config.apply_set_values(&["optimize.speed=1".into()]),
            Err(CliError::Config(_))
        ));
    }
}
