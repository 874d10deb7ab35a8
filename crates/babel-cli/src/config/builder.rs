use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::{AppConfig, ConvertSettings, OptimizeSettings};
use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use babelrun::engine::config::ServiceConfigBuilder;
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::debug;

pub fn build_config(cli: &Cli) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let mut file_config = match &cli.config {
        Some(path) => FileConfig::from_file(path)?,
        None => match default_config_path() {
            Some(path) if path.is_file() => FileConfig::from_file(&path)?,
            _ => FileConfig::default(),
        },
    };
    file_config.apply_set_values(&cli.set_values)?;

    let obabel_file = file_config.obabel.take().unwrap_or_default();
    let mut service = ServiceConfigBuilder::from_env();
    if let Some(executable) = cli.obabel.clone().or(obabel_file.executable) {
        service = service.executable(executable);
    }
    let service = service
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let opt_file = file_config.optimize.take().unwrap_or_default();
    let (forcefield_flag, steps_flag) = match &cli.command {
        Commands::Optimize(args) => (args.forcefield.clone(), args.steps),
        _ => (None, None),
    };
    let optimize = OptimizeSettings {
        forcefield: forcefield_flag
            .or(opt_file.forcefield)
            .unwrap_or(defaults.forcefield),
        steps: steps_flag.or(opt_file.steps).unwrap_or(defaults.steps),
        options: opt_file.options.unwrap_or(defaults.optimize_options),
    };
    if optimize.forcefield.trim().is_empty() {
        return Err(CliError::Config(
            "`optimize.forcefield` must not be empty".to_string(),
        ));
    }

    let convert = ConvertSettings {
        options: file_config
            .convert
            .take()
            .and_then(|c| c.options)
            .unwrap_or(defaults.convert_options),
    };

    debug!(
        "Resolved configuration: executable {:?}, optimize {:?}",
        service.executable, optimize
    );
    Ok(AppConfig {
        service,
        optimize,
        convert,
    })
}

/// `config.toml` in the platform configuration directory.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "openbabel", "babelrun")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
