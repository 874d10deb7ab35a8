use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "babelrun contributors",
    version,
    about = "babelrun - Run Open Babel conversions, listings and geometry optimisations as supervised jobs.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    /// Defaults to `config.toml` in the platform configuration directory, if present.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to the obabel executable, overriding OBABEL_EXECUTABLE and the config file
    #[arg(long, global = true, value_name = "PATH")]
    pub obabel: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S optimize.steps=200
    #[arg(short = 'S', long = "set", global = true, value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the file formats obabel can read.
    Formats,
    /// List the force fields available for optimisation.
    Forcefields,
    /// Read a structure file and print it in another format.
    Read(ReadArgs),
    /// Convert a structure given on standard input or in a file.
    Convert(ConvertArgs),
    /// Minimise the geometry of a CML structure.
    Optimize(OptimizeArgs),
}

/// Arguments for the `read` subcommand.
#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Structure file to read.
    #[arg(required = true, value_name = "FILE")]
    pub file: PathBuf,

    /// Output format (e.g., cml, sdf, xyz).
    #[arg(short = 'f', long = "output-format", required = true, value_name = "FORMAT")]
    pub output_format: String,

    /// Input format. Defaults to the file extension.
    #[arg(short = 'i', long = "input-format", value_name = "FORMAT")]
    pub input_format: Option<String>,

    /// Write the result to this file instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `convert` subcommand.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Read the structure from this file instead of standard input.
    #[arg(short = 'I', long = "input", value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Format of the input structure.
    #[arg(short = 'i', long = "input-format", required = true, value_name = "FORMAT")]
    pub input_format: String,

    /// Output format.
    #[arg(short = 'f', long = "output-format", required = true, value_name = "FORMAT")]
    pub output_format: String,

    /// Write the result to this file instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Extra options passed to obabel verbatim (after `--`).
    #[arg(last = true, value_name = "OBABEL_OPTIONS")]
    pub options: Vec<String>,
}

/// Arguments for the `optimize` subcommand.
#[derive(Args, Debug)]
pub struct OptimizeArgs {
    /// CML file holding the structure to minimise.
    #[arg(short = 'I', long = "input", required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Override the force field from the config file (e.g., MMFF94, UFF, GAFF).
    #[arg(long, value_name = "NAME")]
    pub forcefield: Option<String>,

    /// Override the maximum number of minimisation steps.
    #[arg(long, value_name = "INT")]
    pub steps: Option<u32>,

    /// Write the optimised CML to this file instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Extra options passed to obabel verbatim (after `--`).
    #[arg(last = true, value_name = "OBABEL_OPTIONS")]
    pub options: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_are_accepted_after_subcommand() {
        let cli = Cli::try_parse_from([
            "babelrun", "formats", "-vv", "--obabel", "/opt/bin/obabel", "-S", "optimize.steps=5",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Formats));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.obabel, Some(PathBuf::from("/opt/bin/obabel")));
        assert_eq!(cli.set_values, vec!["optimize.steps=5"]);
    }

    #[test]
    fn convert_collects_trailing_obabel_options() {
        let cli = Cli::try_parse_from([
            "babelrun", "convert", "-i", "smi", "-f", "sdf", "--", "-h", "--title", "x",
        ])
        .unwrap();
        let Commands::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert!(args.input.is_none());
        assert_eq!(args.input_format, "smi");
        assert_eq!(args.output_format, "sdf");
        assert_eq!(args.options, vec!["-h", "--title", "x"]);
    }

    #[test]
    fn read_requires_output_format() {
        assert!(Cli::try_parse_from(["babelrun", "read", "mol.smi"]).is_err());
        let cli = Cli::try_parse_from(["babelrun", "read", "mol.smi", "-f", "cml"]).unwrap();
        let Commands::Read(args) = cli.command else {
            panic!("expected read");
        };
        assert_eq!(args.file, PathBuf::from("mol.smi"));
        assert!(args.input_format.is_none());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["babelrun", "formats", "-q", "-v"]).is_err());
    }

    #[test]
    fn optimize_parses_overrides() {
        let cli = Cli::try_parse_from([
            "babelrun", "optimize", "-I", "in.cml", "--forcefield", "UFF", "--steps", "50",
        ])
        .unwrap();
        let Commands::Optimize(args) = cli.command else {
            panic!("expected optimize");
        };
        assert_eq!(args.forcefield.as_deref(), Some("UFF"));
        assert_eq!(args.steps, Some(50));
        assert!(args.options.is_empty());
    }
}
