use super::await_output;
use crate::cli::ReadArgs;
use crate::error::{CliError, Result};
use crate::utils::io;
use babelrun::workflows::service::BabelService;
use tracing::info;

pub async fn run(args: ReadArgs, service: &BabelService) -> Result<()> {
    if !args.file.is_file() {
        return Err(CliError::Argument(format!(
            "Input file does not exist: {}",
            args.file.display()
        )));
    }

    info!(
        "Reading {:?} as '{}'.",
        &args.file, &args.output_format
    );
    let handle = service.read_file(&args.file, &args.output_format, args.input_format.as_deref())?;
    let output = await_output(handle).await?;
    io::write_output(args.output.as_deref(), &output).await
}
