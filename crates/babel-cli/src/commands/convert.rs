use super::await_output;
use crate::cli::ConvertArgs;
use crate::config::ConvertSettings;
use crate::error::{CliError, Result};
use crate::utils::io;
use babelrun::workflows::service::BabelService;
use tracing::info;

pub async fn run(args: ConvertArgs, settings: &ConvertSettings, service: &BabelService) -> Result<()> {
    let input = io::read_input(args.input.as_deref()).await?;
    if input.is_empty() {
        return Err(CliError::Argument("Input structure is empty".to_string()));
    }

    let options = settings.obabel_options(&args.options);
    info!(
        "Converting {} bytes from '{}' to '{}'.",
        input.len(),
        &args.input_format,
        &args.output_format
    );
    let handle = service.convert(input, &args.input_format, &args.output_format, &options)?;
    let output = await_output(handle).await?;
    io::write_output(args.output.as_deref(), &output).await
}
