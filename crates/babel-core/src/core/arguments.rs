use phf::{Set, phf_set};
use std::path::Path;

/// Input formats that never carry 3D coordinates. Reading one of these
/// requires `--gen3d` so that downstream consumers receive positions.
static FORMATS_WITHOUT_COORDINATES: Set<&'static str> = phf_set! {
    "smi", "inchi", "can",
};

pub const GENERATE_3D_FLAG: &str = "--gen3d";
pub const MINIMIZE_FLAG: &str = "--minimize";

pub fn input_format_flag(format: &str) -> String {
    format!("-i{}", format)
}

pub fn output_format_flag(format: &str) -> String {
    format!("-o{}", format)
}

pub fn needs_coordinate_generation(format: &str) -> bool {
    FORMATS_WITHOUT_COORDINATES.contains(format)
}

/// Picks the input format for a file: the explicit override when given,
/// otherwise the file extension (empty when the file has none).
pub fn infer_input_format(path: &Path, override_format: Option<&str>) -> String {
    match override_format {
        Some(format) if !format.is_empty() => format.to_string(),
        _ => path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

pub fn read_formats_args() -> Vec<String> {
    vec!["-L".into(), "formats".into(), "read".into()]
}

pub fn forcefields_args() -> Vec<String> {
    vec!["-L".into(), "forcefields".into()]
}

/// Arguments for reading `file`. The caller supplies the path as UTF-8 text,
/// since it is passed to `obabel` verbatim.
pub fn read_file_args(file: &str, output_format: &str, override_format: Option<&str>) -> Vec<String> {
    let input_format = infer_input_format(Path::new(file), override_format);
    let mut args = vec![
        input_format_flag(&input_format),
        file.to_string(),
        output_format_flag(output_format),
    ];
    if needs_coordinate_generation(&input_format) {
        args.push(GENERATE_3D_FLAG.into());
    }
    args
}

pub fn convert_args(input_format: &str, output_format: &str, options: &[String]) -> Vec<String> {
    let mut args = vec![input_format_flag(input_format), output_format_flag(output_format)];
    args.extend(options.iter().cloned());
    args
}

pub fn optimize_args(options: &[String]) -> Vec<String> {
    let mut args = vec![
        input_format_flag("cml"),
        output_format_flag("cml"),
        MINIMIZE_FLAG.into(),
    ];
    args.extend(options.iter().cloned());
    args
}
