//! Output path resolution.

use std::path::{Path, PathBuf};

use super::TemplateError;

/// Suffix stripped from an input file name to derive its output.
pub const TEMPLATE_SUFFIX: &str = ".in";

/// Derive the destination of `input` by stripping [`TEMPLATE_SUFFIX`].
pub fn derive_output(input: &Path) -> Result<PathBuf, TemplateError> {
    let file_name = input
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| no_destination(input))?;

    match file_name.strip_suffix(TEMPLATE_SUFFIX) {
        Some(stem) if !stem.is_empty() => Ok(input.with_file_name(stem)),
        _ => Err(no_destination(input)),
    }
}

/// Pair every input with its destination.
///
/// An explicit output is only valid with exactly one input.
pub fn resolve_outputs(
    inputs: &[PathBuf],
    explicit: Option<&Path>,
) -> Result<Vec<(PathBuf, PathBuf)>, TemplateError> {
    if let Some(output) = explicit {
        return match inputs {
            [input] => Ok(vec![(input.clone(), output.to_path_buf())]),
            _ => Err(TemplateError::OutputResolution(format!(
                "an explicit output path requires exactly one input file, got {}",
                inputs.len()
            ))),
        };
    }

    inputs
        .iter()
        .map(|input| Ok((input.clone(), derive_output(input)?)))
        .collect()
}

fn no_destination(input: &Path) -> TemplateError {
    TemplateError::OutputResolution(format!(
        "cannot derive an output path for {}: name does not end in '{}' and no output was given",
        input.display(),
        TEMPLATE_SUFFIX
    ))
}
