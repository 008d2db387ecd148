use crate::tools::{ToolError, Toolchain};
use crate::utils::vmlinux_relative_path;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DumpError {
    #[error("Disassembling {binary} into {output} failed: {source}")]
    Disassemble {
        binary: PathBuf,
        output: PathBuf,
        source: ToolError,
    },
}

/// Disassembles the unpacked kernel image for `kernel_version` into `output`.
///
/// `output` is taken as given, so a relative path lands in the working
/// directory rather than next to the unpacked image.
pub async fn dump<T: Toolchain>(
    tools: &T,
    directory: &Path,
    kernel_version: &str,
    output: &Path,
) -> Result<PathBuf, DumpError> {
    let binary = directory.join(vmlinux_relative_path(kernel_version));
    tracing::info!(binary = %binary.display(), output = %output.display(), "Dumping symbols");

    tools
        .disassemble(&binary, output)
        .await
        .map_err(|source| DumpError::Disassemble {
            binary: binary.clone(),
            output: output.to_path_buf(),
            source,
        })?;

    Ok(output.to_path_buf())
}
