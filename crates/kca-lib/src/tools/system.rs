use super::{ToolError, Toolchain};
use crate::config::ToolsConfig;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Runs `ar`, `tar` and `objdump` as child processes.
#[derive(Clone, Debug)]
pub struct SystemToolchain {
    ar: PathBuf,
    tar: PathBuf,
    objdump: PathBuf,
}

impl SystemToolchain {
    pub fn from_config(tools: &ToolsConfig) -> Self {
        Self {
            ar: tools.ar.clone(),
            tar: tools.tar.clone(),
            objdump: tools.objdump.clone(),
        }
    }
}

impl Default for SystemToolchain {
    fn default() -> Self {
        Self::from_config(&ToolsConfig::default())
    }
}

fn resolve_program(program: &Path) -> Result<PathBuf, ToolError> {
    which::which(program).map_err(|source| ToolError::NotFound {
        program: program.display().to_string(),
        source,
    })
}

/// Runs `program` to completion. Stdout goes to `stdout` when given and is
/// discarded otherwise; stderr is captured for the error message.
async fn run_program(
    program: &Path,
    args: &[&OsStr],
    current_dir: Option<&Path>,
    stdout: Option<std::fs::File>,
) -> Result<(), ToolError> {
    let resolved = resolve_program(program)?;
    let program_name = program.display().to_string();

    let mut command = Command::new(&resolved);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(stdout.map_or_else(Stdio::null, Stdio::from))
        .stderr(Stdio::piped());
    if let Some(current_dir) = current_dir {
        command.current_dir(current_dir);
    }

    tracing::debug!(command = ?command.as_std(), "Running external tool");
    let spawn_error = |source| ToolError::Spawn {
        program: program_name.clone(),
        source,
    };
    // `Command::output` would replace the stdout redirect with a pipe.
    let output = command
        .spawn()
        .map_err(spawn_error)?
        .wait_with_output()
        .await
        .map_err(spawn_error)?;

    if !output.status.success() {
        return Err(ToolError::Failed {
            program: program_name,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    tracing::trace!(program = %program_name, "External tool finished");
    Ok(())
}

impl Toolchain for SystemToolchain {
    async fn extract_ar_member(
        &self,
        archive: &Path,
        member: &str,
        destination: &Path,
    ) -> Result<(), ToolError> {
        // `ar x` writes into its working directory, so the archive path must
        // survive the directory change.
        let archive = std::path::absolute(archive).map_err(|source| ToolError::Io {
            path: archive.to_path_buf(),
            source,
        })?;

        run_program(
            &self.ar,
            &[OsStr::new("x"), archive.as_os_str(), OsStr::new(member)],
            Some(destination),
            None,
        )
        .await
    }

    async fn extract_tar_path(
        &self,
        tarball: &Path,
        member: &Path,
        destination: &Path,
    ) -> Result<(), ToolError> {
        run_program(
            &self.tar,
            &[
                OsStr::new("-x"),
                OsStr::new("-J"),
                OsStr::new("-f"),
                tarball.as_os_str(),
                OsStr::new("-C"),
                destination.as_os_str(),
                OsStr::new("--"),
                member.as_os_str(),
            ],
            None,
            None,
        )
        .await
    }

    async fn disassemble(&self, binary: &Path, output: &Path) -> Result<(), ToolError> {
        let output_file = tokio::fs::File::create(output)
            .await
            .map_err(|source| ToolError::Io {
                path: output.to_path_buf(),
                source,
            })?
            .into_std()
            .await;

        run_program(
            &self.objdump,
            &[
                OsStr::new("-l"),
                OsStr::new("-D"),
                OsStr::new("--"),
                binary.as_os_str(),
            ],
            None,
            Some(output_file),
        )
        .await
    }
}
