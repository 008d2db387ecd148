//! External programs the pipeline delegates archive handling and
//! disassembly to.
//!
//! The pipeline only talks to [`Toolchain`], so the system binaries can be
//! swapped for other implementations (tests use a recording fake).

mod system;

#[cfg(test)]
pub(crate) mod testing;

pub use system::SystemToolchain;

use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Could not locate {program}: {source}")]
    NotFound {
        program: String,
        source: which::Error,
    },

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Failed to prepare {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[allow(async_fn_in_trait)]
pub trait Toolchain {
    /// Extracts the single member `member` of the `ar` archive into `destination`.
    async fn extract_ar_member(
        &self,
        archive: &Path,
        member: &str,
        destination: &Path,
    ) -> Result<(), ToolError>;

    /// Extracts the single path `member` of an XZ-compressed tarball into
    /// `destination`, keeping its directory structure.
    async fn extract_tar_path(
        &self,
        tarball: &Path,
        member: &Path,
        destination: &Path,
    ) -> Result<(), ToolError>;

    /// Writes a line-annotated disassembly of `binary` to `output`.
    async fn disassemble(&self, binary: &Path, output: &Path) -> Result<(), ToolError>;
}
