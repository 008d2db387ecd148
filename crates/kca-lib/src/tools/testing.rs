use super::{ToolError, Toolchain};
use std::cell::RefCell;
use std::path::Path;

/// Step a [`RecordingToolchain`] is told to fail at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FailAt {
    Ar,
    Tar,
    Disassemble,
}

/// Fake toolchain that records invocations and creates the files the real
/// tools would produce.
#[derive(Default)]
pub(crate) struct RecordingToolchain {
    pub(crate) calls: RefCell<Vec<String>>,
    pub(crate) fail_at: Option<FailAt>,
    /// Makes `ar` succeed without extracting anything, like GNU ar does for
    /// a member that is not in the archive.
    pub(crate) skip_ar_output: bool,
}

impl RecordingToolchain {
    pub(crate) fn failing_at(step: FailAt) -> Self {
        Self {
            fail_at: Some(step),
            ..Self::default()
        }
    }

    pub(crate) fn without_ar_output() -> Self {
        Self {
            skip_ar_output: true,
            ..Self::default()
        }
    }

    fn failure(&self, step: FailAt, program: &str) -> Result<(), ToolError> {
        if self.fail_at == Some(step) {
            return Err(ToolError::Spawn {
                program: program.to_string(),
                source: std::io::Error::other("simulated failure"),
            });
        }
        Ok(())
    }
}

fn write(path: &Path, contents: &[u8]) -> Result<(), ToolError> {
    let io_error = |source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::write(path, contents).map_err(io_error)
}

impl Toolchain for RecordingToolchain {
    async fn extract_ar_member(
        &self,
        archive: &Path,
        member: &str,
        destination: &Path,
    ) -> Result<(), ToolError> {
        self.calls
            .borrow_mut()
            .push(format!("ar {} {}", archive.display(), member));
        self.failure(FailAt::Ar, "ar")?;
        if self.skip_ar_output {
            return Ok(());
        }
        write(&destination.join(member), b"tarball")
    }

    async fn extract_tar_path(
        &self,
        tarball: &Path,
        member: &Path,
        destination: &Path,
    ) -> Result<(), ToolError> {
        self.calls
            .borrow_mut()
            .push(format!("tar {} {}", tarball.display(), member.display()));
        self.failure(FailAt::Tar, "tar")?;
        write(&destination.join(member), b"\x7fELF")
    }

    async fn disassemble(&self, binary: &Path, output: &Path) -> Result<(), ToolError> {
        self.calls
            .borrow_mut()
            .push(format!("objdump {}", binary.display()));
        self.failure(FailAt::Disassemble, "objdump")?;
        write(output, b"vmlinux:     file format elf64-x86-64\n")
    }
}

pub(crate) fn recorded(tools: &RecordingToolchain) -> Vec<String> {
    tools.calls.borrow().clone()
}
