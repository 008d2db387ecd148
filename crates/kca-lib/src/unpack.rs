use crate::tools::{ToolError, Toolchain};
use crate::utils::{DATA_ARCHIVE_MEMBER, vmlinux_relative_path};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UnpackError {
    #[error("Extracting {member} from {archive} failed: {source}")]
    Archive {
        archive: PathBuf,
        member: String,
        source: ToolError,
    },

    #[error("Extracting {member} from {tarball} failed: {source}")]
    Tarball {
        tarball: PathBuf,
        member: PathBuf,
        source: ToolError,
    },

    #[error("{archive} has no member {member}")]
    MissingMember { archive: PathBuf, member: String },

    #[error("Failed to remove {path}: {source}")]
    Cleanup {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Pulls the kernel image for `kernel_version` out of the downloaded package.
///
/// Only `data.tar.xz` is taken from the package, and only the vmlinux path
/// from that tarball. The tarball is removed once the image is extracted;
/// nothing is cleaned up when a step fails.
pub async fn unpack<T: Toolchain>(
    tools: &T,
    directory: &Path,
    kernel_version: &str,
    archive_file_name: &str,
) -> Result<PathBuf, UnpackError> {
    let archive = directory.join(archive_file_name);
    tracing::info!(archive = %archive.display(), "Unpacking");
    tools
        .extract_ar_member(&archive, DATA_ARCHIVE_MEMBER, directory)
        .await
        .map_err(|source| UnpackError::Archive {
            archive: archive.clone(),
            member: DATA_ARCHIVE_MEMBER.to_string(),
            source,
        })?;

    // GNU ar exits successfully when the requested member is absent.
    let tarball = directory.join(DATA_ARCHIVE_MEMBER);
    if !tokio::fs::try_exists(&tarball).await.unwrap_or(false) {
        return Err(UnpackError::MissingMember {
            archive,
            member: DATA_ARCHIVE_MEMBER.to_string(),
        });
    }

    let member = vmlinux_relative_path(kernel_version);
    tracing::info!(tarball = %tarball.display(), member = %member.display(), "Extracting kernel image");
    tools
        .extract_tar_path(&tarball, &member, directory)
        .await
        .map_err(|source| UnpackError::Tarball {
            tarball: tarball.clone(),
            member: member.clone(),
            source,
        })?;

    tracing::info!(path = %tarball.display(), "Removing");
    tokio::fs::remove_file(&tarball)
        .await
        .map_err(|source| UnpackError::Cleanup {
            path: tarball.clone(),
            source,
        })?;

    Ok(directory.join(member))
}
