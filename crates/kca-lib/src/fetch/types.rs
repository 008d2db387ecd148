use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Size of the pieces the response body is written in.
pub const CHUNK_SIZE: usize = 1024;

#[derive(Clone, Debug)]
pub struct DownloadTarget {
    pub directory: PathBuf,
    pub file_name: String,
    pub expected_size: u64,
    /// `None` when the file does not exist yet.
    pub on_disk_size: Option<u64>,
}

impl DownloadTarget {
    /// Records the current on-disk size of `directory/file_name`.
    pub async fn inspect(
        directory: &Path,
        file_name: &str,
        expected_size: u64,
    ) -> std::io::Result<Self> {
        let path = directory.join(file_name);
        let on_disk_size = match tokio::fs::metadata(&path).await {
            Ok(metadata) => Some(metadata.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e),
        };

        Ok(Self {
            directory: directory.to_path_buf(),
            file_name: file_name.to_string(),
            expected_size,
            on_disk_size,
        })
    }

    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }

    /// An absent file is always incomplete, even when zero bytes are expected.
    pub fn state(&self) -> PartialFileState {
        match self.on_disk_size {
            Some(on_disk_size) => PartialFileState::from_sizes(on_disk_size, self.expected_size),
            None => PartialFileState::Incomplete { resume_from: 0 },
        }
    }
}

/// Completeness of a local file, judged by size alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartialFileState {
    Complete,
    /// `resume_from` is 0 for an absent file and for one larger than expected.
    Incomplete { resume_from: u64 },
}

impl PartialFileState {
    pub fn from_sizes(on_disk_size: u64, expected_size: u64) -> Self {
        if on_disk_size == expected_size {
            PartialFileState::Complete
        } else if on_disk_size < expected_size {
            PartialFileState::Incomplete {
                resume_from: on_disk_size,
            }
        } else {
            PartialFileState::Incomplete { resume_from: 0 }
        }
    }

    /// Value of the `Range` header that requests the missing suffix.
    pub fn range_header(&self, expected_size: u64) -> Option<String> {
        match *self {
            PartialFileState::Incomplete { resume_from } if resume_from > 0 => {
                Some(format!("bytes={}-{}", resume_from, expected_size - 1))
            }
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    AlreadyComplete,
    Downloaded { resumed_from: u64, bytes_written: u64 },
}
