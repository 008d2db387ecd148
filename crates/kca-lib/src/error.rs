use crate::dump::DumpError;
use crate::fetch::FetchError;
use crate::listing::{Architecture, ListingError};
use crate::unpack::UnpackError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KcaError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid command-line arguments: {details}")]
    CliArgumentValidation { details: String },

    #[error("Failed to read package listing: {0}")]
    Listing(#[from] ListingError),

    #[error("Failed to fetch debug package: {0}")]
    Fetch(#[from] FetchError),

    #[error("Failed to unpack debug package: {0}")]
    Unpack(#[from] UnpackError),

    #[error("Failed to dump kernel symbols: {0}")]
    Dump(#[from] DumpError),

    #[error("No debug package found for kernel {version} on {architecture}")]
    KernelNotFound {
        architecture: Architecture,
        version: String,
    },

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] eyre::Report),
}

/// Exit status for a run that found no debug package for the kernel.
pub const EXIT_KERNEL_NOT_FOUND: u8 = 2;

impl KcaError {
    /// Exit status for errors that end the run without an error report.
    pub fn quiet_exit_status(&self) -> Option<u8> {
        match self {
            KcaError::KernelNotFound { .. } => Some(EXIT_KERNEL_NOT_FOUND),
            _ => None,
        }
    }
}
