use super::progress::download_progress_bar;
use super::types::{CHUNK_SIZE, DownloadTarget, FetchOutcome, PartialFileState};
use futures::StreamExt;
use reqwest::header::{CONTENT_LENGTH, RANGE};
use reqwest::{Client, Response, StatusCode};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use url::Url;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("Invalid value for header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Invalid package URL for {file_name}: {reason}")]
    InvalidUrl { file_name: String, reason: String },

    #[error("Request to {url} failed: {source}")]
    Network {
        url: String,
        source: reqwest::Error,
    },

    #[error("Server did not report a Content-Length for {url}")]
    MissingContentLength { url: String },

    #[error("Filesystem operation on {path} failed: {source}")]
    Filesystem {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Asks the server for the size of `url` without transferring the body.
pub async fn probe_expected_size(client: &Client, url: &Url) -> Result<u64, FetchError> {
    tracing::debug!(url = %url, "Probing package size");

    let response = client
        .head(url.clone())
        .send()
        .await
        .and_then(Response::error_for_status)
        .map_err(|source| FetchError::Network {
            url: url.to_string(),
            source,
        })?;

    // `Response::content_length` describes the empty HEAD body, so read the header.
    let expected_size = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .ok_or_else(|| FetchError::MissingContentLength {
            url: url.to_string(),
        })?;

    tracing::debug!(url = %url, expected_size, "Probed package size");
    Ok(expected_size)
}

/// Downloads files listed under a single base URL.
pub struct Fetcher<'a> {
    client: &'a Client,
    base_url: &'a Url,
}

impl<'a> Fetcher<'a> {
    pub fn new(client: &'a Client, base_url: &'a Url) -> Self {
        Self { client, base_url }
    }

    pub fn file_url(&self, file_name: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(file_name)
            .map_err(|e| FetchError::InvalidUrl {
                file_name: file_name.to_string(),
                reason: e.to_string(),
            })
    }

    /// Brings `directory/file_name` to `expected_size` bytes.
    ///
    /// A file already of the expected size is left untouched without any body
    /// request. A shorter file is completed with a range request for the
    /// missing suffix.
    pub async fn fetch(
        &self,
        directory: &Path,
        file_name: &str,
        expected_size: u64,
    ) -> Result<FetchOutcome, FetchError> {
        tokio::fs::create_dir_all(directory)
            .await
            .map_err(|source| FetchError::Filesystem {
                path: directory.to_path_buf(),
                source,
            })?;

        let target = DownloadTarget::inspect(directory, file_name, expected_size)
            .await
            .map_err(|source| FetchError::Filesystem {
                path: directory.join(file_name),
                source,
            })?;
        let output_path = target.path();
        let filesystem_error = |source| FetchError::Filesystem {
            path: output_path.clone(),
            source,
        };

        let state = target.state();
        let PartialFileState::Incomplete { mut resume_from } = state else {
            tracing::info!(output = %output_path.display(), "Package already downloaded, skipping");
            return Ok(FetchOutcome::AlreadyComplete);
        };

        let url = self.file_url(file_name)?;
        let network_error = |source| FetchError::Network {
            url: url.to_string(),
            source,
        };
        tracing::info!(url = %url, output = %output_path.display(), resume_from, "Downloading");

        let mut request = self.client.get(url.clone());
        if let Some(range) = state.range_header(expected_size) {
            tracing::debug!(url = %url, range = %range, "Resuming partial download");
            request = request.header(RANGE, range);
        }
        let response = request
            .send()
            .await
            .and_then(Response::error_for_status)
            .map_err(network_error)?;

        if resume_from > 0 && response.status() != StatusCode::PARTIAL_CONTENT {
            tracing::warn!(
                url = %url,
                status = %response.status(),
                "Server ignored the range request, restarting download"
            );
            resume_from = 0;
        }

        let file = if resume_from > 0 {
            OpenOptions::new().append(true).open(&output_path).await
        } else {
            File::create(&output_path).await
        }
        .map_err(filesystem_error)?;
        let mut writer = BufWriter::new(file);

        let progress = download_progress_bar(file_name, resume_from, expected_size);
        let mut bytes_written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(network_error)?;
            for piece in chunk.chunks(CHUNK_SIZE) {
                writer.write_all(piece).await.map_err(filesystem_error)?;
                progress.inc(piece.len() as u64);
                bytes_written += piece.len() as u64;
            }
        }

        writer.flush().await.map_err(filesystem_error)?;
        progress.finish();

        tracing::info!(
            output = %output_path.display(),
            resumed_from = resume_from,
            bytes_written,
            "Downloaded"
        );
        Ok(FetchOutcome::Downloaded {
            resumed_from: resume_from,
            bytes_written,
        })
    }
}
