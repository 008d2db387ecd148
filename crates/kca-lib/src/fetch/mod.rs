mod client;
mod fetcher;
mod progress;
mod types;

pub use client::build_http_client;
pub use fetcher::{FetchError, Fetcher, probe_expected_size};
pub use progress::{BAR_WIDTH, download_progress_bar, initial_fill};
pub use types::{CHUNK_SIZE, DownloadTarget, FetchOutcome, PartialFileState};
