use super::fetcher::FetchError;
use crate::config::HttpConfig;
use reqwest::Client;
use reqwest::header::{CONNECTION, HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;

/// Builds the client shared by every stage of a run.
///
/// All requests carry the configured `User-Agent` and ask for a persistent
/// connection. Timeouts are only applied when configured.
pub fn build_http_client(http_config: &HttpConfig) -> Result<Client, FetchError> {
    let mut headers = HeaderMap::new();
    let user_agent =
        HeaderValue::from_str(&http_config.user_agent).map_err(|e| FetchError::InvalidHeader {
            name: USER_AGENT.as_str().to_string(),
            reason: e.to_string(),
        })?;
    headers.insert(USER_AGENT, user_agent);
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

    let mut builder = Client::builder().default_headers(headers);
    if let Some(timeout_secs) = http_config.timeout_secs {
        let timeout = Duration::from_secs(timeout_secs);
        builder = builder.connect_timeout(timeout).timeout(timeout);
    }

    builder.build().map_err(FetchError::Client)
}
