use crate::cli::args::Command;
use crate::cli::params::AnalyzeParams;
use crate::config::load_config;
use crate::error::KcaError;
use std::path::PathBuf;
use url::Url;

pub fn resolve_command(command: Command) -> Result<AnalyzeParams, KcaError> {
    let Command {
        architecture,
        kernel_version,
        directory,
        config_path,
        index_url,
    } = command;

    if kernel_version.trim().is_empty() {
        return Err(KcaError::CliArgumentValidation {
            details: "kernel-version must not be empty.".to_string(),
        });
    }

    let mut app_config = load_config(config_path.as_deref())?;

    if let Some(index_url) = index_url {
        app_config.index_url =
            Url::parse(&index_url).map_err(|e| KcaError::CliArgumentValidation {
                details: format!("Invalid index URL {index_url}: {e}"),
            })?;
    }

    // Package names are joined onto the listing URL, which only keeps the
    // last path segment when it ends with a slash.
    if !app_config.index_url.path().ends_with('/') {
        let path = format!("{}/", app_config.index_url.path());
        app_config.index_url.set_path(&path);
    }

    Ok(AnalyzeParams {
        app_config,
        architecture,
        kernel_version,
        directory: PathBuf::from(directory),
    })
}
