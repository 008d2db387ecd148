use crate::cli::AnalyzeParams;
use crate::dump::dump;
use crate::error::KcaError;
use crate::fetch::{FetchOutcome, Fetcher, build_http_client, probe_expected_size};
use crate::listing::{fetch_listing, select_candidates};
use crate::tools::{SystemToolchain, Toolchain};
use crate::unpack::unpack;
use reqwest::Client;
use std::path::PathBuf;
use tracing;

#[derive(Debug, Clone)]
pub struct ProcessedPackage {
    pub file_name: String,
    pub fetch: FetchOutcome,
    pub vmlinux_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AnalyzeSummary {
    pub packages: Vec<ProcessedPackage>,
    pub disassembly_path: PathBuf,
}

pub async fn run_analyze(params: AnalyzeParams) -> Result<AnalyzeSummary, KcaError> {
    let client = build_http_client(&params.app_config.http)?;
    let tools = SystemToolchain::from_config(&params.app_config.tools);

    analyze_with(&params, &client, &tools).await
}

/// Runs listing, fetch, unpack and dump for every matching package in turn.
pub async fn analyze_with<T: Toolchain>(
    params: &AnalyzeParams,
    client: &Client,
    tools: &T,
) -> Result<AnalyzeSummary, KcaError> {
    let AnalyzeParams {
        app_config,
        architecture,
        kernel_version,
        directory,
    } = params;

    let entries = fetch_listing(client, &app_config.index_url).await?;
    let candidates = select_candidates(
        &entries,
        *architecture,
        kernel_version,
        app_config.match_policy,
    );

    if candidates.is_empty() {
        tracing::warn!(
            "Kernel not found: no {} debug package for {} in {}",
            architecture,
            kernel_version,
            app_config.index_url
        );
        return Err(KcaError::KernelNotFound {
            architecture: *architecture,
            version: kernel_version.clone(),
        });
    }

    let fetcher = Fetcher::new(client, &app_config.index_url);
    let disassembly_path = app_config.output.disassembly_path.clone();
    let mut packages = Vec::with_capacity(candidates.len());

    for candidate in &candidates {
        let file_name = candidate.file_name();
        tracing::info!("Processing {}", file_name);

        let url = fetcher.file_url(file_name)?;
        let expected_size = probe_expected_size(client, &url).await?;
        let fetch = fetcher.fetch(directory, file_name, expected_size).await?;
        let vmlinux_path = unpack(tools, directory, kernel_version, file_name).await?;
        dump(tools, directory, kernel_version, &disassembly_path).await?;

        packages.push(ProcessedPackage {
            file_name: file_name.to_string(),
            fetch,
            vmlinux_path,
        });
    }

    tracing::info!(
        "Disassembly of {} written to {}",
        kernel_version,
        disassembly_path.display()
    );
    Ok(AnalyzeSummary {
        packages,
        disassembly_path,
    })
}
