use crate::config::Config;
use crate::listing::Architecture;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AnalyzeParams {
    pub app_config: Config,
    pub architecture: Architecture,
    pub kernel_version: String,
    pub directory: PathBuf,
}
