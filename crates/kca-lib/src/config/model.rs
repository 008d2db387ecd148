use crate::listing::MatchPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_INDEX_URL: &str = "http://ddebs.ubuntu.com/pool/main/l/linux/";
pub const DEFAULT_USER_AGENT: &str = "Kernel Analysis Tool v1.0";

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// Directory listing that links to the debug packages.
    pub index_url: Url,
    pub match_policy: MatchPolicy,
    pub http: HttpConfig,
    pub tools: ToolsConfig,
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_url: Url::parse(DEFAULT_INDEX_URL).expect("default index URL is valid"),
            match_policy: MatchPolicy::default(),
            http: HttpConfig::default(),
            tools: ToolsConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct HttpConfig {
    pub user_agent: String,
    /// Applied to connecting and to each whole request. Unset means no limit.
    pub timeout_secs: Option<u64>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: None,
        }
    }
}

/// Programs used for unpacking and disassembly, looked up on `PATH` unless absolute.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ToolsConfig {
    pub ar: PathBuf,
    pub tar: PathBuf,
    pub objdump: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ar: PathBuf::from("ar"),
            tar: PathBuf::from("tar"),
            objdump: PathBuf::from("objdump"),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct OutputConfig {
    /// Where the disassembly is written, relative to the working directory.
    pub disassembly_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            disassembly_path: PathBuf::from("debug.S"),
        }
    }
}
