mod loader;
mod model;

pub use loader::load_config;
pub use model::{Config, DEFAULT_INDEX_URL, DEFAULT_USER_AGENT, HttpConfig, OutputConfig, ToolsConfig};
