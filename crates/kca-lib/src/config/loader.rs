use super::Config;
use crate::error::KcaError;
use config::Config as ConfigBuilder;

/// Loads the configuration file, or the built-in defaults when no file is given.
pub fn load_config(config_path: Option<&str>) -> Result<Config, KcaError> {
    let Some(config_path) = config_path else {
        return Ok(Config::default());
    };

    let config_builder = ConfigBuilder::builder()
        .add_source(config::File::with_name(config_path))
        .build()?;

    config_builder.try_deserialize().map_err(Into::into)
}
