use anyhow::Context;
use qrewrite_domain::{CliOverrides, Config};
use tracing::debug;

pub fn load_config(path: Option<&str>, cli_overrides: CliOverrides) -> anyhow::Result<Config> {
    let config = Config::load(path, cli_overrides).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

pub fn log_config_source(path: Option<&str>) {
    match path.map(str::to_string).or_else(Config::get_config_path) {
        Some(path) => debug!(path = %path, "Configuration file"),
        None => debug!("No configuration file found, using defaults"),
    }
}
