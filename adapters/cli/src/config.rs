use std::{fs, path::Path};

use anyhow::{Context, Result};
use bastion_core::GameConfig;

/// Loads and validates the tuning file, or the built-in tuning when no path is
/// given.
pub(crate) fn load(path: Option<&Path>) -> Result<GameConfig> {
    let config = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read configuration at {}", path.display()))?;
            parse(&contents)
                .with_context(|| format!("invalid configuration in {}", path.display()))?
        }
        None => GameConfig::default(),
    };
    config
        .validate()
        .context("configuration failed validation")?;
    Ok(config)
}

fn parse(contents: &str) -> Result<GameConfig> {
    toml::from_str(contents).context("failed to parse configuration toml")
}
