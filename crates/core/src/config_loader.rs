use crate::config::AppConfig;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration by merging the TOML file at `path` with
    /// `CURVECOPY_`-prefixed environment variables.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or fails
    /// range validation.
    pub fn load(path: &str) -> Result<AppConfig> {
        let config: AppConfig = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("CURVECOPY_").split("__"))
            .extract()
            .with_context(|| format!("failed to load configuration from {path}"))?;

        config.validate()?;
        Ok(config)
    }
}
