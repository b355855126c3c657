use std::{fs, path::Path};

use crate::ConfigResult;

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// The main configuration trait.
pub trait MainConfig {
    /// Validates the configuration.
    fn validate(&self) -> ConfigResult<()>;

    /// Loads the configuration from a toml file and validates it.
    fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self>
    where
        Self: Sized + for<'de> serde::Deserialize<'de>,
    {
        let config = fs::read_to_string(path)?;
        Self::from_string(config)
    }

    /// Loads the configuration from a toml string and validates it.
    fn from_string(config: impl AsRef<str>) -> ConfigResult<Self>
    where
        Self: Sized + for<'de> serde::Deserialize<'de>,
    {
        let config: Self = toml::from_str(config.as_ref())?;
        config.validate()?;
        Ok(config)
    }
}
