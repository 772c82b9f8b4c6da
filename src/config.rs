use serde::{Deserialize, Serialize};
use std::{fs::read_to_string, path::Path};

use crate::{
    error::SiteMapError,
    filter::recursive::{validate_delimiter, DEFAULT_DELIMITER},
};

/// Which of the built-in default filters a coordinator applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultFilterConfig {
    pub visibility: bool,
    pub roles: bool,
    pub current_node: bool,
}

impl Default for DefaultFilterConfig {
    fn default() -> Self {
        DefaultFilterConfig {
            visibility: true,
            roles: true,
            current_node: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentNodeConfig {
    pub case_sensitive: bool,
}

/// Site map settings, read from the top level of a TOML file:
///
/// ```toml
/// delimiter = "/"
///
/// [default_filters]
/// visibility = true
/// roles = true
/// current_node = true
///
/// [current_node]
/// case_sensitive = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteMapConfig {
    pub delimiter: String,
    pub default_filters: DefaultFilterConfig,
    pub current_node: CurrentNodeConfig,
}

impl Default for SiteMapConfig {
    fn default() -> Self {
        SiteMapConfig {
            delimiter: DEFAULT_DELIMITER.to_string(),
            default_filters: DefaultFilterConfig::default(),
            current_node: CurrentNodeConfig::default(),
        }
    }
}

impl SiteMapConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, SiteMapError> {
        let config: SiteMapConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SiteMapError> {
        tracing::debug!("Reading site map config from {:?}", path.as_ref());
        let content = read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, SiteMapError> {
        Ok(toml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), SiteMapError> {
        validate_delimiter(&self.delimiter)
    }
}
