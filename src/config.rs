use serde::{Deserialize, Serialize};
use std::{
    fs::{read_to_string, write},
    path::Path,
};

use crate::{error::IrefError, render::OutputFormat};

/// Name of the build configuration file looked up in the source root.
pub const CONFIG_FILE_NAME: &str = "iref.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Output encoding of the build.
    pub format: OutputFormat,
    /// Suffix appended to a document name to form the page a link points to.
    pub link_suffix: String,
    /// Extension (without dot) of the source files discovered in the root.
    pub source_extension: String,
    /// Stem of the single `.tex` file a LaTeX build produces.
    pub latex_name: String,
    /// Parse documents concurrently. Generated ids then depend on scheduling order.
    pub parallel: bool,
    /// Write the loose reference index page (HTML builds only).
    pub index: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            format: OutputFormat::Html,
            link_suffix: ".html".to_string(),
            source_extension: "md".to_string(),
            latex_name: "references".to_string(),
            parallel: true,
            index: true,
        }
    }
}

impl BuildConfig {
    /// Read `iref.toml` from `root`. A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(root: P) -> Result<Self, IrefError> {
        let path = root.as_ref().join(CONFIG_FILE_NAME);
        tracing::debug!("Attempting to read build config from: {:?}", &path);
        if !path.exists() {
            tracing::debug!("Config file not found, using defaults.");
            return Ok(BuildConfig::default());
        }
        BuildConfig::from_toml_str(&get_content(&path)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, IrefError> {
        let config: BuildConfig = toml::from_str(content)?;
        if config.latex_name.is_empty() {
            return Err(IrefError::Config("latex_name must not be empty".to_string()));
        }
        Ok(config)
    }

    /// Write this config as `iref.toml` into `root`.
    pub fn save<P: AsRef<Path>>(&self, root: P) -> Result<(), IrefError> {
        let path = root.as_ref().join(CONFIG_FILE_NAME);
        tracing::debug!("Attempting to write build config to: {:?}", &path);
        let toml_string = toml::to_string(self)?;
        write(&path, toml_string)?;
        Ok(())
    }

    /// Sequential builds allocate ids in document name order, which makes output reproducible.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

pub fn get_content<P: AsRef<Path>>(path: P) -> Result<String, IrefError> {
    tracing::debug!("Reading {:?}", path.as_ref());
    Ok(read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = BuildConfig::from_toml_str("format = \"latex\"\nparallel = false\n").unwrap();
        assert_eq!(config.format, OutputFormat::Latex);
        assert!(!config.parallel);
        assert_eq!(config.link_suffix, ".html");
        assert_eq!(config.latex_name, "references");
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        assert!(matches!(
            BuildConfig::from_toml_str("format = \"pdf\""),
            Err(IrefError::Config(_))
        ));
        assert!(matches!(
            BuildConfig::from_toml_str("latex_name = \"\""),
            Err(IrefError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file_yields_defaults_and_save_round_trips() {
        let dir = TempDir::new().unwrap();
        assert_eq!(BuildConfig::load(dir.path()).unwrap(), BuildConfig::default());

        let config = BuildConfig {
            format: OutputFormat::Text,
            link_suffix: "/".to_string(),
            ..BuildConfig::default()
        };
        config.save(dir.path()).unwrap();
        assert_eq!(BuildConfig::load(dir.path()).unwrap(), config);
    }
}
