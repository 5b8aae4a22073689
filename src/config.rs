//! Host configuration module.
//!
//! Handles loading and validating the `sitemeta.toml` file that describes
//! the hosting environment: which site is the default, which languages are
//! enabled, whether the host follows the append-slash URL convention, the
//! route table for view resolution, and the axis/backend options for the
//! metadata group. These are read-only inputs to canonicalization and
//! scoping — the engine consumes them, it does not own them.
//!
//! ## Configuration options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! default_site = "localhost"   # Site assumed when a lookup names none
//! languages = ["en"]           # Enabled language codes
//! append_slash = true          # Append-slash URL convention
//! store = "metadata.json"      # Record fixture file (CLI only)
//!
//! [options]
//! use_sites = false
//! use_i18n = false
//! use_subdomains = false
//! backends = ["path", "modelinstance", "model", "view"]
//!
//! # Routes feed the view backend's path -> view-name resolution.
//! [[routes]]
//! pattern = "/products/*"
//! name = "product_detail"
//! ```
//!
//! Config files are sparse — override just the values you want. Unknown
//! keys are rejected to catch typos early.

use crate::options::{Options, OptionsError};
use crate::routes::Route;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Host environment configuration loaded from `sitemeta.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    /// Site assumed when a lookup does not name one. Only meaningful with
    /// the sites axis enabled.
    pub default_site: String,
    /// Enabled language codes; stored record languages must come from this
    /// list when the i18n axis is on.
    pub languages: Vec<String>,
    /// Whether the host appends trailing slashes to extensionless paths.
    pub append_slash: bool,
    /// Record fixture file the CLI loads, relative to the config file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    /// Axis and backend selection for the metadata group.
    pub options: OptionsConfig,
    /// Route table for the view backend.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<Route>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            default_site: "localhost".to_string(),
            languages: vec!["en".to_string()],
            append_slash: true,
            store: None,
            options: OptionsConfig::default(),
            routes: Vec::new(),
        }
    }
}

impl HostConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: HostConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config values against each other.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.options.backends.is_empty() {
            return Err(ConfigError::Validation(
                "options.backends must not be empty".into(),
            ));
        }
        if self.options.use_sites && self.default_site.trim().is_empty() {
            return Err(ConfigError::Validation(
                "default_site is required when options.use_sites is enabled".into(),
            ));
        }
        if self.options.use_i18n && self.languages.is_empty() {
            return Err(ConfigError::Validation(
                "languages must not be empty when options.use_i18n is enabled".into(),
            ));
        }
        Ok(())
    }
}

/// The `[options]` table: mirrors [`Options`] but deserializable; turned
/// into the validated value object with [`OptionsConfig::build`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionsConfig {
    pub use_sites: bool,
    pub use_i18n: bool,
    pub use_subdomains: bool,
    pub backends: Vec<String>,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            use_sites: false,
            use_i18n: false,
            use_subdomains: false,
            backends: vec![
                "path".to_string(),
                "modelinstance".to_string(),
                "model".to_string(),
                "view".to_string(),
            ],
        }
    }
}

impl OptionsConfig {
    /// Build the validated [`Options`] value object. Backend-name and
    /// ordering problems surface here, at startup.
    pub fn build(&self) -> Result<Options, OptionsError> {
        Options::builder()
            .use_sites(self.use_sites)
            .use_i18n(self.use_i18n)
            .use_subdomains(self.use_subdomains)
            .backends(self.backends.iter().cloned())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn load_str(content: &str) -> Result<HostConfig, ConfigError> {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        HostConfig::load(file.path())
    }

    #[test]
    fn defaults_are_valid() {
        let config = HostConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.options.build().is_ok());
    }

    #[test]
    fn sparse_file_overrides_only_named_values() {
        let config = load_str("default_site = \"example.com\"\n").unwrap();
        assert_eq!(config.default_site, "example.com");
        assert!(config.append_slash);
        assert_eq!(config.languages, vec!["en"]);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            load_str("defualt_site = \"oops\"\n"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn empty_backends_rejected() {
        let err = load_str("[options]\nbackends = []\n");
        assert!(matches!(err, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn i18n_requires_languages() {
        let err = load_str("languages = []\n[options]\nuse_i18n = true\n");
        assert!(matches!(err, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn sites_require_default_site() {
        let err = load_str("default_site = \"\"\n[options]\nuse_sites = true\n");
        assert!(matches!(err, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn routes_parse_into_table_entries() {
        let config = load_str(
            "[[routes]]\npattern = \"/products/*\"\nname = \"product_detail\"\n",
        )
        .unwrap();
        assert_eq!(config.routes.len(), 1);
        assert_eq!(config.routes[0].name, "product_detail");
    }

    #[test]
    fn misordered_backends_fail_at_options_build() {
        let config = load_str("[options]\nbackends = [\"model\", \"modelinstance\"]\n").unwrap();
        assert!(config.options.build().is_err());
    }
}
