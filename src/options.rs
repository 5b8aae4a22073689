//! Group configuration: enabled axes and active backends.
//!
//! [`Options`] is a value object fixed at construction time: which of the
//! site/language/subdomain axes a metadata group uses, and the ordered list
//! of backends it matches against. Construction validates the list against
//! the registry and runs each backend's own cross-backend check — notably
//! the model backend's requirement that `modelinstance` run before it — so
//! a bad configuration fails at startup, never at request time.

use crate::registry::{self, UnknownBackend};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum OptionsError {
    #[error(transparent)]
    UnknownBackend(#[from] UnknownBackend),
    /// The active backend list violates an ordering requirement.
    #[error("{0}")]
    BackendOrdering(String),
}

/// Immutable per-group configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    use_sites: bool,
    use_i18n: bool,
    use_subdomains: bool,
    backends: Vec<String>,
}

impl Options {
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::default()
    }

    pub fn use_sites(&self) -> bool {
        self.use_sites
    }

    pub fn use_i18n(&self) -> bool {
        self.use_i18n
    }

    pub fn use_subdomains(&self) -> bool {
        self.use_subdomains
    }

    /// Active backend names, in match order.
    pub fn backends(&self) -> &[String] {
        &self.backends
    }
}

#[derive(Debug, Clone)]
pub struct OptionsBuilder {
    use_sites: bool,
    use_i18n: bool,
    use_subdomains: bool,
    backends: Vec<String>,
}

impl Default for OptionsBuilder {
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

impl OptionsBuilder {
    pub fn use_sites(mut self, on: bool) -> Self {
        self.use_sites = on;
        self
    }

    pub fn use_i18n(mut self, on: bool) -> Self {
        self.use_i18n = on;
        self
    }

    pub fn use_subdomains(mut self, on: bool) -> Self {
        self.use_subdomains = on;
        self
    }

    pub fn backends<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.backends = names.into_iter().map(Into::into).collect();
        self
    }

    /// Validate and freeze. Every name must be registered, and every active
    /// backend's own `validate` must pass.
    pub fn build(self) -> Result<Options, OptionsError> {
        let options = Options {
            use_sites: self.use_sites,
            use_i18n: self.use_i18n,
            use_subdomains: self.use_subdomains,
            backends: self.backends,
        };
        for name in &options.backends {
            registry::lookup(name)?.validate(&options)?;
        }
        Ok(options)
    }
}
