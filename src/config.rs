use serde::{Deserialize, Serialize};

/// Import path of the runtime package that resolves secrets
pub const DEFAULT_IMPORT_PATH: &str = "encore.dev/appruntime/infrasdk/secrets";

/// Alias the runtime package is imported under in rewritten files
pub const DEFAULT_ALIAS: &str = "__encore_secrets";

/// Settings for the injected runtime dependency
///
/// Resolved in layers: built-in defaults, then the request file, then
/// command-line flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteConfig {
    /// Import path of the runtime dependency
    pub import_path: String,
    /// Identifier the dependency is bound to; every `Load` call goes
    /// through it
    pub alias: String,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            import_path: DEFAULT_IMPORT_PATH.to_string(),
            alias: DEFAULT_ALIAS.to_string(),
        }
    }
}

impl RewriteConfig {
    pub fn new(import_path: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            import_path: import_path.into(),
            alias: alias.into(),
        }
    }

    /// Replace whichever settings are given, keep the rest
    pub fn with_overrides(mut self, import_path: Option<String>, alias: Option<String>) -> Self {
        if let Some(import_path) = import_path {
            self.import_path = import_path;
        }
        if let Some(alias) = alias {
            self.alias = alias;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RewriteConfig::default();
        assert_eq!(config.import_path, "encore.dev/appruntime/infrasdk/secrets");
        assert_eq!(config.alias, "__encore_secrets");
    }

    #[test]
    fn test_overrides_are_layered() {
        let config = RewriteConfig::default()
            .with_overrides(Some("runtime/secrets".to_string()), None)
            .with_overrides(None, Some("__dep".to_string()));

        assert_eq!(config, RewriteConfig::new("runtime/secrets", "__dep"));
    }
}
