use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::provider::{FixtureProvider, HelmProvider, ValueTreeProvider};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub provider: ProviderConfig,
    pub documents: DocumentsConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Helm,
    Fixtures,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// Executable used to fetch chart values.
    pub command: String,
    /// Arguments placed before the chart reference.
    pub args: Vec<String>,
    /// Kill the values command after this many milliseconds.
    pub timeout_ms: Option<u64>,
    /// Directory of `<chart>.yaml` files for `kind = "fixtures"`.
    pub fixtures_dir: Option<PathBuf>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        let helm = HelmProvider::default();
        ProviderConfig {
            kind: ProviderKind::Helm,
            command: helm.command,
            args: helm.args,
            timeout_ms: None,
            fixtures_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocumentsConfig {
    /// Glob patterns matched against the document file name.
    pub patterns: Vec<String>,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        DocumentsConfig {
            patterns: vec!["*values.yaml".to_string(), "*values.yml".to_string()],
        }
    }
}

impl Config {
    /// Load a TOML config file. Relative `fixtures_dir` paths are resolved
    /// against the config file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if let (Some(dir), Some(base)) = (&config.provider.fixtures_dir, path.parent()) {
            if dir.is_relative() {
                config.provider.fixtures_dir = Some(base.join(dir));
            }
        }
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Compile the document patterns, rejecting invalid globs.
    pub fn document_patterns(&self) -> Result<Vec<glob::Pattern>, ConfigError> {
        self.documents
            .patterns
            .iter()
            .map(|pattern| {
                glob::Pattern::new(pattern).map_err(|source| ConfigError::Pattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect()
    }

    /// Build the configured values provider.
    pub fn build_provider(&self) -> Result<Box<dyn ValueTreeProvider>, ConfigError> {
        let provider = &self.provider;
        match provider.kind {
            ProviderKind::Helm => Ok(Box::new(
                HelmProvider::new(provider.command.clone(), provider.args.clone())
                    .with_timeout(provider.timeout_ms.map(Duration::from_millis)),
            )),
            ProviderKind::Fixtures => {
                let dir = provider
                    .fixtures_dir
                    .clone()
                    .ok_or(ConfigError::MissingFixturesDir)?;
                Ok(Box::new(FixtureProvider::new(dir)))
            }
        }
    }
}
