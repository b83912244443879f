//! Environment configuration
//!
//! Carries the feature and assessment name filters plus an open table of
//! settings that steps may read. Loaded from a TOML file, from flags, or
//! assembled in code.

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

use super::flags::Flags;
use super::{Error, Result};

/// Configuration shared by every action and step of an environment
#[derive(Debug, Clone, Default)]
pub struct Config {
    feature_regex: Option<Regex>,
    assessment_regex: Option<Regex>,
    settings: toml::Table,
}

/// On-disk layout of a configuration file
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    filters: Filters,

    #[serde(default)]
    settings: toml::Table,
}

/// Name filters section
#[derive(Debug, Deserialize, Default)]
struct Filters {
    /// Regex selecting features by name
    feature: Option<String>,

    /// Regex selecting assessments by name
    assess: Option<String>,
}

impl Config {
    /// Create an empty configuration: no filters, no settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))?;

        let mut config = Self {
            settings: file.settings,
            ..Self::default()
        };
        if let Some(pattern) = &file.filters.feature {
            config = config.with_feature_regex(pattern)?;
        }
        if let Some(pattern) = &file.filters.assess {
            config = config.with_assessment_regex(pattern)?;
        }
        Ok(config)
    }

    /// Build configuration from the process arguments
    ///
    /// Recognizes `--feature`, `--assess`, `--config` and `--set KEY=VALUE`.
    pub fn from_flags() -> Result<Self> {
        Self::from_args(std::env::args_os())
    }

    /// Build configuration from an explicit argument list (first item is the program name)
    pub fn from_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Flags::parse_args(args)?.into_config()
    }

    /// Select only features whose name matches `pattern`
    pub fn with_feature_regex(mut self, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| Error::invalid_filter("feature", pattern, e))?;
        self.feature_regex = Some(regex);
        Ok(self)
    }

    /// Select only assessments whose name matches `pattern`
    pub fn with_assessment_regex(mut self, pattern: &str) -> Result<Self> {
        let regex =
            Regex::new(pattern).map_err(|e| Error::invalid_filter("assessment", pattern, e))?;
        self.assessment_regex = Some(regex);
        Ok(self)
    }

    /// Store an arbitrary setting
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<toml::Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    pub fn feature_regex(&self) -> Option<&Regex> {
        self.feature_regex.as_ref()
    }

    pub fn assessment_regex(&self) -> Option<&Regex> {
        self.assessment_regex.as_ref()
    }

    /// Raw setting lookup
    pub fn setting(&self, key: &str) -> Option<&toml::Value> {
        self.settings.get(key)
    }

    /// Typed setting lookup
    ///
    /// Returns `Ok(None)` if the key is absent and an error if the stored
    /// value does not deserialize into `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.settings.get(key) {
            Some(value) => value
                .clone()
                .try_into()
                .map(Some)
                .map_err(|e| Error::Config(format!("setting '{}': {}", key, e))),
            None => Ok(None),
        }
    }

    pub fn settings(&self) -> &toml::Table {
        &self.settings
    }
}
