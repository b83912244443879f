//! Command-line flags for a suite binary
//!
//! A suite entry point owns its arguments (the test binary runs with
//! `harness = false`), so filters can be passed as
//! `cargo test --test <suite> -- --feature '^pods' --assess ready`.

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

use super::config::Config;
use super::{Error, Result};

/// Flags understood by [`Config::from_flags`]
#[derive(Parser, Debug, Default)]
#[command(name = "e2e", about = "Feature test suite options")]
pub struct Flags {
    /// Regular expression selecting features to run
    #[arg(long = "feature", value_name = "REGEX", env = "E2E_FEATURE")]
    pub feature: Option<String>,

    /// Regular expression selecting assessments to run
    #[arg(long = "assess", value_name = "REGEX", env = "E2E_ASSESS")]
    pub assess: Option<String>,

    /// TOML configuration file; flags override its filters
    #[arg(long = "config", value_name = "PATH", env = "E2E_CONFIG")]
    pub config: Option<PathBuf>,

    /// Extra setting, repeatable
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_setting)]
    pub settings: Vec<(String, String)>,
}

impl Flags {
    /// Parse flags from an argument list whose first item is the program name
    pub fn parse_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args).map_err(|e| Error::Config(e.to_string()))
    }

    /// Resolve the flags into a configuration
    pub fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::new(),
        };

        if let Some(pattern) = &self.feature {
            config = config.with_feature_regex(pattern)?;
        }
        if let Some(pattern) = &self.assess {
            config = config.with_assessment_regex(pattern)?;
        }
        for (key, raw) in self.settings {
            config = config.with_setting(key, setting_value(&raw));
        }

        Ok(config)
    }
}

fn parse_setting(arg: &str) -> std::result::Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", arg)),
    }
}

/// Interpret a flag value as the narrowest TOML scalar it spells
///
/// Words such as `inf` or `NaN` stay strings.
fn setting_value(raw: &str) -> toml::Value {
    if let Ok(b) = raw.parse::<bool>() {
        toml::Value::Boolean(b)
    } else if let Ok(i) = raw.parse::<i64>() {
        toml::Value::Integer(i)
    } else if let Some(f) = raw.parse::<f64>().ok().filter(|f| f.is_finite()) {
        toml::Value::Float(f)
    } else {
        toml::Value::String(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_from_args() {
        let config =
            Config::from_args(["suite", "--feature", "^pods", "--assess", "ready"]).unwrap();
        assert_eq!(config.feature_regex().unwrap().as_str(), "^pods");
        assert_eq!(config.assessment_regex().unwrap().as_str(), "ready");
    }

    #[test]
    fn test_settings_from_args() {
        let config = Config::from_args([
            "suite",
            "--set",
            "namespace=e2e",
            "--set",
            "replicas=2",
            "--set",
            "debug=true",
        ])
        .unwrap();

        assert_eq!(config.get::<String>("namespace").unwrap().as_deref(), Some("e2e"));
        assert_eq!(config.get::<i64>("replicas").unwrap(), Some(2));
        assert_eq!(config.get::<bool>("debug").unwrap(), Some(true));
    }

    #[test]
    fn test_bad_setting_rejected() {
        let err = Config::from_args(["suite", "--set", "novalue"]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("e2e.toml");
        std::fs::write(&path, "[filters]\nfeature = \"from-file\"\nassess = \"kept\"\n").unwrap();

        let args: Vec<OsString> = vec![
            "suite".into(),
            "--config".into(),
            path.into_os_string(),
            "--feature".into(),
            "from-flag".into(),
        ];
        let config = Config::from_args(args).unwrap();

        assert_eq!(config.feature_regex().unwrap().as_str(), "from-flag");
        assert_eq!(config.assessment_regex().unwrap().as_str(), "kept");
    }

    #[test]
    fn test_setting_value_kinds() {
        assert_eq!(setting_value("false"), toml::Value::Boolean(false));
        assert_eq!(setting_value("7"), toml::Value::Integer(7));
        assert_eq!(setting_value("1.5"), toml::Value::Float(1.5));
        assert_eq!(setting_value("kind"), toml::Value::String("kind".into()));
        assert_eq!(setting_value("inf"), toml::Value::String("inf".into()));
        assert_eq!(setting_value("-infinity"), toml::Value::String("-infinity".into()));
        assert_eq!(setting_value("NaN"), toml::Value::String("NaN".into()));
    }

    #[test]
    fn test_non_finite_words_stay_strings() {
        let config =
            Config::from_args(["suite", "--set", "mode=inf", "--set", "tag=NaN"]).unwrap();
        assert_eq!(config.get::<String>("mode").unwrap().as_deref(), Some("inf"));
        assert_eq!(config.get::<String>("tag").unwrap().as_deref(), Some("NaN"));
    }
}
