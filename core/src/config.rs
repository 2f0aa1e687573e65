use crate::typ::TypeCheckerOptions;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

/// Cap on diagnostics reported per buffer, to keep huge broken files manageable.
pub const DEFAULT_MAX_DIAGNOSTICS: usize = 200;

/// Analyzer settings, usually read from a `pyrite.toml`:
///
/// ```toml
/// max-diagnostics = 50
/// max-completions = 100
/// report-unknown-names = false
/// known-modules = ["requests", "numpy"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    pub max_diagnostics: usize,
    /// `None` keeps every candidate
    pub max_completions: Option<usize>,
    pub report_unknown_names: bool,
    pub check_call_arguments: bool,
    pub include_keywords: bool,
    pub include_builtins: bool,
    /// Extra importable modules offered by import completion
    pub known_modules: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_diagnostics: DEFAULT_MAX_DIAGNOSTICS,
            max_completions: None,
            report_unknown_names: true,
            check_call_arguments: true,
            include_keywords: true,
            include_builtins: true,
            known_modules: Vec::new(),
        }
    }
}

impl AnalyzerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: AnalyzerConfig = toml::from_str(text).context("Failed to parse analyzer configuration")?;
        Ok(config.clamped())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("Invalid config file '{}'", path.display()))
    }

    /// Replace zero limits, which would silence the analyzer entirely, with their defaults.
    pub fn clamped(mut self) -> Self {
        if self.max_diagnostics == 0 {
            warn!(default = DEFAULT_MAX_DIAGNOSTICS, "max-diagnostics must be positive, using default");
            self.max_diagnostics = DEFAULT_MAX_DIAGNOSTICS;
        }
        if self.max_completions == Some(0) {
            warn!("max-completions must be positive, completions are not capped");
            self.max_completions = None;
        }
        self.known_modules.retain(|m| !m.trim().is_empty());
        self
    }

    pub fn checker_options(&self) -> TypeCheckerOptions {
        TypeCheckerOptions {
            report_unknown_names: self.report_unknown_names,
            check_call_arguments: self.check_call_arguments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_gives_defaults() {
        let config = AnalyzerConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnalyzerConfig::default());
        assert_eq!(config.max_diagnostics, 200);
        assert!(config.include_keywords && config.include_builtins);
    }

    #[test]
    fn reads_kebab_case_keys() {
        let config = AnalyzerConfig::from_toml_str(
            "max-diagnostics = 5\nmax-completions = 20\nreport-unknown-names = false\nknown-modules = [\"requests\"]\n",
        )
        .unwrap();
        assert_eq!(config.max_diagnostics, 5);
        assert_eq!(config.max_completions, Some(20));
        assert!(!config.checker_options().report_unknown_names);
        assert!(config.checker_options().check_call_arguments);
        assert_eq!(config.known_modules, ["requests"]);
    }

    #[test]
    fn zero_limits_are_clamped() {
        let config = AnalyzerConfig::from_toml_str("max-diagnostics = 0\nmax-completions = 0\n").unwrap();
        assert_eq!(config.max_diagnostics, DEFAULT_MAX_DIAGNOSTICS);
        assert_eq!(config.max_completions, None);
    }

    #[test]
    fn unknown_keys_and_bad_types_are_rejected() {
        assert!(AnalyzerConfig::from_toml_str("max-diagnostic = 3").is_err());
        assert!(AnalyzerConfig::from_toml_str("max-diagnostics = \"many\"").is_err());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pyrite.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "include-keywords = false").unwrap();
        let config = AnalyzerConfig::from_file(&path).unwrap();
        assert!(!config.include_keywords);

        let err = AnalyzerConfig::from_file(dir.path().join("missing.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
