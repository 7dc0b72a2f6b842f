//! Render settings loaded from a TOML file.
//!
//! ```toml
//! title = "Physics mock exam"
//! fonts_dir = "/opt/fonts/liberation"
//! output_dir = "papers"
//! oversize = "truncate"   # or "fail"
//! date_format = "%d %B %Y"
//! ```
//!
//! Every key is optional.  Page geometry is fixed and cannot be configured.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;
use crate::flow::OversizePolicy;
use crate::stamp::check_date_format;

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "exam-paper.toml";

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaperConfig {
    /// Header title and PDF metadata title.
    pub title: Option<String>,
    /// Directory searched first for font files.
    pub fonts_dir: Option<PathBuf>,
    /// Directory the PDF and JSON files are written to.
    pub output_dir: Option<PathBuf>,
    pub oversize: OversizePolicy,
    /// `chrono` format of the footer date.
    pub date_format: Option<String>,
}

impl PaperConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        if let Some(format) = &config.date_format {
            check_date_format(format)?;
        }
        Ok(config)
    }

    /// Reads the configuration at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Reads `path` when given, otherwise [`DEFAULT_CONFIG_FILE`] if it exists, otherwise
    /// returns the defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Output directory, defaulting to the working directory.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn empty_file_yields_defaults() {
        let config = PaperConfig::from_toml("").expect("parse");
        assert_eq!(config, PaperConfig::default());
        assert_eq!(config.oversize, OversizePolicy::Truncate);
        assert_eq!(config.output_dir(), PathBuf::from("."));
    }

    #[test]
    fn all_keys_parse() {
        let config = PaperConfig::from_toml(
            r#"
            title = "Physics"
            fonts_dir = "/opt/fonts"
            output_dir = "out"
            oversize = "fail"
            date_format = "%d %B %Y"
            "#,
        )
        .expect("parse");
        assert_eq!(config.title.as_deref(), Some("Physics"));
        assert_eq!(config.fonts_dir, Some(PathBuf::from("/opt/fonts")));
        assert_eq!(config.output_dir(), PathBuf::from("out"));
        assert_eq!(config.oversize, OversizePolicy::Fail);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = PaperConfig::from_toml("page_height = 300").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn unknown_date_specifier_is_rejected() {
        let err = PaperConfig::from_toml("date_format = \"%d %Q\"").unwrap_err();
        assert!(matches!(err, Error::DateFormat(ref format) if format == "%d %Q"));
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "title = \"On disk\"").expect("write config");
        let config = PaperConfig::discover(Some(&path)).expect("load");
        assert_eq!(config.title.as_deref(), Some("On disk"));
    }
}
