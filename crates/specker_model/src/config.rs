//! Reader and renderer configuration.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SpecError, SpecResult};
use crate::section::LineEnding;

/// Top-level configuration, usually loaded from a `specker.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeckerConfig {
    pub reader: ReaderConfig,
    pub renderer: RenderConfig,
}

impl SpeckerConfig {
    pub fn from_toml_str(content: &str) -> SpecResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> SpecResult<Self> {
        let path = path.as_ref();
        debug!("Loading configuration from {:?}", path);

        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| SpecError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Options for [`crate::reader::SpecFileReader`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Additional `%name` section headers to recognize.
    pub extra_sections: Vec<String>,
}

impl ReaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(mut self, name: impl Into<String>) -> Self {
        self.extra_sections.push(name.into());
        self
    }
}

/// Which renderer variant to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Keep the input layout; only touched sections are re-synthesized.
    #[default]
    Original,
    /// Re-synthesize every section canonically.
    Normalized,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Original => f.write_str("original"),
            Layout::Normalized => f.write_str("normalized"),
        }
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "original" => Ok(Layout::Original),
            "normalized" | "normalised" => Ok(Layout::Normalized),
            other => Err(format!("unknown layout: {}", other)),
        }
    }
}

/// Newline used by the normalized layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewlineStyle {
    #[default]
    Lf,
    CrLf,
}

impl NewlineStyle {
    pub fn ending(&self) -> LineEnding {
        match self {
            NewlineStyle::Lf => LineEnding::Lf,
            NewlineStyle::CrLf => LineEnding::CrLf,
        }
    }
}

/// Options for the renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub layout: Layout,
    /// Column at which normalized tag values start.
    pub tag_value_column: usize,
    /// Collapse runs of blank lines into one.
    pub collapse_blank_lines: bool,
    pub trim_trailing_whitespace: bool,
    pub newline: NewlineStyle,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            layout: Layout::Original,
            tag_value_column: 16,
            collapse_blank_lines: true,
            trim_trailing_whitespace: true,
            newline: NewlineStyle::Lf,
        }
    }
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn tag_value_column(mut self, column: usize) -> Self {
        self.tag_value_column = column;
        self
    }

    pub fn collapse_blank_lines(mut self, collapse: bool) -> Self {
        self.collapse_blank_lines = collapse;
        self
    }

    pub fn trim_trailing_whitespace(mut self, trim: bool) -> Self {
        self.trim_trailing_whitespace = trim;
        self
    }

    pub fn newline(mut self, newline: NewlineStyle) -> Self {
        self.newline = newline;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_from_empty_toml() {
        let config = SpeckerConfig::from_toml_str("").unwrap();
        assert_eq!(config, SpeckerConfig::default());
        assert_eq!(config.renderer.tag_value_column, 16);
        assert_eq!(config.renderer.layout, Layout::Original);
    }

    #[test]
    fn test_partial_toml() {
        let config = SpeckerConfig::from_toml_str(
            r#"
[reader]
extra_sections = ["mysection"]

[renderer]
layout = "normalized"
newline = "cr_lf"
"#,
        )
        .unwrap();

        assert_eq!(config.reader.extra_sections, vec!["mysection"]);
        assert_eq!(config.renderer.layout, Layout::Normalized);
        assert_eq!(config.renderer.newline, NewlineStyle::CrLf);
        assert!(config.renderer.collapse_blank_lines);
    }

    #[test]
    fn test_load_reports_path_on_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("specker.toml");
        fs::write(&path, "[renderer]\ntag_value_column = \"wide\"\n").unwrap();

        let err = SpeckerConfig::load(&path).unwrap_err();
        assert!(matches!(err, SpecError::Config { .. }));
        assert!(err.to_string().contains("specker.toml"));
    }

    #[test]
    fn test_layout_from_str() {
        assert_eq!("Normalized".parse::<Layout>().unwrap(), Layout::Normalized);
        assert!("fancy".parse::<Layout>().is_err());
    }
}
