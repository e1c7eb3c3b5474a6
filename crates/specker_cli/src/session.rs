//! Shared plumbing for commands: configuration, reading, transforming and
//! writing spec files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use specker_model::{
    renderer_for, shared, Diagnostics, RenderConfig, SharedReader, SpecFileReader,
    SpecModelTransformator, SpeckerConfig, TransformationPass,
};

/// Where rendered output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

pub struct Session {
    config: SpeckerConfig,
    diagnostics: Diagnostics,
}

impl Session {
    pub fn new(config: SpeckerConfig) -> Self {
        Self {
            config,
            diagnostics: Diagnostics::current(),
        }
    }

    /// Build a session from an optional TOML configuration file.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => SpeckerConfig::load(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?,
            None => SpeckerConfig::default(),
        };
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &SpeckerConfig {
        &self.config
    }

    /// Read and parse `path`; the returned reader holds the model.
    pub fn open(&self, path: &Path) -> Result<SharedReader> {
        let input =
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

        let reader = SpecFileReader::with_config(&self.config.reader)
            .with_diagnostics(self.diagnostics.clone());
        let reader = shared(reader);
        let sections = reader
            .borrow_mut()
            .parse(&input)
            .with_context(|| format!("Failed to parse {}", path.display()))?
            .len();

        debug!("Parsed {} sections from {}", sections, path.display());
        Ok(reader)
    }

    /// Run `passes` in order over the model held by `reader`.
    pub fn transform(&self, reader: &SharedReader, passes: &[&dyn TransformationPass]) -> Result<()> {
        let model = reader.borrow_mut().take_model();
        let mut transformator =
            SpecModelTransformator::new(model).with_diagnostics(self.diagnostics.clone());
        let result = transformator.apply_all(passes);
        // Hand the model back even when a pass failed.
        reader.borrow_mut().set_model(transformator.into_model());
        result?;
        Ok(())
    }

    /// Render the model held by `reader` with the configured layout.
    pub fn render(&self, reader: SharedReader) -> Result<String> {
        self.render_with(reader, &self.config.renderer)
    }

    pub fn render_with(&self, reader: SharedReader, config: &RenderConfig) -> Result<String> {
        let renderer = renderer_for(reader, config);
        debug!("Rendering with {} layout", renderer.layout());
        Ok(renderer.render()?)
    }

    /// Write `text` to `output`.
    pub fn emit(&self, text: &str, output: &Output) -> Result<()> {
        match output {
            Output::Stdout => {
                print!("{}", text);
            }
            Output::File(path) => {
                fs::write(path, text)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!("Wrote {}", path.display());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use specker_model::SpecModelManipulator;
    use tempfile::TempDir;

    #[test]
    fn test_open_transform_render() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("foo.spec");
        fs::write(&path, "Name: foo\nVersion: 1\n").unwrap();

        let session = Session::new(SpeckerConfig::default());
        let reader = session.open(&path).unwrap();
        let pass = crate::passes::SetTag::new("Version", "2");
        session.transform(&reader, &[&pass]).unwrap();

        assert_eq!(session.render(reader.clone()).unwrap(), "Name: foo\nVersion: 2\n");
        let guard = reader.borrow();
        assert_eq!(guard.model().unwrap().tag_value("Version"), Some("2"));
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let session = Session::new(SpeckerConfig::default());
        let err = session.open(&dir.path().join("missing.spec")).err().unwrap();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_load_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("specker.toml");
        fs::write(&path, "[renderer]\nlayout = \"normalized\"\n").unwrap();

        let session = Session::load(Some(&path)).unwrap();
        assert_eq!(session.config().renderer.layout, specker_model::Layout::Normalized);
    }

    #[test]
    fn test_emit_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.spec");
        let session = Session::new(SpeckerConfig::default());
        session.emit("Name: foo\n", &Output::File(path.clone())).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "Name: foo\n");
    }
}
