//! Spec model renderers.
//!
//! A renderer serializes the model held by a [`SpecModelReader`]. There is
//! no default renderer: every variant is constructed with the reader it reads
//! through, and a new reader can be registered at any time.
//!
//! - [`OriginalLayoutRenderer`] reproduces pristine sections byte-for-byte
//!   and re-synthesizes only dirty ones.
//! - [`NormalizedRenderer`] re-synthesizes every section in a canonical
//!   layout driven by [`RenderConfig`].

use tracing::debug;

use crate::config::{Layout, RenderConfig};
use crate::diagnostics::Diagnostics;
use crate::error::{SpecError, SpecResult};
use crate::model::SpecModel;
use crate::reader::SharedReader;
use crate::section::{SectionKind, SpecSection, DEFAULT_TAG_SEPARATOR};

/// Serializes a spec model back into spec text.
pub trait SpecModelRenderer {
    /// The layout this renderer produces.
    fn layout(&self) -> Layout;

    /// Register the reader whose model is rendered. Last set wins.
    fn set_model_reader(&mut self, reader: SharedReader);

    fn get_model_reader(&self) -> SharedReader;

    /// Render `model`. Fails without partial output when a section's
    /// structured fields disagree with its kind.
    fn render_model(&self, model: &SpecModel) -> SpecResult<String>;

    /// Render the model currently held by the registered reader.
    fn render(&self) -> SpecResult<String> {
        let reader = self.get_model_reader();
        let guard = reader.try_borrow().map_err(|_| SpecError::ReaderBusy)?;
        let model = guard.model().ok_or(SpecError::NoModel)?;
        self.render_model(model)
    }
}

/// Create the renderer variant selected by `config.layout`.
pub fn renderer_for(reader: SharedReader, config: &RenderConfig) -> Box<dyn SpecModelRenderer> {
    match config.layout {
        Layout::Original => Box::new(OriginalLayoutRenderer::new(reader)),
        Layout::Normalized => Box::new(NormalizedRenderer::new(reader, config.clone())),
    }
}

/// Renders pristine sections verbatim and dirty sections from their fields.
pub struct OriginalLayoutRenderer {
    reader: SharedReader,
    diagnostics: Diagnostics,
}

impl OriginalLayoutRenderer {
    pub fn new(reader: SharedReader) -> Self {
        Self {
            reader,
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

impl SpecModelRenderer for OriginalLayoutRenderer {
    fn layout(&self) -> Layout {
        Layout::Original
    }

    fn set_model_reader(&mut self, reader: SharedReader) {
        self.reader = reader;
    }

    fn get_model_reader(&self) -> SharedReader {
        self.reader.clone()
    }

    fn render_model(&self, model: &SpecModel) -> SpecResult<String> {
        let mut out = String::new();
        let mut synthesized = 0usize;

        for (index, section) in model.get_sections().iter().enumerate() {
            if section.is_pristine() {
                out.push_str(section.raw_text());
                continue;
            }
            section.validate(index)?;
            synthesize(section, &mut out);
            synthesized += 1;
        }

        self.diagnostics.emit(|| {
            debug!(
                sections = model.len(),
                synthesized,
                "Rendered spec in original layout"
            )
        });
        Ok(out)
    }
}

/// Canonical text of a dirty section, keeping its recorded separator and
/// line endings.
fn synthesize(section: &SpecSection, out: &mut String) {
    match section.kind() {
        SectionKind::Tag => {
            out.push_str(section.key().unwrap_or_default());
            out.push_str(section.separator().unwrap_or(DEFAULT_TAG_SEPARATOR));
            out.push_str(section.value().unwrap_or_default());
            out.push_str(section.ending().as_str());
        }
        SectionKind::SectionHeader => {
            out.push('%');
            out.push_str(section.name().unwrap_or_default());
            if let Some(args) = section.args() {
                out.push(' ');
                out.push_str(args);
            }
            out.push_str(section.ending().as_str());
        }
        SectionKind::SectionBody
        | SectionKind::Comment
        | SectionKind::Macro
        | SectionKind::Blank => {
            for line in section.lines() {
                line.push_to(out);
            }
        }
    }
}

/// Renders every section in a canonical layout.
pub struct NormalizedRenderer {
    reader: SharedReader,
    config: RenderConfig,
    diagnostics: Diagnostics,
}

impl NormalizedRenderer {
    pub fn new(reader: SharedReader, config: RenderConfig) -> Self {
        Self {
            reader,
            config,
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    fn clean<'a>(&self, text: &'a str) -> &'a str {
        if self.config.trim_trailing_whitespace {
            text.trim_end()
        } else {
            text
        }
    }

    fn tag_line(&self, key: &str, value: &str) -> String {
        let head = format!("{}:", key);
        let value = value.trim();
        if value.is_empty() {
            return head;
        }
        let width = self.config.tag_value_column.max(head.chars().count() + 1);
        format!("{:<width$}{}", head, value, width = width)
    }

    fn section_lines(&self, section: &SpecSection, lines: &mut Vec<String>) {
        match section.kind() {
            SectionKind::Tag => lines.push(self.tag_line(
                section.key().unwrap_or_default(),
                section.value().unwrap_or_default(),
            )),
            SectionKind::SectionHeader => {
                let mut header = format!("%{}", section.name().unwrap_or_default());
                if let Some(args) = section.args().map(str::trim).filter(|a| !a.is_empty()) {
                    header.push(' ');
                    header.push_str(args);
                }
                lines.push(header);
            }
            SectionKind::SectionBody | SectionKind::Comment | SectionKind::Macro => {
                lines.extend(section.lines().iter().map(|l| self.clean(&l.text).to_string()));
            }
            SectionKind::Blank => {
                lines.extend(section.lines().iter().map(|_| String::new()));
            }
        }
    }
}

impl SpecModelRenderer for NormalizedRenderer {
    fn layout(&self) -> Layout {
        Layout::Normalized
    }

    fn set_model_reader(&mut self, reader: SharedReader) {
        self.reader = reader;
    }

    fn get_model_reader(&self) -> SharedReader {
        self.reader.clone()
    }

    fn render_model(&self, model: &SpecModel) -> SpecResult<String> {
        let mut lines = Vec::new();
        for (index, section) in model.get_sections().iter().enumerate() {
            section.validate(index)?;
            self.section_lines(section, &mut lines);
        }

        let newline = self.config.newline.ending().as_str();
        let mut out = String::new();
        let mut previous_blank = false;
        for line in &lines {
            let blank = line.trim().is_empty();
            if blank && previous_blank && self.config.collapse_blank_lines {
                continue;
            }
            previous_blank = blank;
            out.push_str(line);
            out.push_str(newline);
        }

        self.diagnostics.emit(|| {
            debug!(
                sections = model.len(),
                lines = lines.len(),
                "Rendered spec in normalized layout"
            )
        });
        Ok(out)
    }
}
