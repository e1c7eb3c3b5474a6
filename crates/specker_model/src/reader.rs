//! Spec model readers.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::config::ReaderConfig;
use crate::diagnostics::Diagnostics;
use crate::error::{SpecError, SpecResult};
use crate::model::SpecModel;
use crate::section::{macro_directive, LineEnding, SectionKind, SpecSection};
use crate::tokenizer::{ends_with_continuation, split_lines, LineClass, RawLine, Tokenizer, PREAMBLE_SECTIONS};

/// A reader handle shared between a reader's owner and renderers.
pub type SharedReader = Rc<RefCell<dyn SpecModelReader>>;

/// Wrap a reader so renderers can hold it.
pub fn shared<R: SpecModelReader + 'static>(reader: R) -> SharedReader {
    Rc::new(RefCell::new(reader))
}

/// Parses spec text into a [`SpecModel`].
///
/// A reader keeps the model of its last successful parse; renderers read it
/// through the reader. Parsing is deterministic and every produced section is
/// pristine with its verbatim text.
pub trait SpecModelReader {
    /// Name of the dialect this reader understands.
    fn dialect(&self) -> &str;

    /// Parse `input` and hold the resulting model. On failure no model is held.
    fn parse(&mut self, input: &[u8]) -> SpecResult<&SpecModel>;

    fn parse_str(&mut self, input: &str) -> SpecResult<&SpecModel> {
        self.parse(input.as_bytes())
    }

    fn model(&self) -> Option<&SpecModel>;

    fn model_mut(&mut self) -> Option<&mut SpecModel>;

    /// Hand the held model over, e.g. to a transformator.
    fn take_model(&mut self) -> Option<SpecModel>;

    /// Hold `model`, e.g. once a transformator is done with it.
    fn set_model(&mut self, model: SpecModel);
}

/// Reader for the RPM spec file dialect.
#[derive(Debug, Default)]
pub struct SpecFileReader {
    tokenizer: Tokenizer,
    model: Option<SpecModel>,
    diagnostics: Diagnostics,
}

impl SpecFileReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &ReaderConfig) -> Self {
        let tokenizer = config
            .extra_sections
            .iter()
            .fold(Tokenizer::new(), |tokenizer, name| tokenizer.with_section(name));
        Self {
            tokenizer,
            ..Self::default()
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Parse `input` into a new model without holding it.
    pub fn read(&self, input: &[u8]) -> SpecResult<SpecModel> {
        let text = decode(input)?;
        let lines = split_lines(text);

        let model = self.diagnostics.emit(|| {
            debug!(lines = lines.len(), "Parsing spec text");
            let mut builder = ModelBuilder::new(&self.tokenizer);
            for line in &lines {
                builder.feed(line);
            }
            builder.finish()
        });

        self.diagnostics
            .emit(|| debug!(sections = model.len(), "Parsed spec model"));
        Ok(model)
    }
}

impl SpecModelReader for SpecFileReader {
    fn dialect(&self) -> &str {
        "rpm-spec"
    }

    fn parse(&mut self, input: &[u8]) -> SpecResult<&SpecModel> {
        self.model = None;
        let model = self.read(input)?;
        Ok(self.model.insert(model))
    }

    fn model(&self) -> Option<&SpecModel> {
        self.model.as_ref()
    }

    fn model_mut(&mut self) -> Option<&mut SpecModel> {
        self.model.as_mut()
    }

    fn take_model(&mut self) -> Option<SpecModel> {
        self.model.take()
    }

    fn set_model(&mut self, model: SpecModel) {
        self.model = Some(model);
    }
}

/// Reject input that is not text.
fn decode(input: &[u8]) -> SpecResult<&str> {
    let line_of = |offset: usize| input[..offset].iter().filter(|b| **b == b'\n').count() + 1;

    if let Some(offset) = input.iter().position(|b| *b == 0) {
        return Err(SpecError::MalformedInput {
            line: line_of(offset),
            message: "input contains NUL bytes".to_string(),
        });
    }

    std::str::from_utf8(input).map_err(|e| SpecError::MalformedInput {
        line: line_of(e.valid_up_to()),
        message: format!("input is not valid UTF-8: {}", e),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Tags, macros, comments: the top of the file and after `%package`.
    Preamble,
    /// Free-form lines owned by the last section header.
    Body,
}

/// Groups classified lines into sections.
struct ModelBuilder<'t> {
    tokenizer: &'t Tokenizer,
    sections: Vec<SpecSection>,
    open: Option<SpecSection>,
    mode: Mode,
    macro_continues: bool,
    line_ending: Option<LineEnding>,
}

impl<'t> ModelBuilder<'t> {
    fn new(tokenizer: &'t Tokenizer) -> Self {
        Self {
            tokenizer,
            sections: Vec::new(),
            open: None,
            mode: Mode::Preamble,
            macro_continues: false,
            line_ending: None,
        }
    }

    fn feed(&mut self, line: &RawLine<'_>) {
        if self.line_ending.is_none() && !line.ending.is_none() {
            self.line_ending = Some(line.ending);
        }

        if self.macro_continues {
            self.macro_continues = ends_with_continuation(line.text);
            self.append_open(SectionKind::Macro, line);
            if !self.macro_continues {
                self.close();
            }
            return;
        }

        let class = self.tokenizer.classify(line.text);
        trace!(line = line.number, ?class, "Classified line");

        match class {
            LineClass::SectionHeader { name, args } => {
                self.close();
                let mut header = SpecSection::parsed(SectionKind::SectionHeader, line.number);
                header.push_raw(line.text, line.ending);
                header.set_parsed_header(name, args, line.ending);
                self.sections.push(header);
                self.mode = if PREAMBLE_SECTIONS.contains(&name) {
                    Mode::Preamble
                } else {
                    Mode::Body
                };
            }
            _ if self.mode == Mode::Body => self.append_open(SectionKind::SectionBody, line),
            LineClass::Blank => self.append_open(SectionKind::Blank, line),
            LineClass::Comment => self.append_open(SectionKind::Comment, line),
            LineClass::Text => {
                debug!(line = line.number, "Keeping unrecognized preamble line verbatim");
                self.append_open(SectionKind::SectionBody, line);
            }
            LineClass::Macro { continued } => {
                self.close();
                let mut section = SpecSection::parsed(SectionKind::Macro, line.number);
                section.set_parsed_name(macro_directive(line.text));
                section.push_parsed_line(line.text, line.ending);
                self.open = Some(section);
                self.macro_continues = continued;
                if !continued {
                    self.close();
                }
            }
            LineClass::Tag {
                key,
                separator,
                value,
            } => {
                self.close();
                let mut section = SpecSection::parsed(SectionKind::Tag, line.number);
                section.push_raw(line.text, line.ending);
                section.set_parsed_tag(key, separator, value, line.ending);
                self.sections.push(section);
            }
        }
    }

    /// Add `line` to the open run of `kind`, starting a new run if needed.
    fn append_open(&mut self, kind: SectionKind, line: &RawLine<'_>) {
        if self.open.as_ref().map(SpecSection::kind) != Some(kind) {
            self.close();
            self.open = Some(SpecSection::parsed(kind, line.number));
        }
        if let Some(open) = self.open.as_mut() {
            open.push_parsed_line(line.text, line.ending);
        }
    }

    fn close(&mut self) {
        if let Some(section) = self.open.take() {
            self.sections.push(section);
        }
    }

    fn finish(mut self) -> SpecModel {
        self.close();
        SpecModel::from_parts(self.sections, self.line_ending.unwrap_or_default())
    }
}
