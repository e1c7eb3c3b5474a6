//! The query/mutate contract shared by everything that edits a model.

use crate::error::SpecResult;
use crate::model::SpecModel;
use crate::section::{BodyLine, LineEnding, SectionKind, SpecSection};

/// Read/write access to a [`SpecModel`].
///
/// Implementors only provide access to the model; every query and mutation
/// is defined here so that transformation passes can work against any
/// manipulator. Mutations mark the touched sections dirty and never rewrite
/// `raw_text`.
pub trait SpecModelManipulator {
    fn model(&self) -> &SpecModel;

    fn model_mut(&mut self) -> &mut SpecModel;

    fn get_sections(&self) -> &[SpecSection] {
        self.model().get_sections()
    }

    fn find_tag(&self, name: &str) -> Option<&SpecSection> {
        self.model().find_tag(name)
    }

    fn find_tags(&self, name: &str) -> Vec<&SpecSection> {
        self.model().find_tags(name)
    }

    fn tag_value(&self, name: &str) -> Option<&str> {
        self.find_tag(name).and_then(SpecSection::value)
    }

    fn find_section(&self, header_name: &str) -> Option<&SpecSection> {
        self.model().find_section(header_name)
    }

    /// Lines of the body owned by `header_name`; empty when the header has
    /// no body, `None` when there is no such header.
    fn section_body_lines(&self, header_name: &str) -> Option<&[BodyLine]> {
        let model = self.model();
        let header = model.find_section_index(header_name)?;
        match model.body_index(header).and_then(|i| model.get(i)) {
            Some(body) => Some(body.lines()),
            None => Some(&[]),
        }
    }

    /// Set the value of the first tag named `name`. Returns `false` when the
    /// tag does not exist.
    fn set_tag_value(&mut self, name: &str, value: &str) -> bool {
        let model = self.model_mut();
        let Some(index) = model.find_tag_index(name) else {
            return false;
        };
        match model.section_mut(index) {
            Ok(section) => {
                section.set_value(value);
                true
            }
            Err(_) => false,
        }
    }

    /// Add a tag after the last tag of the main preamble and return its index.
    fn add_tag(&mut self, name: &str, value: &str) -> SpecResult<usize> {
        let model = self.model_mut();
        let sections = model.get_sections();
        let preamble_end = sections
            .iter()
            .position(|s| s.kind() == SectionKind::SectionHeader)
            .unwrap_or(sections.len());
        let index = sections[..preamble_end]
            .iter()
            .rposition(|s| s.kind() == SectionKind::Tag)
            .map(|i| i + 1)
            .unwrap_or(preamble_end);

        let mut tag = SpecSection::tag(name, value);
        tag.set_ending(model.line_ending());
        model.insert_section(index, tag)?;
        Ok(index)
    }

    /// Remove the first tag named `name`.
    fn remove_tag(&mut self, name: &str) -> Option<SpecSection> {
        let model = self.model_mut();
        let index = model.find_tag_index(name)?;
        model.remove_section(index).ok()
    }

    /// Replace the body of `header_name`, creating it when missing.
    /// Returns `false` when there is no such header.
    fn set_section_body(&mut self, header_name: &str, lines: &[&str]) -> SpecResult<bool> {
        let model = self.model_mut();
        let Some(header) = model.find_section_index(header_name) else {
            return Ok(false);
        };
        let new_lines = body_lines(lines, model.line_ending());
        match model.body_index(header) {
            Some(body) => model.section_mut(body)?.set_lines(new_lines),
            None => model.insert_section(header + 1, SpecSection::body(new_lines))?,
        }
        Ok(true)
    }

    /// Insert `lines` at the top of the body of `header_name`.
    fn prepend_section_body(&mut self, header_name: &str, lines: &[&str]) -> SpecResult<bool> {
        let model = self.model_mut();
        let Some(header) = model.find_section_index(header_name) else {
            return Ok(false);
        };
        let ending = model.line_ending();
        let mut new_lines = body_lines(lines, ending);
        match model.body_index(header) {
            Some(body) => {
                model.section_mut(body)?.lines_mut().splice(0..0, new_lines);
            }
            None => {
                if header + 1 == model.len() {
                    // Keep an unterminated file unterminated.
                    let last = model.get(header).map(SpecSection::last_ending);
                    if let Some(LineEnding::None) = last {
                        terminate_last(&mut new_lines, LineEnding::None);
                    }
                }
                model.insert_section(header + 1, SpecSection::body(new_lines))?;
            }
        }
        Ok(true)
    }

    /// Append `lines` at the end of the body of `header_name`.
    fn append_section_body(&mut self, header_name: &str, lines: &[&str]) -> SpecResult<bool> {
        let model = self.model_mut();
        let Some(header) = model.find_section_index(header_name) else {
            return Ok(false);
        };
        let ending = model.line_ending();
        let new_lines = body_lines(lines, ending);
        match model.body_index(header) {
            Some(body) => {
                let existing = model.section_mut(body)?.lines_mut();
                if let Some(last) = existing.last_mut() {
                    if last.ending.is_none() {
                        last.ending = ending;
                    }
                }
                existing.extend(new_lines);
            }
            None => model.insert_section(header + 1, SpecSection::body(new_lines))?,
        }
        Ok(true)
    }

    fn insert_section(&mut self, index: usize, section: SpecSection) -> SpecResult<()> {
        self.model_mut().insert_section(index, section)
    }

    fn remove_section(&mut self, index: usize) -> SpecResult<SpecSection> {
        self.model_mut().remove_section(index)
    }
}

impl SpecModelManipulator for SpecModel {
    fn model(&self) -> &SpecModel {
        self
    }

    fn model_mut(&mut self) -> &mut SpecModel {
        self
    }
}

fn body_lines(lines: &[&str], ending: LineEnding) -> Vec<BodyLine> {
    lines
        .iter()
        .map(|text| BodyLine::new(*text).with_ending(ending))
        .collect()
}

fn terminate_last(lines: &mut [BodyLine], ending: LineEnding) {
    if let Some(last) = lines.last_mut() {
        last.ending = ending;
    }
}
